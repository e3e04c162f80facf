//! Top-K extraction over a tournament tree.
//!
//! The selector never calls the oracle itself. A [`Selection`] hands out
//! [`Step`]s: either a batch of [`ResortRequest`]s that the caller answers
//! through [`Selection::submit`], or the next extracted candidate.
//!
//! ```ascii
//!  seed: every internal node, leaf-to-root
//!    │
//!    ▼
//!  extract ──► Emit(root.top()[0])
//!    ▲             │
//!    │             ▼
//!    └──── recompute invalidation path (leaf → root)
//! ```
//!
//! Oracle calls: one per internal node while seeding, then one per
//! internal node on the invalidation path after each extraction.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, trace};

use super::node::NodeId;
use super::padding::{pad_window, unpad_permutation};
use super::tree::TournamentTree;
use crate::config::TournamentConfig;
use crate::error::{RerankError, Result};
use crate::oracle::ResortOracle;

/// Handle tying an oracle answer back to the node that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(NodeId);

impl Ticket {
    /// The tree node this request belongs to.
    pub fn node(&self) -> NodeId {
        self.0
    }
}

/// A window the oracle must reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResortRequest {
    /// Pass back to [`Selection::submit`] with the permutation.
    pub ticket: Ticket,
    /// Exactly `window_size` candidate labels, fillers last.
    pub window: Vec<usize>,
    /// Number of leading entries that are real candidates.
    pub real_len: usize,
}

/// What the caller has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Answer every request, in any order, before stepping again.
    Resort(Vec<ResortRequest>),
    /// The next candidate of the ranking.
    Emit(usize),
    /// All `k` candidates have been emitted.
    Done,
}

/// Tournament-tree top-K selector over a candidate list.
///
/// # Example
///
/// ```
/// use rerank_tournament::{TournamentConfig, TournamentSelector};
///
/// let selector = TournamentSelector::new((0..8).collect(), TournamentConfig::new(4, 2))?;
/// // oracle: smaller label is better
/// let ranked = selector.select(3)?.run_with(|window| {
///     let mut order: Vec<usize> = (0..window.len()).collect();
///     order.sort_by_key(|&i| window[i]);
///     Ok(order)
/// })?;
/// assert_eq!(ranked, vec![0, 1, 2]);
/// # Ok::<(), rerank_tournament::RerankError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TournamentSelector {
    tree: TournamentTree,
    labels: Vec<usize>,
    config: TournamentConfig,
}

impl TournamentSelector {
    /// Builds the bracket over `candidates`.
    ///
    /// Fails if the config is invalid, or the candidates are empty or
    /// contain duplicates.
    pub fn new(candidates: Vec<usize>, config: TournamentConfig) -> Result<Self> {
        let mut seen = HashSet::with_capacity(candidates.len());
        if let Some(dup) = candidates.iter().find(|&&c| !seen.insert(c)) {
            return Err(RerankError::ConfigError(format!(
                "candidate {} appears more than once",
                dup
            )));
        }
        let tree = TournamentTree::build(candidates.len(), &config)?;
        Ok(Self {
            tree,
            labels: candidates,
            config,
        })
    }

    /// Selector over candidates `0..len`.
    pub fn with_len(len: usize, config: TournamentConfig) -> Result<Self> {
        Self::new((0..len).collect(), config)
    }

    pub fn tree(&self) -> &TournamentTree {
        &self.tree
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Starts extracting the best `k` candidates.
    pub fn select(self, k: usize) -> Result<Selection> {
        if k > self.labels.len() {
            return Err(RerankError::ConfigError(format!(
                "cannot select {} of {} candidates",
                k,
                self.labels.len()
            )));
        }

        let seed_batches: Vec<Vec<NodeId>> = if k == 0 {
            Vec::new()
        } else if self.config.seed_batching {
            self.tree.rounds().to_vec()
        } else {
            self.tree.internal_nodes().map(|id| vec![id]).collect()
        };

        Ok(Selection {
            tree: self.tree,
            labels: self.labels,
            k,
            phase: Phase::Seed {
                batches: seed_batches,
                next: 0,
            },
            emitted: Vec::with_capacity(k),
            outstanding: Vec::new(),
            oracle_calls: 0,
        })
    }
}

#[derive(Debug)]
enum Phase {
    Seed {
        batches: Vec<Vec<NodeId>>,
        next: usize,
    },
    Extract,
    Recompute {
        path: Vec<NodeId>,
        next: usize,
    },
    Done,
    Abandoned,
}

/// One in-progress top-K run. Not restartable.
#[derive(Debug)]
pub struct Selection {
    tree: TournamentTree,
    labels: Vec<usize>,
    k: usize,
    phase: Phase,
    emitted: Vec<usize>,
    outstanding: Vec<NodeId>,
    oracle_calls: usize,
}

impl Selection {
    /// Advances to the next suspension point or emitted candidate.
    ///
    /// # Panics
    ///
    /// Panics if requests from the previous step are still unanswered.
    pub fn step(&mut self) -> Result<Step> {
        if matches!(self.phase, Phase::Abandoned) {
            return Err(abandoned());
        }
        assert!(
            self.outstanding.is_empty(),
            "{} resort request(s) still unanswered",
            self.outstanding.len()
        );

        loop {
            match &mut self.phase {
                Phase::Seed { batches, next } => {
                    let Some(batch) = batches.get(*next).cloned() else {
                        debug!(oracle_calls = self.oracle_calls, "Seeded tournament tree");
                        self.phase = Phase::Extract;
                        continue;
                    };
                    *next += 1;
                    let requests: Vec<ResortRequest> =
                        batch.into_iter().filter_map(|id| self.issue(id)).collect();
                    if !requests.is_empty() {
                        return Ok(Step::Resort(requests));
                    }
                }
                Phase::Recompute { path, next } => {
                    let Some(&id) = path.get(*next) else {
                        self.phase = Phase::Extract;
                        continue;
                    };
                    *next += 1;
                    if let Some(request) = self.issue(id) {
                        return Ok(Step::Resort(vec![request]));
                    }
                }
                Phase::Extract => {
                    if self.emitted.len() == self.k {
                        debug!(
                            k = self.k,
                            oracle_calls = self.oracle_calls,
                            "Tournament selection complete"
                        );
                        self.phase = Phase::Done;
                        continue;
                    }
                    let root = self.tree.root();
                    let Some(&best) = self.tree.top(root).first() else {
                        return Err(RerankError::InconsistentOracle(format!(
                            "no candidates left after {} of {} extractions",
                            self.emitted.len(),
                            self.k
                        )));
                    };
                    let path = self.tree.invalidate_path(best);
                    let label = self.labels[best];
                    self.emitted.push(label);
                    trace!(
                        rank = self.emitted.len(),
                        candidate = label,
                        path_len = path.len(),
                        "Extracted candidate"
                    );
                    self.phase = Phase::Recompute { path, next: 0 };
                    return Ok(Step::Emit(label));
                }
                Phase::Done => return Ok(Step::Done),
                Phase::Abandoned => return Err(abandoned()),
            }
        }
    }

    /// Feeds the oracle's permutation for `ticket` back into the tree.
    ///
    /// `permutation` holds positions into the request's window, best first.
    /// Filler positions are dropped and repeated candidates are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `ticket` has no outstanding request.
    ///
    /// A rejected permutation abandons the selection: the rest of its batch
    /// is discarded, and every later [`step`](Self::step) or `submit` fails
    /// without touching the tree.
    pub fn submit(&mut self, ticket: Ticket, permutation: &[usize]) -> Result<()> {
        if matches!(self.phase, Phase::Abandoned) {
            return Err(abandoned());
        }
        let id = ticket.node();
        let Some(slot) = self.outstanding.iter().position(|&o| o == id) else {
            panic!("no outstanding resort request for node {}", id);
        };
        self.outstanding.swap_remove(slot);

        if permutation.is_empty() {
            self.abandon();
            return Err(RerankError::InconsistentOracle(format!(
                "empty permutation for node {}",
                id
            )));
        }

        let real_len = self.tree.node(id).pending_len().unwrap_or(0);
        let cleaned = unpad_permutation(permutation, real_len);
        let winners = self.tree.node_mut(id).apply_result(&cleaned);
        if winners == 0 && real_len > 0 {
            self.abandon();
            return Err(RerankError::InconsistentOracle(format!(
                "permutation {:?} names none of the {} real candidates of node {}",
                permutation, real_len, id
            )));
        }
        Ok(())
    }

    /// Drives the selection to completion against an async oracle.
    ///
    /// Requests of one batch are dispatched concurrently. The first oracle
    /// failure abandons the run.
    pub async fn run<O>(mut self, oracle: &O) -> Result<Vec<usize>>
    where
        O: ResortOracle + ?Sized,
    {
        let mut ranked = Vec::with_capacity(self.k);
        loop {
            match self.step()? {
                Step::Resort(requests) => {
                    let answers =
                        try_join_all(requests.iter().map(|r| oracle.resort(&r.window))).await?;
                    for (request, permutation) in requests.iter().zip(answers) {
                        self.submit(request.ticket, &permutation)?;
                    }
                }
                Step::Emit(label) => ranked.push(label),
                Step::Done => return Ok(ranked),
            }
        }
    }

    /// Drives the selection to completion with a synchronous oracle.
    pub fn run_with<F>(mut self, mut oracle: F) -> Result<Vec<usize>>
    where
        F: FnMut(&[usize]) -> Result<Vec<usize>>,
    {
        let mut ranked = Vec::with_capacity(self.k);
        loop {
            match self.step()? {
                Step::Resort(requests) => {
                    for request in requests {
                        let permutation = oracle(&request.window)?;
                        self.submit(request.ticket, &permutation)?;
                    }
                }
                Step::Emit(label) => ranked.push(label),
                Step::Done => return Ok(ranked),
            }
        }
    }

    /// Candidates emitted so far, best first.
    pub fn emitted(&self) -> &[usize] {
        &self.emitted
    }

    /// Number of requests handed out so far.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn tree(&self) -> &TournamentTree {
        &self.tree
    }

    /// Candidate label at tree position `position`.
    pub fn label(&self, position: usize) -> usize {
        self.labels[position]
    }

    fn abandon(&mut self) {
        debug!(
            dropped_requests = self.outstanding.len(),
            emitted = self.emitted.len(),
            "Abandoning tournament selection"
        );
        self.outstanding.clear();
        self.phase = Phase::Abandoned;
    }

    fn issue(&mut self, id: NodeId) -> Option<ResortRequest> {
        let real = self.tree.compute_pending_request(id)?;
        let padded = pad_window(&real, self.tree.window_size(), self.tree.len());
        self.outstanding.push(id);
        self.oracle_calls += 1;
        trace!(
            node = id,
            real_len = real.len(),
            window = padded.len(),
            "Issuing resort request"
        );
        Some(ResortRequest {
            ticket: Ticket(id),
            window: padded.iter().map(|&p| self.labels[p]).collect(),
            real_len: real.len(),
        })
    }
}

fn abandoned() -> RerankError {
    RerankError::InconsistentOracle(
        "selection was abandoned after a rejected oracle response".to_string(),
    )
}
