//! Reorder policies.
//!
//! A policy decides which windows of a candidate list the oracle sees and
//! how the answers compose into a new ordering. The tournament policy puts
//! the exact top-n of a rank range first and leaves the rest of the range in
//! its incoming order.
//!
//! ```ascii
//! before:  [ head ][ a b c d e f g h ][ tail ]
//!                   rank_start..rank_end
//! after:   [ head ][ top-n.. | rest in order ][ tail ]
//! ```

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::config::TournamentConfig;
use crate::error::{RerankError, Result};
use crate::oracle::ResortOracle;
use crate::tournament::TournamentSelector;

/// Strategy for reordering a candidate list with a window oracle.
#[async_trait]
pub trait ReorderPolicy: Send + Sync {
    /// Registry name of the policy.
    fn name(&self) -> &str;

    /// Largest number of candidates the oracle sees in one call.
    fn max_selected_indices(&self) -> usize;

    /// Computes a new order for `len` candidates.
    ///
    /// Only `rank_start..rank_end` may move. Oracle windows carry indices
    /// into the caller's candidate list. Returns a permutation of `0..len`.
    async fn reorder(
        &self,
        len: usize,
        rank_start: usize,
        rank_end: usize,
        oracle: &dyn ResortOracle,
    ) -> Result<Vec<usize>>;
}

/// Rearranges `items` so that `items[i]` of the result is `items[order[i]]`.
///
/// `order` must be a permutation of `0..items.len()`.
pub fn apply_order<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    debug_assert_eq!(items.len(), order.len());
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

/// Tournament-sort reorder policy.
///
/// # Example
///
/// ```
/// use rerank_tournament::{FnOracle, ReorderPolicy, TournamentConfig, TournamentSortPolicy};
///
/// # tokio_test_block(async {
/// let policy = TournamentSortPolicy::new(TournamentConfig::new(4, 2))?.with_top_n(2);
/// // higher index is better
/// let oracle = FnOracle::new(|window: &[usize]| {
///     let mut order: Vec<usize> = (0..window.len()).collect();
///     order.sort_by_key(|&i| std::cmp::Reverse(window[i]));
///     Ok(order)
/// });
/// let order = policy.reorder(6, 0, 6, &oracle).await?;
/// assert_eq!(order, vec![5, 4, 0, 1, 2, 3]);
/// # Ok::<(), rerank_tournament::RerankError>(())
/// # }).unwrap();
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TournamentSortPolicy {
    config: TournamentConfig,
    top_n: Option<usize>,
}

impl TournamentSortPolicy {
    pub const NAME: &'static str = "reorder_policy.tournament_sort";

    /// Create a policy; fails if `config` is invalid.
    pub fn new(config: TournamentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            top_n: None,
        })
    }

    /// Number of leading candidates to rank exactly. Defaults to the
    /// branching factor.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn top_n(&self) -> usize {
        self.top_n.unwrap_or(self.config.branching_factor)
    }
}

#[async_trait]
impl ReorderPolicy for TournamentSortPolicy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn max_selected_indices(&self) -> usize {
        self.config.window_size
    }

    async fn reorder(
        &self,
        len: usize,
        rank_start: usize,
        rank_end: usize,
        oracle: &dyn ResortOracle,
    ) -> Result<Vec<usize>> {
        let rank_end = rank_end.min(len);
        if rank_start > rank_end {
            return Err(RerankError::ConfigError(format!(
                "rank_start ({}) is past rank_end ({})",
                rank_start, rank_end
            )));
        }

        let mut order: Vec<usize> = (0..len).collect();
        let span = rank_end - rank_start;
        if span <= 1 {
            return Ok(order);
        }

        let k = self.top_n().min(span);
        let selector =
            TournamentSelector::new((rank_start..rank_end).collect(), self.config.clone())?;
        let top = selector.select(k)?.run(oracle).await?;
        debug!(
            policy = Self::NAME,
            oracle = oracle.name(),
            span,
            k,
            "Reordered rank range"
        );

        let chosen: HashSet<usize> = top.iter().copied().collect();
        let rest = (rank_start..rank_end).filter(|i| !chosen.contains(i));
        let ranked: Vec<usize> = top.iter().copied().chain(rest).collect();
        order.splice(rank_start..rank_end, ranked);
        Ok(order)
    }
}
