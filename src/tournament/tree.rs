//! Bracket construction.
//!
//! ```ascii
//! window_size = 4, branching_factor = 2  →  2 children per node
//!
//!                     (root)                 round 3
//!                 ┌─────┴─────┐
//!              (a)            (b)            round 2
//!            ┌──┴──┐       ┌──┴──┐
//!          (c)    (d)    (e)    (f)          round 1
//!          ┌┴┐    ┌┴┐    ┌┴┐    ┌┴┐
//!          0 1    2 3    4 5    6 7          leaves
//! ```
//!
//! A trailing chunk holding a single node is promoted to the next round
//! unchanged, so uneven candidate counts give some shallower branches.

use tracing::debug;

use super::node::{NodeId, TournamentNode};
use crate::config::TournamentConfig;
use crate::error::{RerankError, Result};

/// Arena-backed k-ary tournament tree over candidate positions `0..n`.
///
/// Arena order is topological: leaves first (leaf of position `p` has handle
/// `p`), then internal nodes in creation order, so every child precedes its
/// parent.
#[derive(Debug, Clone)]
pub struct TournamentTree {
    nodes: Vec<TournamentNode>,
    root: NodeId,
    leaves: Vec<NodeId>,
    rounds: Vec<Vec<NodeId>>,
    window_size: usize,
    branching_factor: usize,
}

impl TournamentTree {
    /// Builds the bracket for `len` candidates.
    ///
    /// Fails with [`RerankError::ConfigError`] if the config is invalid or
    /// there are no candidates.
    pub fn build(len: usize, config: &TournamentConfig) -> Result<Self> {
        config.validate()?;
        if len == 0 {
            return Err(RerankError::ConfigError(
                "cannot build a tournament over zero candidates".to_string(),
            ));
        }

        let group = config.children_per_node();
        let mut nodes: Vec<TournamentNode> = (0..len).map(TournamentNode::leaf).collect();
        let leaves: Vec<NodeId> = (0..len).collect();
        let mut rounds = Vec::new();
        let mut level = leaves.clone();

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(group));
            let mut created = Vec::new();
            for chunk in level.chunks(group) {
                if let [only] = chunk {
                    next.push(*only);
                    continue;
                }
                let id = nodes.len();
                for &child in chunk {
                    nodes[child].set_parent(id);
                }
                nodes.push(TournamentNode::internal(
                    chunk.to_vec(),
                    config.branching_factor,
                ));
                created.push(id);
                next.push(id);
            }
            rounds.push(created);
            level = next;
        }

        let tree = Self {
            nodes,
            root: level[0],
            leaves,
            rounds,
            window_size: config.window_size,
            branching_factor: config.branching_factor,
        };
        debug!(
            candidates = len,
            internal_nodes = tree.internal_count(),
            depth = tree.rounds.len(),
            "Built tournament tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of candidates (leaves).
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub fn node(&self, id: NodeId) -> &TournamentNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TournamentNode {
        &mut self.nodes[id]
    }

    /// Every node handle, leaves first, each child before its parent.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    /// Internal node handles in creation (leaf-to-root) order.
    pub fn internal_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.rounds.iter().flatten().copied()
    }

    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaves.len()
    }

    /// Internal nodes grouped by build round. Nodes of one round only
    /// depend on nodes of earlier rounds.
    pub fn rounds(&self) -> &[Vec<NodeId>] {
        &self.rounds
    }

    /// Leaf owning the candidate at `position`.
    pub fn leaf(&self, position: usize) -> NodeId {
        self.leaves[position]
    }

    /// Candidate positions in the subtree rooted at `id`.
    pub fn subtree_positions(&self, id: NodeId) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_leaf() {
                out.push(current);
            } else {
                stack.extend(node.children().iter().rev());
            }
        }
        out
    }

    /// Winners of `id`. Panics if the node is unresolved.
    pub fn top(&self, id: NodeId) -> &[usize] {
        self.nodes[id].top()
    }

    /// Flattens the children's winners into the next request window.
    ///
    /// Returns `None` for leaves and for nodes that already hold winners.
    /// The window is remembered on the node until its result is applied.
    ///
    /// # Panics
    ///
    /// Panics if a request for this node is already outstanding, or if a
    /// child is unresolved.
    pub fn compute_pending_request(&mut self, id: NodeId) -> Option<Vec<usize>> {
        let node = &self.nodes[id];
        if node.is_leaf() || node.is_valid() {
            return None;
        }
        assert!(
            !node.is_awaiting(),
            "node {} already has an outstanding request",
            id
        );
        let window: Vec<usize> = node
            .children()
            .iter()
            .flat_map(|&child| self.nodes[child].top().iter().copied())
            .collect();
        self.nodes[id].begin_request(window.clone());
        Some(window)
    }

    /// Consumes the leaf at `position` and resets every ancestor.
    ///
    /// Returns the invalidation path, leaf first.
    pub fn invalidate_path(&mut self, position: usize) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(self.leaves[position]);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.invalidate();
            node.reset();
            path.push(id);
            current = node.parent();
        }
        path
    }
}
