//! Tournament bracket nodes.
//!
//! Nodes live in the arena owned by [`super::TournamentTree`] and refer to
//! each other through [`NodeId`] handles. Candidates inside a node are
//! *positions* `0..n` into the selector's candidate list.
//!
//! # Internal node states
//!
//! ```ascii
//!            reset()                  issue request
//!   Valid ───────────► Invalidated ──────────────────► Awaiting
//!     ▲                                                   │
//!     └─────────────────── apply_result() ────────────────┘
//! ```

/// Stable handle of a node in the tournament arena.
pub type NodeId = usize;

/// Leaf or internal payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A single candidate. `consumed` is set once it has been extracted.
    Leaf { position: usize, consumed: bool },
    /// Aggregates the winners of its children.
    Internal {
        children: Vec<NodeId>,
        branching_factor: usize,
        /// Best-to-worst winners, `None` while invalidated or awaiting.
        top: Option<Vec<usize>>,
        /// Flattened child winners submitted with the outstanding request.
        pending_window: Option<Vec<usize>>,
    },
}

/// A node of the k-ary tournament bracket.
#[derive(Debug, Clone)]
pub struct TournamentNode {
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl TournamentNode {
    pub(crate) fn leaf(position: usize) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Leaf {
                position,
                consumed: false,
            },
        }
    }

    pub(crate) fn internal(children: Vec<NodeId>, branching_factor: usize) -> Self {
        Self {
            parent: None,
            kind: NodeKind::Internal {
                children,
                branching_factor,
                top: None,
                pending_window: None,
            },
        }
    }

    pub(crate) fn set_parent(&mut self, parent: NodeId) {
        debug_assert!(self.parent.is_none(), "node already has a parent");
        self.parent = Some(parent);
    }

    /// Parent handle, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Leaf or internal payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Child handles; empty for a leaf.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Internal { children, .. } => children,
        }
    }

    /// Whether [`top`](Self::top) may be read.
    pub fn is_valid(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf { .. } => true,
            NodeKind::Internal { top, .. } => top.is_some(),
        }
    }

    /// Whether a request for this node is outstanding.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            &self.kind,
            NodeKind::Internal {
                pending_window: Some(_),
                ..
            }
        )
    }

    /// Clears an internal node's winners so they are recomputed. No-op on leaves.
    pub(crate) fn reset(&mut self) {
        if let NodeKind::Internal { top, .. } = &mut self.kind {
            *top = None;
        }
    }

    /// Marks a leaf's candidate as consumed. No-op on internal nodes.
    pub(crate) fn invalidate(&mut self) {
        if let NodeKind::Leaf { consumed, .. } = &mut self.kind {
            *consumed = true;
        }
    }

    /// Current winners, best first, at most `branching_factor` of them.
    ///
    /// # Panics
    ///
    /// Panics if an internal node has no resolved winners.
    pub fn top(&self) -> &[usize] {
        match &self.kind {
            NodeKind::Leaf { consumed: true, .. } => &[],
            NodeKind::Leaf { position, .. } => std::slice::from_ref(position),
            NodeKind::Internal {
                top,
                branching_factor,
                ..
            } => {
                let top = top
                    .as_deref()
                    .unwrap_or_else(|| panic!("top() read on an unresolved internal node"));
                &top[..top.len().min(*branching_factor)]
            }
        }
    }

    /// Length of the outstanding request's real (unpadded) window.
    pub(crate) fn pending_len(&self) -> Option<usize> {
        match &self.kind {
            NodeKind::Internal { pending_window, .. } => pending_window.as_ref().map(Vec::len),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Records the window about to be sent to the oracle.
    pub(crate) fn begin_request(&mut self, window: Vec<usize>) {
        match &mut self.kind {
            NodeKind::Internal {
                top,
                pending_window,
                ..
            } => {
                assert!(
                    top.is_none() && pending_window.is_none(),
                    "request issued for a node that is valid or already awaiting"
                );
                *pending_window = Some(window);
            }
            NodeKind::Leaf { .. } => panic!("leaves never issue requests"),
        }
    }

    /// Builds the new winners from a permutation over the pending window.
    ///
    /// Positions are mapped through the pending window in order; repeated
    /// candidates are skipped and do not count toward the limit. Returns the
    /// number of winners kept.
    ///
    /// # Panics
    ///
    /// Panics if no request is outstanding for this node.
    pub(crate) fn apply_result(&mut self, permutation: &[usize]) -> usize {
        let NodeKind::Internal {
            branching_factor,
            top,
            pending_window,
            ..
        } = &mut self.kind
        else {
            panic!("apply_result() called on a leaf");
        };
        assert!(top.is_none(), "apply_result() on a node that is still valid");
        let window = pending_window
            .take()
            .unwrap_or_else(|| panic!("apply_result() without an outstanding request"));

        let mut winners: Vec<usize> = Vec::with_capacity(*branching_factor);
        for &slot in permutation {
            if winners.len() >= *branching_factor {
                break;
            }
            let Some(&candidate) = window.get(slot) else {
                continue;
            };
            if !winners.contains(&candidate) {
                winners.push(candidate);
            }
        }

        let kept = winners.len();
        *top = Some(winners);
        kept
    }
}
