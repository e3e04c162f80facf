//! Tournament-tree top-K selection.
//!
//! Ranks a large candidate set with an oracle that can only reorder a
//! fixed-size window at a time, while keeping the number of oracle calls
//! close to `n / window_size + k * depth`.
//!
//! # Module Structure
//!
//! ```ascii
//! tournament/
//! ├── node.rs      ─► TournamentNode, NodeKind (leaf / internal)
//! ├── tree.rs      ─► TournamentTree (arena + bracket build)
//! ├── padding.rs   ─► pad_window, unpad_permutation
//! └── selector.rs  ─► TournamentSelector, Selection, Step, ResortRequest
//! ```

mod node;
mod padding;
mod selector;
mod tree;

pub use node::{NodeId, NodeKind, TournamentNode};
pub use padding::{pad_window, unpad_permutation};
pub use selector::{ResortRequest, Selection, Step, Ticket, TournamentSelector};
pub use tree::TournamentTree;

#[cfg(test)]
mod tests;
