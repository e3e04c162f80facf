//! Rerank Tournament - top-K selection over a costly listwise reranker
//!
//! A listwise reranker (typically a language model) can only reorder a
//! small, fixed-size window of candidates per call, and every call is
//! expensive. This crate combines many such windowed orderings into an
//! exact top-K ranking over a much larger candidate set with a k-ary
//! tournament tree:
//!
//! - seed: one oracle call per internal node, leaves to root
//! - extract: take the root's best, recompute only the path it came from
//!
//! Total oracle calls are `O(n / window_size + k * depth)`.
//!
//! The selector decides *which* windows to reorder and how the answers
//! compose. *How* a window is reordered is up to the [`ResortOracle`]
//! supplied by the caller.
//!
//! # Example
//!
//! ```
//! use rerank_tournament::{Step, TournamentConfig, TournamentSelector};
//!
//! let config = TournamentConfig::new(4, 2);
//! let mut selection = TournamentSelector::with_len(8, config)?.select(2)?;
//! let mut ranked = Vec::new();
//! loop {
//!     match selection.step()? {
//!         Step::Resort(requests) => {
//!             for request in requests {
//!                 // a real oracle would ask the model; here larger wins
//!                 let mut order: Vec<usize> = (0..request.window.len()).collect();
//!                 order.sort_by_key(|&i| std::cmp::Reverse(request.window[i]));
//!                 selection.submit(request.ticket, &order)?;
//!             }
//!         }
//!         Step::Emit(candidate) => ranked.push(candidate),
//!         Step::Done => break,
//!     }
//! }
//! assert_eq!(ranked, vec![7, 6]);
//! # Ok::<(), rerank_tournament::RerankError>(())
//! ```
//!
//! # See Also
//!
//! - [`crate::tournament`] for the bracket and the request protocol
//! - [`crate::oracle`] for oracle adapters
//! - [`crate::policy`] for reordering a rank range of a candidate list

pub mod config;
pub mod error;
pub mod oracle;
pub mod policy;
pub mod reranker;
pub mod retry;
pub mod tournament;

pub use config::TournamentConfig;
pub use error::{RerankError, Result, RetryStrategy};
pub use oracle::{FnOracle, RerankerOracle, ResortOracle};
pub use policy::{apply_order, ReorderPolicy, TournamentSortPolicy};
pub use reranker::{RerankResult, Reranker, TermOverlapReranker};
pub use retry::{RetryExecutor, RetryingOracle};
pub use tournament::{
    NodeId, ResortRequest, Selection, Step, Ticket, TournamentNode, TournamentSelector,
    TournamentTree,
};
