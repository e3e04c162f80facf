//! Score-based rerankers.
//!
//! A [`Reranker`] scores every document against a query in one call. It
//! cannot be asked to compare arbitrary subsets cheaply enough for large
//! candidate sets on its own, but any reranker becomes a window oracle for
//! the tournament through [`crate::oracle::RerankerOracle`].
//!
//! ```ascii
//! reranker/
//! ├── traits.rs       ─► Reranker trait
//! ├── result.rs       ─► RerankResult
//! └── term_overlap.rs ─► TermOverlapReranker
//! ```

mod result;
mod term_overlap;
mod traits;

pub use result::RerankResult;
pub use term_overlap::TermOverlapReranker;
pub use traits::Reranker;
