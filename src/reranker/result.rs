//! Reranking result types.

use serde::{Deserialize, Serialize};

/// Relevance of one document from a [`super::Reranker`] call.
///
/// `index` is the document's position in the slice passed to `rerank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Index of the document in the input slice.
    pub index: usize,
    /// Relevance score (higher is more relevant).
    pub relevance_score: f64,
}
