//! Reranker trait definition.

use async_trait::async_trait;

use super::result::RerankResult;
use crate::error::Result;

/// Scores documents against a query.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Get the name of this reranker.
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Rerank documents based on relevance to a query.
    ///
    /// Returns results sorted by relevance (highest first), truncated to
    /// `top_n` when given. Ties keep input order.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: Option<usize>,
    ) -> Result<Vec<RerankResult>>;
}
