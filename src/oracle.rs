//! The ranking oracle seam.
//!
//! An oracle receives a window of candidate labels and answers with a
//! permutation: positions into the window, best first. The answer may be
//! partial and may repeat positions, as long as its leading entries name
//! enough distinct candidates.
//!
//! ```ascii
//!          ┌──────────────────────┐
//!          │  ResortOracle Trait  │
//!          └──────────┬───────────┘
//!        ┌────────────┼─────────────┐
//!        ▼            ▼             ▼
//! ┌────────────┐ ┌──────────┐ ┌──────────────┐
//! │  FnOracle  │ │ Reranker │ │RetryingOracle│
//! │ (closure)  │ │  Oracle  │ │  (wrapper)   │
//! └────────────┘ └──────────┘ └──────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RerankError, Result};
use crate::reranker::Reranker;

/// Reorders one fixed-size window of candidates.
#[async_trait]
pub trait ResortOracle: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Returns positions into `window`, best first.
    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>>;
}

#[async_trait]
impl<O: ResortOracle + ?Sized> ResortOracle for Arc<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>> {
        (**self).resort(window).await
    }
}

/// Oracle backed by a synchronous closure.
///
/// # Example
///
/// ```
/// use rerank_tournament::{FnOracle, ResortOracle};
///
/// // lower label wins
/// let oracle = FnOracle::new(|window: &[usize]| {
///     let mut order: Vec<usize> = (0..window.len()).collect();
///     order.sort_by_key(|&i| window[i]);
///     Ok(order)
/// });
/// assert_eq!(oracle.name(), "fn-oracle");
/// ```
pub struct FnOracle<F> {
    name: String,
    f: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&[usize]) -> Result<Vec<usize>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            name: "fn-oracle".to_string(),
            f,
        }
    }

    /// Set the name reported in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<F> ResortOracle for FnOracle<F>
where
    F: Fn(&[usize]) -> Result<Vec<usize>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>> {
        (self.f)(window)
    }
}

/// Adapts a score-based [`Reranker`] into an oracle.
///
/// Window labels index into `documents`. The reranker scores the window's
/// documents against `query` and the positions are returned in descending
/// relevance.
pub struct RerankerOracle<R> {
    reranker: R,
    query: String,
    documents: Vec<String>,
}

impl<R: Reranker> RerankerOracle<R> {
    pub fn new(reranker: R, query: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            reranker,
            query: query.into(),
            documents,
        }
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }
}

#[async_trait]
impl<R: Reranker> ResortOracle for RerankerOracle<R> {
    fn name(&self) -> &str {
        self.reranker.name()
    }

    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>> {
        let docs = window
            .iter()
            .map(|&label| {
                self.documents.get(label).cloned().ok_or_else(|| {
                    RerankError::OracleError(format!(
                        "window references document {} but only {} are loaded",
                        label,
                        self.documents.len()
                    ))
                })
            })
            .collect::<Result<Vec<String>>>()?;

        let results = self.reranker.rerank(&self.query, &docs, None).await?;
        Ok(results.into_iter().map(|r| r.index).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reranker::TermOverlapReranker;

    #[tokio::test]
    async fn test_fn_oracle_passes_window_through() {
        let oracle = FnOracle::new(|window: &[usize]| Ok((0..window.len()).rev().collect()))
            .with_name("reverse");
        assert_eq!(oracle.name(), "reverse");
        assert_eq!(oracle.resort(&[4, 5, 6]).await.unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_reranker_oracle_orders_by_relevance() {
        let documents = vec![
            "Tokyo is the capital of Japan.".to_string(),
            "Bananas are yellow.".to_string(),
            "The capital of France is Paris.".to_string(),
        ];
        let oracle = RerankerOracle::new(TermOverlapReranker::new(), "capital of France", documents);

        // window labels 1, 2, 0 → positions 0, 1, 2
        let permutation = oracle.resort(&[1, 2, 0]).await.unwrap();
        assert_eq!(permutation[0], 1);
        assert_eq!(*permutation.last().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reranker_oracle_rejects_unknown_document() {
        let oracle = RerankerOracle::new(TermOverlapReranker::new(), "q", vec!["doc".to_string()]);
        let err = oracle.resort(&[0, 3]).await.unwrap_err();
        assert!(matches!(err, RerankError::OracleError(_)));
    }

    #[tokio::test]
    async fn test_arc_oracle_delegates() {
        let oracle: Arc<dyn ResortOracle> =
            Arc::new(FnOracle::new(|window: &[usize]| Ok((0..window.len()).collect())));
        assert_eq!(oracle.name(), "fn-oracle");
        assert_eq!(oracle.resort(&[9, 8]).await.unwrap(), vec![0, 1]);
    }
}
