//! Term overlap reranker.
//!
//! Scores a document by the share of distinct query terms it contains.
//! Deterministic and local, which makes it a convenient stand-in oracle for
//! tests and demos.
//!
//! ```ascii
//! query  {capital, of, france}
//! doc    "The capital of France is Paris."
//!         → {the, capital, of, france, is, paris}
//! score  = |query ∩ doc| / |query| = 3/3
//! ```

use async_trait::async_trait;
use std::collections::HashSet;

use super::result::RerankResult;
use super::traits::Reranker;
use crate::error::Result;

/// Query-term overlap reranker.
#[derive(Debug, Clone)]
pub struct TermOverlapReranker {
    model: String,
}

impl TermOverlapReranker {
    pub fn new() -> Self {
        Self {
            model: "term-overlap".to_string(),
        }
    }

    fn terms(text: &str) -> HashSet<String> {
        text.split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|term| !term.is_empty())
            .collect()
    }

    /// Overlap score of one document, in `[0, 1]`.
    pub fn score(&self, query: &str, document: &str) -> f64 {
        let query_terms = Self::terms(query);
        if query_terms.is_empty() {
            return 0.0;
        }
        let doc_terms = Self::terms(document);
        query_terms.intersection(&doc_terms).count() as f64 / query_terms.len() as f64
    }
}

impl Default for TermOverlapReranker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reranker for TermOverlapReranker {
    fn name(&self) -> &str {
        "term-overlap"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: Option<usize>,
    ) -> Result<Vec<RerankResult>> {
        let mut results: Vec<RerankResult> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| RerankResult {
                index,
                relevance_score: self.score(query, doc),
            })
            .collect();

        // stable, so ties keep input order
        results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        if let Some(n) = top_n {
            results.truncate(n);
        }
        Ok(results)
    }
}
