//! Error types for tournament reranking, with retry strategies.
//!
//! # Error Taxonomy
//!
//! | Error | Raised when | Retry |
//! |-------|-------------|-------|
//! | `ConfigError` | bad window/branching ratio, `k > n`, empty or duplicate candidates | never |
//! | `OracleError` | the ranking collaborator failed a request | backoff |
//! | `InconsistentOracle` | empty permutation, or no winners for a non-empty window | never |
//! | `RateLimited` | the collaborator asked us to slow down | wait |
//! | `Timeout` | the collaborator did not answer in time | backoff |
//!
//! Protocol violations (reading an unresolved node, answering a request that
//! was never issued) are not represented here: they are programming errors
//! and abort through `assert!`.
//!
//! The core never retries. [`RetryStrategy`] is consumed by
//! [`crate::retry::RetryExecutor`], which wraps an oracle from the outside.

use std::time::Duration;
use thiserror::Error;

/// Result type for reranking operations.
pub type Result<T> = std::result::Result<T, RerankError>;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying a failed oracle request.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff (for transient errors).
    ExponentialBackoff {
        /// Initial delay before first retry.
        base_delay: Duration,
        /// Maximum delay between retries.
        max_delay: Duration,
        /// Maximum number of attempts, the first one included.
        max_attempts: u32,
    },

    /// Wait for a specific duration then retry once (for rate limits).
    WaitAndRetry {
        /// Duration to wait before retrying.
        wait: Duration,
    },

    /// Do not retry at all (permanent error).
    NoRetry,
}

impl RetryStrategy {
    /// Standard backoff for transport-level oracle failures.
    pub fn network_backoff() -> Self {
        Self::ExponentialBackoff {
            base_delay: Duration::from_millis(125),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }

    /// Check if this strategy allows retrying.
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::NoRetry)
    }
}

// ============================================================================
// Rerank Error Types
// ============================================================================

/// Errors that can occur while selecting a top-K ranking.
#[derive(Debug, Error)]
pub enum RerankError {
    /// Invalid tournament configuration or selection arguments.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The ranking oracle failed to answer a request.
    #[error("Oracle error: {0}")]
    OracleError(String),

    /// The ranking oracle answered with something the tournament cannot use.
    #[error("Inconsistent oracle response: {0}")]
    InconsistentOracle(String),

    /// Rate limit exceeded on the oracle side.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The oracle did not answer in time.
    #[error("Oracle request timed out")]
    Timeout,

    /// Malformed JSON, e.g. a config file. Repeating the parse cannot help.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RerankError {
    /// Get the appropriate retry strategy for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use rerank_tournament::{RerankError, RetryStrategy};
    ///
    /// let error = RerankError::OracleError("connection reset".to_string());
    /// assert!(error.retry_strategy().should_retry());
    ///
    /// let error = RerankError::ConfigError("window_size 0".to_string());
    /// assert_eq!(error.retry_strategy(), RetryStrategy::NoRetry);
    /// ```
    pub fn retry_strategy(&self) -> RetryStrategy {
        match self {
            Self::OracleError(_) | Self::Timeout => RetryStrategy::network_backoff(),

            Self::RateLimited(_) => RetryStrategy::WaitAndRetry {
                wait: Duration::from_secs(60),
            },

            Self::ConfigError(_)
            | Self::InconsistentOracle(_)
            | Self::SerializationError(_) => RetryStrategy::NoRetry,
        }
    }

    /// Check if this error can be retried by a wrapping oracle.
    pub fn is_retryable(&self) -> bool {
        self.retry_strategy().should_retry()
    }
}
