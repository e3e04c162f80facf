//! Retrying oracle requests with backoff.
//!
//! The tournament core treats any oracle failure as fatal for the run.
//! Retrying belongs to the oracle side, so it lives here as a wrapper:
//!
//! ```ignore
//! use rerank_tournament::{RetryingOracle, RetryStrategy};
//!
//! let oracle = RetryingOracle::new(llm_oracle, RetryStrategy::network_backoff());
//! let ranked = selection.run(&oracle).await?;
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{Result, RetryStrategy};
use crate::oracle::ResortOracle;

/// Runs an async operation under a [`RetryStrategy`].
#[derive(Debug, Default, Clone)]
pub struct RetryExecutor {
    log_retries: bool,
}

impl RetryExecutor {
    pub fn new() -> Self {
        Self { log_retries: true }
    }

    /// Create a retry executor without logging.
    pub fn silent() -> Self {
        Self { log_retries: false }
    }

    /// Execute `operation`, retrying as `strategy` allows.
    ///
    /// Errors whose own strategy is [`RetryStrategy::NoRetry`] stop the loop
    /// immediately. Returns the last error once attempts are exhausted.
    pub async fn execute<F, Fut, T>(&self, strategy: &RetryStrategy, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match strategy {
            RetryStrategy::NoRetry => operation().await,

            RetryStrategy::WaitAndRetry { wait } => match operation().await {
                Ok(v) => Ok(v),
                Err(e) if !e.is_retryable() => Err(e),
                Err(e) => {
                    if self.log_retries {
                        warn!("Oracle request failed, waiting {:?} before retry: {}", wait, e);
                    }
                    sleep(*wait).await;
                    operation().await
                }
            },

            RetryStrategy::ExponentialBackoff {
                base_delay,
                max_delay,
                max_attempts,
            } => {
                self.backoff(*base_delay, *max_delay, *max_attempts, operation)
                    .await
            }
        }
    }

    async fn backoff<F, Fut, T>(
        &self,
        base_delay: Duration,
        max_delay: Duration,
        max_attempts: u32,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = base_delay;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let err = match operation().await {
                Ok(v) => {
                    if attempts > 1 && self.log_retries {
                        info!("Oracle request succeeded after {} attempts", attempts);
                    }
                    return Ok(v);
                }
                Err(e) => e,
            };

            if !err.is_retryable() {
                if self.log_retries {
                    debug!("Oracle error is permanent, not retrying: {}", err);
                }
                return Err(err);
            }
            if attempts >= max_attempts {
                if self.log_retries {
                    warn!("Oracle request failed after {} attempts: {}", attempts, err);
                }
                return Err(err);
            }

            // a rate limit names its own wait
            let wait = match err.retry_strategy() {
                RetryStrategy::WaitAndRetry { wait } => wait.min(max_delay),
                _ => delay,
            };
            if self.log_retries {
                warn!(
                    "Attempt {}/{} failed, retrying in {:?}: {}",
                    attempts, max_attempts, wait, err
                );
            }
            sleep(wait).await;
            delay = (delay * 2).min(max_delay);
        }
    }
}

/// Oracle wrapper that retries transient failures of the inner oracle.
pub struct RetryingOracle<O> {
    inner: O,
    strategy: RetryStrategy,
    executor: RetryExecutor,
}

impl<O: ResortOracle> RetryingOracle<O> {
    pub fn new(inner: O, strategy: RetryStrategy) -> Self {
        Self {
            inner,
            strategy,
            executor: RetryExecutor::new(),
        }
    }

    /// Disable retry logging.
    pub fn silent(mut self) -> Self {
        self.executor = RetryExecutor::silent();
        self
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: ResortOracle> ResortOracle for RetryingOracle<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn resort(&self, window: &[usize]) -> Result<Vec<usize>> {
        self.executor
            .execute(&self.strategy, || self.inner.resort(window))
            .await
    }
}
