//! Tournament configuration.
//!
//! ```ascii
//! ┌──────────────────────────────────────────────────────────┐
//! │                    TournamentConfig                       │
//! ├──────────────────────────────────────────────────────────┤
//! │ window_size: usize      ─────► candidates per oracle call │
//! │ branching_factor: usize ─────► winners kept per node      │
//! │ seed_batching: bool     ─────► batch independent seeds    │
//! └──────────────────────────────────────────────────────────┘
//!
//! children per internal node = window_size / branching_factor
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RerankError, Result};

/// Default oracle window, matching the usual listwise reranker window.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Default number of winners each node keeps.
pub const DEFAULT_BRANCHING_FACTOR: usize = 5;

/// Configuration for a tournament selection run.
///
/// # Example
///
/// ```
/// use rerank_tournament::TournamentConfig;
///
/// let config = TournamentConfig::default()
///     .with_window_size(4)
///     .with_branching_factor(2);
/// assert_eq!(config.children_per_node(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Fixed number of candidates submitted to the oracle per call.
    pub window_size: usize,
    /// Number of best candidates an internal node retains.
    pub branching_factor: usize,
    /// Hand out every independent seed request of one tree level together.
    pub seed_batching: bool,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            seed_batching: true,
        }
    }
}

impl TournamentConfig {
    /// Create a config with the given window and branching factor.
    pub fn new(window_size: usize, branching_factor: usize) -> Self {
        Self {
            window_size,
            branching_factor,
            ..Default::default()
        }
    }

    /// Set the oracle window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the branching factor.
    pub fn with_branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self
    }

    /// Enable or disable level-wise batching of seed requests.
    pub fn with_seed_batching(mut self, enable: bool) -> Self {
        self.seed_batching = enable;
        self
    }

    /// Number of children grouped under each internal node.
    ///
    /// Only meaningful once [`validate`](Self::validate) has passed.
    pub fn children_per_node(&self) -> usize {
        self.window_size / self.branching_factor.max(1)
    }

    /// Check that the window splits evenly into at least two child groups.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || self.branching_factor == 0 {
            return Err(RerankError::ConfigError(format!(
                "window_size ({}) and branching_factor ({}) must be positive",
                self.window_size, self.branching_factor
            )));
        }
        if self.window_size % self.branching_factor != 0 {
            return Err(RerankError::ConfigError(format!(
                "window_size ({}) must be a multiple of branching_factor ({})",
                self.window_size, self.branching_factor
            )));
        }
        // a single child per group never shrinks a level
        if self.children_per_node() < 2 {
            return Err(RerankError::ConfigError(format!(
                "window_size ({}) must hold at least two groups of branching_factor ({})",
                self.window_size, self.branching_factor
            )));
        }
        Ok(())
    }
}
