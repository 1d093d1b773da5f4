//! Error types for arma-nn.

use thiserror::Error;

/// Layer construction and forward-pass errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Graph structure or aggregation error.
    #[error("graph error: {0}")]
    Graph(#[from] arma_core::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
