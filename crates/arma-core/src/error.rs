//! Error types for arma-core.

use thiserror::Error;

/// Graph construction and aggregation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// An edge endpoint does not name a node of the graph.
    #[error("node {node} out of range for graph with {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    /// Feature matrix row count disagrees with the node count.
    #[error("feature rows mismatch: expected {expected}, got {got}")]
    FeatureRows { expected: usize, got: usize },

    /// A node or graph count does not fit the `u32` index space.
    #[error("{count} exceeds the u32 index range")]
    IndexOverflow { count: usize },

    /// Batching was asked to combine zero graphs.
    #[error("cannot batch an empty list of graphs")]
    EmptyBatch,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
