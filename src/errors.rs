//! Error types for rapid_fdsm
//!
//! Only precondition violations surface as errors. Degenerate statistics
//! (exhausted retry budgets, negative variance, zero standard deviation) are
//! handled locally and reported through `tracing` diagnostics instead.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FdsmError>;

/// Main error type for rapid_fdsm
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FdsmError {
    /// An edge joins two nodes of the same partition
    #[error("Graph is not bipartite: edge {from} -- {to} stays within one partition")]
    NotBipartite { from: String, to: String },

    /// A top node has no neighbors, so neighbor selection is undefined
    #[error("Top node '{node}' has no neighbors")]
    IsolatedTopNode { node: String },

    /// A node id or label does not belong to the graph
    #[error("Unknown node: {message}")]
    UnknownNode { message: String },

    /// A label was registered under both partitions
    #[error("Node '{label}' is already registered in the other partition")]
    PartitionConflict { label: String },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem error while writing diagnostics
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl FdsmError {
    /// Create a not-bipartite error
    pub fn not_bipartite(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::NotBipartite {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an isolated top node error
    pub fn isolated_top_node(node: impl Into<String>) -> Self {
        Self::IsolatedTopNode { node: node.into() }
    }

    /// Create an unknown node error
    pub fn unknown_node(message: impl Into<String>) -> Self {
        Self::UnknownNode {
            message: message.into(),
        }
    }

    /// Create a partition conflict error
    pub fn partition_conflict(label: impl Into<String>) -> Self {
        Self::PartitionConflict {
            label: label.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error is a violated graph precondition
    /// (as opposed to a configuration or I/O problem)
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::NotBipartite { .. } | Self::IsolatedTopNode { .. } | Self::UnknownNode { .. }
        )
    }
}

impl From<serde_json::Error> for FdsmError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for FdsmError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
