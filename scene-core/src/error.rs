//! Error types for host canvas operations.

use thiserror::Error;

/// Result type for host canvas operations.
pub type HostResult<T> = Result<T, HostError>;

/// Errors a host canvas can report for a single call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// Node not found on the canvas.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The target node cannot hold children.
    #[error("Node cannot contain children: {0}")]
    NotAContainer(String),

    /// The operation is not supported for this node kind.
    #[error("Operation {operation} is not supported on {kind} nodes")]
    Unsupported {
        /// Operation name.
        operation: String,
        /// Node kind the operation was attempted on.
        kind: String,
    },

    /// A value was rejected by the host.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A text operation targeted a font that is not loaded yet.
    #[error("Font not loaded: {0}")]
    FontNotLoaded(String),

    /// The requested font does not exist on the host.
    #[error("Font not found: {0}")]
    FontNotFound(String),

    /// The host could not answer the request.
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}
