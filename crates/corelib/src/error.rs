//! Error types for the core library.

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Lookups never fail: an empty ring answers `None`. The only errors are
/// rejected configuration and the strict removal path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Replica count or hash width out of range
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
    /// Configuration document could not be parsed
    #[error("failed to parse ring configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// Node is not active on the ring
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
}
