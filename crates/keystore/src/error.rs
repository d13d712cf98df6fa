//! Error types for the key store.

use corelib::NodeId;

/// Errors returned by [`KeyStore`](crate::KeyStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No node is available to own the key
    #[error("no nodes on the ring")]
    EmptyRing,
    /// Removal or lookup of a node the store does not hold
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    /// Node is already part of the store
    #[error("node already present: {0}")]
    DuplicateNode(NodeId),
    /// Removing the node would leave its entries without an owner
    #[error("cannot remove {node}: it is the last node and holds {entries} entries")]
    LastNode { node: NodeId, entries: usize },
}
