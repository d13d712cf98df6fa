//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Hashing physical node identifiers straight onto the ring gives very uneven
//! arcs when there are only a handful of nodes. Each physical node therefore
//! gets R placements (virtual nodes), which:
//!
//! 1. **Smooths load**: more placements per node = arcs closer to uniform
//! 2. **Bounds disruption**: a join or leave only touches the arcs adjacent to
//!    that node's R positions
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(R) per physical node
//! - **Lookup**: O(log(R·N)) over all placements
//!
//! # Placement key
//!
//! Virtual node `i` of node `id` sits at `hash("<id>#<i>")`. The key string is
//! built only to be hashed and is never stored, so removal recomputes it.

use std::fmt;

use crate::hasher::RingHasher;
use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::RingPosition;

/// Separator between node identifier and ordinal in a placement key.
pub const VNODE_SEPARATOR: char = '#';

/// Placement key of virtual node `ordinal` of `node_id`: `"<id>#<ordinal>"`.
pub fn vnode_key(node_id: &NodeId, ordinal: usize) -> String {
    format!("{}{}{}", node_id, VNODE_SEPARATOR, ordinal)
}

/// A virtual node on the hash ring.
///
/// Represents a single position owned by a physical node. Ordered by position
/// first, so a sorted `Vec<VirtualNode>` is the ring walked clockwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Position on the ring.
    pub position: RingPosition,

    /// The physical node that owns this position.
    pub node_id: NodeId,
}

impl VirtualNode {
    #[inline]
    pub fn new(position: RingPosition, node_id: NodeId) -> Self {
        Self { position, node_id }
    }

    /// Create virtual node `ordinal` of `node_id` by hashing its placement key.
    ///
    /// # Example
    ///
    /// ```rust
    /// use corelib::{NodeId, RingHasher, VirtualNode};
    ///
    /// let hasher: RingHasher = RingHasher::default();
    /// let vnode0 = VirtualNode::from_index(&hasher, &NodeId::from("Node_A"), 0);
    /// assert_eq!(vnode0.position, hasher.hash("Node_A#0"));
    /// ```
    pub fn from_index<P: Partitioner>(
        hasher: &RingHasher<P>,
        node_id: &NodeId,
        ordinal: usize,
    ) -> Self {
        let position = hasher.hash(&vnode_key(node_id, ordinal));
        Self::new(position, node_id.clone())
    }

    #[inline]
    pub fn position(&self) -> RingPosition {
        self.position
    }

    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(position={}, node={})", self.position, self.node_id)
    }
}
