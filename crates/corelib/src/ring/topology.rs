//! Ring topology views.
//!
//! A [`RingTopology`] is an immutable, lock-free copy of the ring's virtual
//! nodes. It answers questions that need the whole ring at once: how much of
//! the keyspace each node owns and which arcs those are.

use std::collections::BTreeMap;

use crate::node::NodeId;
use crate::ring::position::{ring_size, RingPosition};
use crate::vnode::VirtualNode;

/// An arc of the ring, exclusive of `start` and inclusive of `end`.
///
/// Keys hashing into `(start, end]` belong to the vnode at `end`. When
/// `start == end` the arc is the full circle (a ring with one vnode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    pub start: RingPosition,
    pub end: RingPosition,
}

impl TokenRange {
    /// Number of positions covered by the arc.
    pub fn len(&self, hash_width: u32) -> u128 {
        if self.start == self.end {
            ring_size(hash_width)
        } else {
            self.start.distance_to(&self.end, hash_width)
        }
    }

    /// Whether `position` falls inside the arc.
    pub fn contains(&self, position: RingPosition, hash_width: u32) -> bool {
        if self.start == self.end {
            return true;
        }
        let offset = self.start.distance_to(&position, hash_width);
        offset != 0 && offset <= self.start.distance_to(&self.end, hash_width)
    }
}

/// Snapshot of the ring's placements in clockwise order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingTopology {
    entries: Vec<VirtualNode>,
    hash_width: u32,
}

impl RingTopology {
    pub(crate) fn new(mut entries: Vec<VirtualNode>, hash_width: u32) -> Self {
        entries.sort();
        Self {
            entries,
            hash_width,
        }
    }

    pub fn entries(&self) -> &[VirtualNode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hash_width(&self) -> u32 {
        self.hash_width
    }

    /// The vnode owning `position`: first at or after it, wrapping around.
    pub fn successor(&self, position: RingPosition) -> Option<&VirtualNode> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.entries.partition_point(|vnode| vnode.position < position);
        self.entries.get(idx).or_else(|| self.entries.first())
    }

    /// Arc owned by each vnode, in clockwise order.
    pub fn ranges(&self) -> Vec<(TokenRange, &NodeId)> {
        let Some(last) = self.entries.last() else {
            return Vec::new();
        };

        let mut previous = last.position;
        self.entries
            .iter()
            .map(|vnode| {
                let range = TokenRange {
                    start: previous,
                    end: vnode.position,
                };
                previous = vnode.position;
                (range, &vnode.node_id)
            })
            .collect()
    }

    /// Arcs owned by one physical node.
    pub fn ranges_of(&self, node: &str) -> Vec<TokenRange> {
        self.ranges()
            .into_iter()
            .filter(|(_, owner)| owner.as_str() == node)
            .map(|(range, _)| range)
            .collect()
    }

    /// Fraction of the keyspace owned by each physical node. Sums to 1.0 on a
    /// non-empty ring.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let space = ring_size(self.hash_width) as f64;
        let mut owned: BTreeMap<NodeId, u128> = BTreeMap::new();
        for (range, node) in self.ranges() {
            *owned.entry(node.clone()).or_default() += range.len(self.hash_width);
        }
        owned
            .into_iter()
            .map(|(node, positions)| (node, positions as f64 / space))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(entries: &[(u64, &str)], hash_width: u32) -> RingTopology {
        let entries = entries
            .iter()
            .map(|(position, node)| VirtualNode::new(RingPosition(*position), NodeId::from(*node)))
            .collect();
        RingTopology::new(entries, hash_width)
    }

    #[test]
    fn test_empty_topology() {
        let topology = topology(&[], 64);
        assert!(topology.successor(RingPosition(5)).is_none());
        assert!(topology.ranges().is_empty());
        assert!(topology.ownership().is_empty());
    }

    #[test]
    fn test_successor_wraps() {
        let topology = topology(&[(10, "A"), (20, "B")], 16);

        assert_eq!(topology.successor(RingPosition(10)).unwrap().node_id, "A");
        assert_eq!(topology.successor(RingPosition(15)).unwrap().node_id, "B");
        assert_eq!(topology.successor(RingPosition(21)).unwrap().node_id, "A");
    }

    #[test]
    fn test_ranges_cover_ring() {
        let topology = topology(&[(20, "B"), (10, "A")], 16);
        let ranges = topology.ranges();

        // Sorted on construction; the first arc wraps from the last vnode.
        assert_eq!(ranges[0].0, TokenRange { start: RingPosition(20), end: RingPosition(10) });
        assert_eq!(ranges[1].0, TokenRange { start: RingPosition(10), end: RingPosition(20) });

        let covered: u128 = ranges.iter().map(|(range, _)| range.len(16)).sum();
        assert_eq!(covered, 1 << 16);
    }

    #[test]
    fn test_range_contains() {
        let wrapping = TokenRange { start: RingPosition(20), end: RingPosition(10) };
        assert!(wrapping.contains(RingPosition(10), 16));
        assert!(wrapping.contains(RingPosition(0xffff), 16));
        assert!(!wrapping.contains(RingPosition(20), 16));
        assert!(!wrapping.contains(RingPosition(15), 16));
    }

    #[test]
    fn test_single_vnode_owns_everything() {
        let topology = topology(&[(42, "A")], 64);
        let ownership = topology.ownership();

        assert_eq!(ownership.len(), 1);
        assert!((ownership["A"] - 1.0).abs() < f64::EPSILON);
        assert!(topology.ranges_of("A")[0].contains(RingPosition(7), 64));
    }

    #[test]
    fn test_ownership_fractions() {
        // 16-bit ring: A owns (49152, 16384] = half, B owns (16384, 49152] = half.
        let topology = topology(&[(16384, "A"), (49152, "B")], 16);
        let ownership = topology.ownership();

        assert!((ownership["A"] - 0.5).abs() < 1e-12);
        assert!((ownership["B"] - 0.5).abs() < 1e-12);
        assert_eq!(topology.ranges_of("B").len(), 1);
    }
}
