//! Hash ring data structure.
//!
//! # Search policy
//!
//! A key is owned by the node of the first virtual node whose position is
//! **greater than or equal to** the key's position, wrapping to the smallest
//! position when no such vnode exists. A key hashing exactly onto a vnode
//! position therefore belongs to that vnode.
//!
//! # Collisions
//!
//! Two placement keys hashing to the same position are resolved by last write
//! wins: the later `add_node` takes the position. Removal only deletes a
//! position when its current owner is the node being removed, so a node never
//! takes another node's placement with it.
//!
//! # Concurrency
//!
//! All state sits behind one `parking_lot::RwLock`. Lookups share the read
//! lock; topology changes hold the write lock for the whole mutation, so
//! readers never observe a half-added or half-removed node.

#![allow(clippy::module_inception)]

use std::collections::{BTreeMap, BTreeSet};

use metrics::{counter, gauge};
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::hasher::RingHasher;
use crate::node::NodeId;
use crate::partitioner::{Blake3Partitioner, Partitioner};
use crate::ring::position::RingPosition;
use crate::ring::topology::RingTopology;
use crate::vnode::{vnode_key, VirtualNode};

/// Mutable ring state, always mutated as a unit.
#[derive(Debug, Default)]
struct RingState {
    /// Position → owning node. Iterating the keys yields the ordered,
    /// duplicate-free position sequence.
    vnodes: BTreeMap<RingPosition, NodeId>,
    /// Active physical nodes.
    nodes: BTreeSet<NodeId>,
    /// Positions taken over by a later insertion.
    collisions: u64,
}

impl RingState {
    /// First vnode at or after `position`, wrapping to the smallest.
    fn successor(&self, position: RingPosition) -> Option<(&RingPosition, &NodeId)> {
        self.vnodes
            .range(position..)
            .next()
            .or_else(|| self.vnodes.iter().next())
    }

    fn publish_gauges(&self) {
        gauge!("ring_nodes").set(self.nodes.len() as f64);
        gauge!("ring_vnodes").set(self.vnodes.len() as f64);
    }
}

/// Point-in-time counters describing a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStats {
    pub nodes: usize,
    pub vnodes: usize,
    pub replicas: usize,
    pub hash_width: u32,
    /// Virtual-node placements that overwrote an existing position.
    pub collisions: u64,
}

/// Consistent hash ring with virtual nodes.
///
/// Every active node owns `replicas` positions on the ring. All methods take
/// `&self`; share the ring between threads with `Arc<HashRing>`.
///
/// # Example
///
/// ```rust
/// use corelib::HashRing;
///
/// let ring = HashRing::new();
/// ring.add_node("Node_A");
/// ring.add_node("Node_B");
///
/// let owner = ring.get_node("user:42").unwrap();
/// assert!(owner == "Node_A" || owner == "Node_B");
/// ```
#[derive(Debug)]
pub struct HashRing<P = Blake3Partitioner> {
    hasher: RingHasher<P>,
    replicas: usize,
    state: RwLock<RingState>,
}

impl HashRing {
    /// Empty ring with the default configuration (100 vnodes, 64-bit space).
    pub fn new() -> Self {
        let config = RingConfig::default();
        Self::from_parts(RingHasher::default(), config.replicas)
    }

    /// Empty ring with `replicas` vnodes per node and a 64-bit space.
    pub fn with_replicas(replicas: usize) -> Result<Self> {
        Self::from_config(RingConfig::new(replicas))
    }

    /// Empty ring from a validated configuration.
    pub fn from_config(config: RingConfig) -> Result<Self> {
        Self::with_partitioner(config, Blake3Partitioner)
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> HashRing<P> {
    /// Empty ring hashing through a custom partitioner.
    pub fn with_partitioner(config: RingConfig, partitioner: P) -> Result<Self> {
        config.validate()?;
        let hasher = RingHasher::new(partitioner, config.hash_width)?;
        Ok(Self::from_parts(hasher, config.replicas))
    }

    fn from_parts(hasher: RingHasher<P>, replicas: usize) -> Self {
        Self {
            hasher,
            replicas,
            state: RwLock::new(RingState::default()),
        }
    }

    /// Add a physical node and its `replicas` virtual nodes.
    ///
    /// Returns `false` and leaves the ring untouched if the node is already
    /// active. Only keys on the arcs just before the new positions change
    /// owner.
    pub fn add_node(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        let mut guard = self.state.write();
        let state = &mut *guard;

        if state.nodes.contains(&node) {
            trace!(%node, "node already on ring");
            return false;
        }

        for ordinal in 0..self.replicas {
            let vnode = VirtualNode::from_index(&self.hasher, &node, ordinal);
            if let Some(previous) = state.vnodes.insert(vnode.position, node.clone()) {
                state.collisions += 1;
                counter!("ring_vnode_collisions_total").increment(1);
                warn!(
                    position = %vnode.position,
                    %previous,
                    %node,
                    ordinal,
                    "virtual node collision, later placement takes the position"
                );
            }
        }
        state.nodes.insert(node.clone());
        state.publish_gauges();

        debug!(%node, vnodes = self.replicas, "added node to ring");
        true
    }

    /// Remove a physical node and the virtual nodes it still owns.
    ///
    /// Removing a node that is not active is a silent no-op returning `false`,
    /// so callers may call this unconditionally. See
    /// [`try_remove_node`](Self::try_remove_node) for the strict variant.
    pub fn remove_node<N: AsRef<str> + ?Sized>(&self, node: &N) -> bool {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let Some(node) = state.nodes.take(node.as_ref()) else {
            trace!(node = node.as_ref(), "node not on ring, nothing to remove");
            return false;
        };

        let mut removed = 0usize;
        for ordinal in 0..self.replicas {
            let position = self.hasher.hash(&vnode_key(&node, ordinal));
            // A colliding later placement owns this position now.
            if state.vnodes.get(&position) == Some(&node) {
                state.vnodes.remove(&position);
                removed += 1;
            }
        }
        state.publish_gauges();

        debug!(%node, vnodes = removed, "removed node from ring");
        true
    }

    /// Remove a node, failing with [`Error::UnknownNode`] if it is not active.
    pub fn try_remove_node<N: AsRef<str> + ?Sized>(&self, node: &N) -> Result<()> {
        if self.remove_node(node) {
            Ok(())
        } else {
            Err(Error::UnknownNode(NodeId::from(node.as_ref())))
        }
    }

    /// Physical node responsible for `key`, or `None` on an empty ring.
    ///
    /// # Performance
    /// - **Time**: O(log(R·N)) ordered search, plus one hash of the key
    pub fn get_node(&self, key: &str) -> Option<NodeId> {
        self.node_for_position(self.hasher.hash(key))
    }

    /// Physical node responsible for a raw ring position.
    pub fn node_for_position(&self, position: RingPosition) -> Option<NodeId> {
        let state = self.state.read();
        let owner = state.successor(position).map(|(_, node)| node.clone());
        trace!(%position, owner = ?owner, "ring lookup");
        owner
    }

    /// Resolve many keys under a single read lock.
    pub fn get_nodes<'k, I>(&self, keys: I) -> Vec<Option<NodeId>>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let state = self.state.read();
        keys.into_iter()
            .map(|key| {
                state
                    .successor(self.hasher.hash(key))
                    .map(|(_, node)| node.clone())
            })
            .collect()
    }

    /// Position a key hashes to.
    pub fn position_of(&self, key: &str) -> RingPosition {
        self.hasher.hash(key)
    }

    pub fn contains_node<N: AsRef<str> + ?Sized>(&self, node: &N) -> bool {
        self.state.read().nodes.contains(node.as_ref())
    }

    /// Active nodes in sorted order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.state.read().nodes.iter().cloned().collect()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Number of positions currently on the ring.
    pub fn vnode_count(&self) -> usize {
        self.state.read().vnodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn hash_width(&self) -> u32 {
        self.hasher.hash_width()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.hasher.partitioner().name()
    }

    /// All virtual nodes in clockwise order.
    pub fn vnodes(&self) -> Vec<VirtualNode> {
        self.state
            .read()
            .vnodes
            .iter()
            .map(|(position, node)| VirtualNode::new(*position, node.clone()))
            .collect()
    }

    /// Immutable snapshot for ownership and range queries.
    pub fn topology(&self) -> RingTopology {
        RingTopology::new(self.vnodes(), self.hash_width())
    }

    pub fn stats(&self) -> RingStats {
        let state = self.state.read();
        RingStats {
            nodes: state.nodes.len(),
            vnodes: state.vnodes.len(),
            replicas: self.replicas,
            hash_width: self.hash_width(),
            collisions: state.collisions,
        }
    }
}

/// Builder for [`HashRing`].
///
/// # Example
///
/// ```rust
/// use corelib::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_replicas(8)
///     .add_node("Node_A")
///     .add_node("Node_B")
///     .build()
///     .unwrap();
/// assert_eq!(ring.vnode_count(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RingBuilder {
    config: RingConfig,
    nodes: Vec<NodeId>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.config.replicas = replicas;
        self
    }

    pub fn with_hash_width(mut self, hash_width: u32) -> Self {
        self.config.hash_width = hash_width;
        self
    }

    /// Queue a node; nodes are added in the order given.
    pub fn add_node(mut self, node: impl Into<NodeId>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn build(self) -> Result<HashRing> {
        self.build_with_partitioner(Blake3Partitioner)
    }

    pub fn build_with_partitioner<P: Partitioner>(self, partitioner: P) -> Result<HashRing<P>> {
        let ring = HashRing::with_partitioner(self.config, partitioner)?;
        for node in self.nodes {
            ring.add_node(node);
        }
        Ok(ring)
    }
}
