//! Core library for consistent hashing.
//!
//! This crate provides the routing core of the workspace:
//! - Partitioners that turn keys into ring positions (`RingHasher`)
//! - The virtual-node hash ring and its builder (`HashRing`, `RingBuilder`)
//! - Read-only topology snapshots (ownership, owned ranges)
//! - Placement snapshots for measuring key relocation across topology changes
//!
//! The ring is an in-process structure. It knows nothing about what a node
//! does; a node is only an opaque identifier.

pub mod config;
pub mod error;
pub mod hasher;
pub mod node;
pub mod partitioner;
pub mod placement;
pub mod ring;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use hasher::RingHasher;
pub use node::NodeId;
pub use partitioner::Partitioner;
pub use placement::{DistributionStats, Placement, Relocation};
pub use ring::{HashRing, RingBuilder, RingPosition, RingStats, RingTopology, TokenRange};
pub use vnode::VirtualNode;
