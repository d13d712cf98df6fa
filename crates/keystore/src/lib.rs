//! Per-node key/value storage routed by a consistent hash ring.
//!
//! This crate is a collaborator of the ring, not part of it: it drives
//! `add_node`, `remove_node` and `get_node`, and performs its own migration
//! loop when the topology changes. The store owns its ring and hands out
//! only read views, so every topology change migrates entries.
//!
//! - Writes land on the node the ring names for the key
//! - Removing a node hands each of its entries to the key's new owner
//! - Adding a node pulls in the entries it now owns from the other nodes

pub mod error;
pub mod migration;
pub mod store;

pub use error::StoreError;
pub use migration::{KeyMove, MigrationReport};
pub use store::KeyStore;
