//! Consistent hash ring implementation.
//!
//! The ring manages virtual-node positions and provides efficient lookup
//! operations for finding the node responsible for a key.

pub mod position;
pub mod ring;
pub mod topology;

pub use position::RingPosition;
pub use ring::{HashRing, RingBuilder, RingStats};
pub use topology::{RingTopology, TokenRange};
