//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting raw key bytes into a 64-bit
//! digest. The [`RingHasher`](crate::hasher::RingHasher) narrows that digest
//! to the configured ring width.

pub mod blake3;
pub mod siphash;
pub mod traits;
pub mod xxh3;

pub use self::blake3::Blake3Partitioner;
pub use siphash::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;
