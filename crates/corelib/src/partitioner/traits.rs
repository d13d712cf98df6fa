//! Core partitioner trait definitions.

use std::fmt::Debug;

/// A partitioner converts keys into 64-bit digests for placement on the ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// hashing without synchronization overhead. Implementations must be
/// deterministic across processes: no random seeds.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Converts a key into a digest.
    ///
    /// When the underlying digest is wider than 64 bits, the first 8 bytes
    /// are read as a big-endian integer so the most significant bits come
    /// first.
    fn partition(&self, key: &[u8]) -> u64;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
