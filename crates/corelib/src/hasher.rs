//! Deterministic key → ring position mapping.
//!
//! The same hasher places virtual nodes and locates keys, so both live in
//! the same space and look uniformly random on the ring.

use crate::config::{validate_hash_width, DEFAULT_HASH_WIDTH};
use crate::error::Result;
use crate::partitioner::{Blake3Partitioner, Partitioner};
use crate::ring::RingPosition;

/// Maps strings to positions in a `hash_width`-bit circular space.
///
/// Input is hashed as its UTF-8 bytes. The partitioner's 64-bit digest is
/// narrowed by keeping its most significant `hash_width` bits, so a 64-bit
/// ring uses the digest unchanged.
///
/// # Example
///
/// ```rust
/// use corelib::RingHasher;
///
/// let hasher: RingHasher = RingHasher::default();
/// assert_eq!(hasher.hash("Key0"), hasher.hash("Key0"));
/// ```
#[derive(Clone, Debug)]
pub struct RingHasher<P = Blake3Partitioner> {
    partitioner: P,
    hash_width: u32,
}

impl Default for RingHasher {
    fn default() -> Self {
        Self {
            partitioner: Blake3Partitioner,
            hash_width: DEFAULT_HASH_WIDTH,
        }
    }
}

impl<P: Partitioner> RingHasher<P> {
    /// Creates a hasher over the given partitioner and ring width.
    pub fn new(partitioner: P, hash_width: u32) -> Result<Self> {
        validate_hash_width(hash_width)?;
        Ok(Self {
            partitioner,
            hash_width,
        })
    }

    /// Position of a string key on the ring.
    #[inline]
    pub fn hash(&self, input: &str) -> RingPosition {
        self.hash_bytes(input.as_bytes())
    }

    /// Position of raw bytes on the ring.
    pub fn hash_bytes(&self, input: &[u8]) -> RingPosition {
        let digest = self.partitioner.partition(input);
        RingPosition(digest >> (64 - self.hash_width))
    }

    pub fn hash_width(&self) -> u32 {
        self.hash_width
    }

    pub fn partitioner(&self) -> &P {
        &self.partitioner
    }
}
