//! BLAKE3 partitioner implementation.

use crate::partitioner::traits::Partitioner;

/// Cryptographic partitioner, the default for every ring.
///
/// Takes the first 64 bits of the 256-bit BLAKE3 digest, big-endian. Resists
/// adversarial key clustering when keys come from untrusted input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn partition(&self, key: &[u8]) -> u64 {
        let digest = blake3::hash(key);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_be_bytes(prefix)
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
