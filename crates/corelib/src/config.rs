//! Ring configuration.
//!
//! The configuration surface is deliberately small: the number of virtual
//! nodes per physical node and the width of the hash space. Both are fixed
//! for the lifetime of a ring.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of virtual nodes per physical node.
pub const DEFAULT_REPLICAS: usize = 100;

/// Default width of the ring space in bits.
pub const DEFAULT_HASH_WIDTH: u32 = 64;

/// Narrowest accepted ring space. Below this, vnode collisions stop being rare
/// even for tiny clusters.
pub const MIN_HASH_WIDTH: u32 = 16;

/// Widest accepted ring space (positions are `u64`).
pub const MAX_HASH_WIDTH: u32 = 64;

/// Configuration for a [`HashRing`](crate::ring::HashRing).
///
/// # Example
///
/// ```rust
/// use corelib::RingConfig;
///
/// let config = RingConfig::from_json(r#"{ "replicas": 150 }"#).unwrap();
/// assert_eq!(config.replicas, 150);
/// assert_eq!(config.hash_width, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingConfig {
    /// Virtual nodes per physical node (R). Must be greater than zero.
    pub replicas: usize,
    /// Bits kept from the digest, in `16..=64`.
    pub hash_width: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            hash_width: DEFAULT_HASH_WIDTH,
        }
    }
}

impl RingConfig {
    /// Configuration with the given replica count and the default hash width.
    pub fn new(replicas: usize) -> Self {
        Self {
            replicas,
            ..Self::default()
        }
    }

    pub fn with_hash_width(mut self, hash_width: u32) -> Self {
        self.hash_width = hash_width;
        self
    }

    /// Parse a JSON document. Missing fields take their defaults; the result
    /// is validated before it is returned.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the replica count and hash width are usable.
    pub fn validate(&self) -> Result<()> {
        if self.replicas == 0 {
            return Err(Error::InvalidConfig(
                "replica count must be greater than zero".to_string(),
            ));
        }
        validate_hash_width(self.hash_width)
    }

    /// Birthday-bound estimate of the probability that at least two of the
    /// `replicas * max_nodes` vnode positions share a slot.
    pub fn collision_probability(&self, max_nodes: usize) -> f64 {
        let positions = (self.replicas as f64) * (max_nodes as f64);
        let space = 2f64.powi(self.hash_width as i32);
        1.0 - (-(positions * (positions - 1.0)) / (2.0 * space)).exp()
    }
}

pub(crate) fn validate_hash_width(hash_width: u32) -> Result<()> {
    if !(MIN_HASH_WIDTH..=MAX_HASH_WIDTH).contains(&hash_width) {
        return Err(Error::InvalidConfig(format!(
            "hash width must be within {}..={} bits, got {}",
            MIN_HASH_WIDTH, MAX_HASH_WIDTH, hash_width
        )));
    }
    Ok(())
}
