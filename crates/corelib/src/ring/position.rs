//! Ring position implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::validate_hash_width;
use crate::error::Result;

/// A position on the consistent hash ring.
///
/// Positions live in a circular `w`-bit space: the largest position
/// (`2^w - 1`) is adjacent to position 0. The ring width is a property of the
/// ring, not of the position, so arithmetic that depends on it takes the
/// width explicitly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RingPosition(pub u64);

impl RingPosition {
    /// Start of the ring.
    pub const MIN: RingPosition = RingPosition(0);

    /// Largest position on a ring of the given width.
    ///
    /// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) for a
    /// width outside 16..=64.
    pub fn max_for_width(hash_width: u32) -> Result<Self> {
        validate_hash_width(hash_width)?;
        Ok(RingPosition(u64::MAX >> (64 - hash_width)))
    }

    /// Clockwise distance from `self` to `other` on a ring of the given width.
    ///
    /// Equal positions are 0 apart; callers treating a lone vnode as owning
    /// the whole circle handle that case themselves.
    ///
    /// # Panics
    /// If `hash_width` is 128 or more. Ring widths are at most 64 bits.
    #[inline]
    pub fn distance_to(&self, other: &Self, hash_width: u32) -> u128 {
        let space = ring_size(hash_width);
        (other.0 as u128 + space - self.0 as u128) % space
    }
}

/// Number of distinct positions on a ring of the given width. Callers pass a
/// width already validated to 16..=64.
#[inline]
pub(crate) fn ring_size(hash_width: u32) -> u128 {
    1u128 << hash_width
}

impl fmt::Display for RingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for RingPosition {
    fn from(value: u64) -> Self {
        RingPosition(value)
    }
}
