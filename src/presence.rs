//! Presence filter: a 256-bit map indexed by the low byte of a key hash.
//!
//! This is not a bloom filter. There is one hash and one bit per key, so
//! a clear bit proves that no key with that hash low byte was ever added,
//! while a set bit only says one might still be present. Bits are never
//! cleared by deletion, so the false-positive rate only grows over the
//! life of a table.

/// Number of addressable bits.
pub const FILTER_BITS: usize = 1 << FILTER_INDEX_BITS;

const FILTER_INDEX_BITS: u32 = 8;
const FILTER_MASK: u32 = (FILTER_BITS - 1) as u32;

/// Gets a bit from the byte.
fn get_bit(byte: u8, idx: usize) -> bool {
    byte & (1 << idx) != 0
}

/// Enables the given bit in the byte.
fn enable_bit(byte: u8, idx: usize) -> u8 {
    byte | (1 << idx)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PresenceFilter([u8; FILTER_BITS / 8]);

impl PresenceFilter {
    pub const fn new() -> Self {
        Self([0; FILTER_BITS / 8])
    }

    #[inline]
    fn slot(hash: u32) -> usize {
        (hash & FILTER_MASK) as usize
    }

    /// Marks the low byte of `hash` as possibly present.
    #[inline]
    pub fn set(&mut self, hash: u32) {
        let idx = Self::slot(hash);
        let byte = &mut self.0[idx / 8];
        *byte = enable_bit(*byte, idx % 8);
    }

    /// False means no key with this hash low byte was ever added.
    #[inline]
    #[must_use]
    pub fn test(&self, hash: u32) -> bool {
        let idx = Self::slot(hash);
        get_bit(self.0[idx / 8], idx % 8)
    }

    /// Number of set bits.
    #[must_use]
    pub fn popcount(&self) -> u32 {
        self.0.iter().map(|b| b.count_ones()).sum()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    // Only valid once the owning table holds no entries.
    pub(crate) fn reset(&mut self) {
        self.0 = [0; FILTER_BITS / 8];
    }
}

impl Default for PresenceFilter {
    fn default() -> Self {
        Self::new()
    }
}
