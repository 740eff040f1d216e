//! Bob Jenkins' lookup3 byte hash (the `jhash` of the Linux kernel).
//!
//! Words are read little-endian on every target so a given key and seed
//! hash identically everywhere. Not suitable where keys may be chosen by
//! an adversary: with a fixed, public seed nothing stops a caller from
//! crafting keys that all land in one bucket.

/// Arbitrary starting value mixed into every hash.
pub const JHASH_INITVAL: u32 = 0xdead_beef;

#[inline(always)]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(4);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(6);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(8);
    *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(16);
    *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(19);
    *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(4);
    *b = b.wrapping_add(*a);
}

#[inline(always)]
fn final_mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(24));
}

#[inline(always)]
fn word(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline(always)]
fn add_block(block: &[u8], a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_add(word(&block[0..4]));
    *b = b.wrapping_add(word(&block[4..8]));
    *c = c.wrapping_add(word(&block[8..12]));
}

/// Hashes `key` with the given seed.
pub fn jhash(key: &[u8], initval: u32) -> u32 {
    // The length is folded in modulo 2^32.
    let mut a = JHASH_INITVAL
        .wrapping_add(key.len() as u32)
        .wrapping_add(initval);
    let mut b = a;
    let mut c = a;

    let mut k = key;
    while k.len() > 12 {
        add_block(&k[..12], &mut a, &mut b, &mut c);
        mix(&mut a, &mut b, &mut c);
        k = &k[12..];
    }

    if k.is_empty() {
        return c;
    }
    let mut tail = [0u8; 12];
    tail[..k.len()].copy_from_slice(k);
    add_block(&tail, &mut a, &mut b, &mut c);
    final_mix(&mut a, &mut b, &mut c);
    c
}

/// Maps key bytes to the 32-bit hash a table buckets and filters on.
pub trait KeyHasher {
    fn hash_bytes(&self, key: &[u8]) -> u32;
}

/// `jhash` with a fixed seed. The default seed is 0.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct JHash {
    seed: u32,
}

impl JHash {
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl KeyHasher for JHash {
    #[inline]
    fn hash_bytes(&self, key: &[u8]) -> u32 {
        jhash(key, self.seed)
    }
}

impl<H: KeyHasher + ?Sized> KeyHasher for &H {
    #[inline]
    fn hash_bytes(&self, key: &[u8]) -> u32 {
        (**self).hash_bytes(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_SCORE: &[u8] = b"Four score and seven years ago";

    #[test]
    fn empty_key_is_initval_plus_seed() {
        assert_eq!(jhash(b"", 0), 0xdead_beef);
        assert_eq!(jhash(b"", 1), 0xdead_bef0);
        // Seed wraps the initial state around to zero.
        assert_eq!(jhash(b"", 0x2152_4111), 0);
    }

    #[test]
    fn lookup3_reference_vectors() {
        assert_eq!(jhash(FOUR_SCORE, 0), 0x1777_0551);
        assert_eq!(jhash(FOUR_SCORE, 1), 0xcd62_8161);
    }

    #[test]
    fn deterministic_and_seed_sensitive() {
        for len in 0..=40 {
            let key: Vec<u8> = (0..len as u8).map(|i| i.wrapping_mul(31)).collect();
            assert_eq!(jhash(&key, 0), jhash(&key, 0));
            assert_eq!(jhash(&key, 7), JHash::with_seed(7).hash_bytes(&key));
            if len > 0 {
                assert_ne!(jhash(&key, 0), jhash(&key, 1), "len {len}");
            }
        }
    }

    #[test]
    fn trailing_zero_changes_hash() {
        // Tail padding is zeros, so only the folded length tells these apart.
        assert_ne!(jhash(b"a", 0), jhash(b"a\0", 0));
        assert_ne!(jhash(&[0u8; 12], 0), jhash(&[0u8; 13], 0));
    }

    #[test]
    fn block_boundaries_are_covered() {
        // 12 bytes is a full tail; 13 runs one mixing round first.
        let key = [0xabu8; 25];
        let hashes: Vec<u32> = (10..=25).map(|n| jhash(&key[..n], 0)).collect();
        let mut dedup = hashes.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), hashes.len());
    }

    #[test]
    fn default_hasher_uses_seed_zero() {
        assert_eq!(JHash::default(), JHash::new());
        assert_eq!(JHash::default().seed(), 0);
        assert_eq!(JHash::new().hash_bytes(FOUR_SCORE), jhash(FOUR_SCORE, 0));
        let by_ref = &JHash::new();
        assert_eq!(by_ref.hash_bytes(b"ab"), jhash(b"ab", 0));
    }
}
