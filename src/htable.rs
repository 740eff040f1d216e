//! HTable: fixed-size chained table over entries embedded in arena records.

use crate::error::{Error, Result};
use crate::hlist::{self, HlistHead, HlistNode, Linked};
use crate::iter::{Cursor, Entries, Iter};
use crate::jhash::{JHash, KeyHasher};
use crate::presence::PresenceFilter;
use slotmap::{Key, SlotMap};
use std::mem;

/// Bucket count used by `HTable::new`.
pub const DEFAULT_BUCKETS: usize = 16;
/// Bucket count substituted when zero buckets are requested.
pub const MIN_BUCKETS: usize = 10;

/// Link embedded in a caller record, plus the key length seen at the
/// last `add` (`None` until the first one).
///
/// The key bytes themselves stay in the record and are read through
/// [`Hashed::key`]; the table never copies them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HtableEntry<K> {
    node: HlistNode<K>,
    len: Option<usize>,
}

impl<K: Copy> HtableEntry<K> {
    pub const fn new() -> Self {
        Self {
            node: HlistNode::new(),
            len: None,
        }
    }

    /// True while the entry is linked into some table.
    #[inline]
    pub fn is_linked(&self) -> bool {
        !self.node.is_unhashed()
    }

    /// Key length recorded by the last `add`, if there was one.
    #[inline]
    pub fn key_len(&self) -> Option<usize> {
        self.len
    }
}

impl<K: Copy> Default for HtableEntry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// A record that embeds an [`HtableEntry`] and owns the key it is
/// indexed by.
///
/// The bytes returned by `key` must not change while the entry is
/// linked. If they do, lookups for that record stop finding it.
pub trait Hashed<K> {
    fn entry(&self) -> &HtableEntry<K>;
    fn entry_mut(&mut self) -> &mut HtableEntry<K>;
    fn key(&self) -> &[u8];
}

impl<K, T: Hashed<K>> Linked<K> for T {
    #[inline]
    fn node(&self) -> &HlistNode<K> {
        &self.entry().node
    }
    #[inline]
    fn node_mut(&mut self) -> &mut HlistNode<K> {
        &mut self.entry_mut().node
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Bucket<K> {
    pub(crate) head: HlistHead<K>,
    pub(crate) count: usize,
}

impl<K: Copy> Bucket<K> {
    const fn new() -> Self {
        Self {
            head: HlistHead::new(),
            count: 0,
        }
    }
}

/// Chained hash table with a fixed, power-of-two bucket count.
///
/// The table stores arena keys only. Records live in a caller-owned
/// `SlotMap<K, T>` that is passed to every operation; the same arena
/// must be used for the whole life of the table.
#[derive(Debug)]
pub struct HTable<K, S = JHash> {
    buckets: Box<[Bucket<K>]>,
    count: usize,
    filter: PresenceFilter,
    hasher: S,
}

impl<K: Key> HTable<K> {
    /// Table with [`DEFAULT_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::with_hasher(JHash::new())
    }

    /// Table with `n` buckets rounded up to a power of two; `n == 0`
    /// means [`MIN_BUCKETS`].
    ///
    /// # Panics
    ///
    /// Panics if the rounded count overflows `usize`. Allocation failure
    /// aborts; use [`HTable::try_with_capacity`] to handle it instead.
    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, JHash::new())
    }

    /// Like [`HTable::with_capacity`], but reports overflow and allocation
    /// failure.
    pub fn try_with_capacity(n: usize) -> Result<Self> {
        Self::try_with_capacity_and_hasher(n, JHash::new())
    }
}

impl<K: Key> Default for HTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn bucket_count(n: usize) -> Option<usize> {
    let n = if n == 0 { MIN_BUCKETS } else { n };
    n.checked_next_power_of_two()
}

impl<K, S> HTable<K, S>
where
    K: Key,
    S: KeyHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_BUCKETS, hasher)
    }

    pub fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        let Some(size) = bucket_count(n) else {
            panic!("htable bucket count overflow: {n}");
        };
        let buckets = vec![Bucket::new(); size];
        Self::from_buckets(n, buckets, hasher)
    }

    pub fn try_with_capacity_and_hasher(n: usize, hasher: S) -> Result<Self> {
        let size = bucket_count(n).ok_or(Error::CapacityOverflow)?;
        // Past this point a failed reservation can only mean the allocator
        // refused.
        let bytes = size
            .checked_mul(mem::size_of::<Bucket<K>>())
            .ok_or(Error::CapacityOverflow)?;
        if bytes > isize::MAX as usize {
            return Err(Error::CapacityOverflow);
        }
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(size)
            .map_err(|_| Error::Alloc)?;
        buckets.resize(size, Bucket::new());
        Ok(Self::from_buckets(n, buckets, hasher))
    }

    fn from_buckets(requested: usize, buckets: Vec<Bucket<K>>, hasher: S) -> Self {
        let size = buckets.len();
        if size != requested {
            log::debug!("Rounded htable bucket count {requested} up to {size}");
        }
        log::trace!("Initialized htable with {size} buckets");
        Self {
            buckets: buckets.into_boxed_slice(),
            count: 0,
            filter: PresenceFilter::new(),
            hasher,
        }
    }

    /// Releases the bucket array and filter. Records still linked are not
    /// touched and keep stale links; reset them with [`HTable::clear`]
    /// beforehand if they will be added to another table.
    pub fn destroy(self) {
        log::trace!(
            "Destroying htable with {} buckets, {} entries still linked",
            self.size(),
            self.count
        );
    }

    /// Number of linked entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of buckets; always a power of two.
    #[inline]
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Entries linked in bucket `idx`, or `None` past the last bucket.
    pub fn bucket_len(&self, idx: usize) -> Option<usize> {
        self.buckets.get(idx).map(|b| b.count)
    }

    #[inline]
    pub fn which_bucket(&self, hash: u32) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    #[inline]
    pub fn hash_key(&self, key: &[u8]) -> u32 {
        self.hasher.hash_bytes(key)
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn filter(&self) -> &PresenceFilter {
        &self.filter
    }

    pub(crate) fn bucket_head(&self, idx: usize) -> Option<&HlistHead<K>> {
        self.buckets.get(idx).map(|b| &b.head)
    }

    pub(crate) fn buckets(&self) -> &[Bucket<K>] {
        &self.buckets
    }

    /// Links the record `id` at the head of its bucket.
    ///
    /// Keys are not deduplicated: adding a second record with an equal key
    /// keeps both, and lookups see the newest first.
    pub fn add<T: Hashed<K>>(&mut self, arena: &mut SlotMap<K, T>, id: K) -> Result<()> {
        let rec = arena.get_mut(id).ok_or(Error::NoSuchEntry)?;
        if rec.entry().is_linked() {
            return Err(Error::AlreadyLinked);
        }
        let len = rec.key().len();
        let hash = self.hasher.hash_bytes(rec.key());
        rec.entry_mut().len = Some(len);

        let b = self.which_bucket(hash);
        self.filter.set(hash);
        let bucket = &mut self.buckets[b];
        hlist::add_head(arena, &mut bucket.head, b, id);
        bucket.count += 1;
        self.count += 1;
        Ok(())
    }

    // First matching entry with its bucket. The filter gates the scan.
    fn locate<T: Hashed<K>>(&self, arena: &SlotMap<K, T>, key: &[u8]) -> Option<(K, usize)> {
        let hash = self.hasher.hash_bytes(key);
        if !self.filter.test(hash) {
            return None;
        }
        let b = self.which_bucket(hash);
        let head = &self.buckets[b].head;
        if head.is_empty() {
            return None;
        }
        hlist::Iter::new(arena, head.first())
            .find(|(_, rec)| rec.entry().len == Some(key.len()) && rec.key() == key)
            .map(|(id, _)| (id, b))
    }

    /// Newest record whose key equals `key`.
    pub fn find<T: Hashed<K>>(&self, arena: &SlotMap<K, T>, key: &[u8]) -> Option<K> {
        self.locate(arena, key).map(|(id, _)| id)
    }

    /// [`HTable::find`], resolved to the record itself.
    pub fn find_entry<'a, T: Hashed<K>>(
        &self,
        arena: &'a SlotMap<K, T>,
        key: &[u8],
    ) -> Option<&'a T> {
        self.find(arena, key).and_then(|id| arena.get(id))
    }

    pub fn contains_key<T: Hashed<K>>(&self, arena: &SlotMap<K, T>, key: &[u8]) -> bool {
        self.locate(arena, key).is_some()
    }

    fn unlink_from<T: Hashed<K>>(&mut self, arena: &mut SlotMap<K, T>, id: K, b: usize) -> bool {
        let buckets = &mut self.buckets;
        let unlinked = hlist::del_init(arena, id, move |idx| {
            let buckets = buckets;
            &mut buckets[idx].head
        });
        if unlinked {
            self.buckets[b].count -= 1;
            self.count -= 1;
        }
        unlinked
    }

    /// Unlinks the newest record keyed by `key` and returns it.
    pub fn delete_by_key<T: Hashed<K>>(
        &mut self,
        arena: &mut SlotMap<K, T>,
        key: &[u8],
    ) -> Option<K> {
        let (id, b) = self.locate(arena, key)?;
        self.unlink_from(arena, id, b).then_some(id)
    }

    /// Deletes by the key stored in `id`'s record. Returns `None` if that
    /// record was never added to a table.
    ///
    /// With duplicate keys this removes the newest record carrying that
    /// key, which need not be `id`; use [`HTable::unlink`] to remove
    /// exactly `id`.
    pub fn delete_by_entry<T: Hashed<K>>(
        &mut self,
        arena: &mut SlotMap<K, T>,
        id: K,
    ) -> Option<K> {
        let (found, b) = {
            let rec = arena.get(id)?;
            let key = rec.key();
            let len = rec.entry().len?.min(key.len());
            self.locate(arena, &key[..len])?
        };
        self.unlink_from(arena, found, b).then_some(found)
    }

    /// Unlinks exactly `id`. Returns `None` if it is not linked into this
    /// table.
    ///
    /// Finding the bucket walks back links to the chain head, so the cost
    /// grows with `id`'s distance from the head of its chain.
    pub fn unlink<T: Hashed<K>>(&mut self, arena: &mut SlotMap<K, T>, id: K) -> Option<K> {
        let (b, first) = hlist::head_of(arena, id)?;
        // A chain rooted in another table must not touch our heads.
        if self.buckets.get(b)?.head.first() != Some(first) {
            return None;
        }
        self.unlink_from(arena, id, b).then_some(id)
    }

    /// Unlinks every entry, leaving each record ready to be added again,
    /// and resets the presence filter.
    pub fn clear<T: Hashed<K>>(&mut self, arena: &mut SlotMap<K, T>) {
        let mut n = 0;
        for bucket in self.buckets.iter_mut() {
            n += hlist::drain_init(arena, &mut bucket.head);
            bucket.count = 0;
        }
        debug_assert_eq!(n, self.count);
        self.count = 0;
        self.filter.reset();
        log::trace!("Cleared {n} entries from htable");
    }

    /// Linked entries in bucket order, newest first within a bucket.
    pub fn iter<'a, T: Hashed<K>>(&'a self, arena: &'a SlotMap<K, T>) -> Iter<'a, K, T> {
        Iter::new(self, arena)
    }

    /// Like [`HTable::iter`], yielding each record alongside its key.
    pub fn iter_entries<'a, T: Hashed<K>>(
        &'a self,
        arena: &'a SlotMap<K, T>,
    ) -> Entries<'a, K, T> {
        Entries::new(self, arena)
    }

    /// Traversal that tolerates unlinking the entry it just returned.
    pub fn cursor(&self) -> Cursor<K> {
        Cursor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::DefaultKey;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct Item {
        entry: HtableEntry<DefaultKey>,
        name: Vec<u8>,
        value: i32,
        key_reads: Cell<usize>,
    }

    impl Hashed<DefaultKey> for Item {
        fn entry(&self) -> &HtableEntry<DefaultKey> {
            &self.entry
        }
        fn entry_mut(&mut self) -> &mut HtableEntry<DefaultKey> {
            &mut self.entry
        }
        fn key(&self) -> &[u8] {
            self.key_reads.set(self.key_reads.get() + 1);
            &self.name
        }
    }

    fn item(name: &str, value: i32) -> Item {
        Item {
            name: name.as_bytes().to_vec(),
            value,
            ..Default::default()
        }
    }

    type Arena = SlotMap<DefaultKey, Item>;

    fn put(t: &mut HTable<DefaultKey>, arena: &mut Arena, name: &str, value: i32) -> DefaultKey {
        let id = arena.insert(item(name, value));
        t.add(arena, id).unwrap();
        id
    }

    #[derive(Clone, Default)]
    struct ConstHasher;
    impl KeyHasher for ConstHasher {
        fn hash_bytes(&self, _key: &[u8]) -> u32 {
            0
        }
    }

    /// Invariant: a fresh table is empty and has the requested bucket count.
    #[test]
    fn init_sizes() {
        let t: HTable<DefaultKey> = HTable::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.size(), DEFAULT_BUCKETS);
        assert_eq!(t.filter().popcount(), 0);

        let t: HTable<DefaultKey> = HTable::with_capacity(64);
        assert_eq!(t.size(), 64);
        assert!((0..64).all(|i| t.bucket_len(i) == Some(0)));
        assert_eq!(t.bucket_len(64), None);
    }

    /// Invariant: capacities are rounded up to a power of two; zero means
    /// the minimum threshold.
    #[test]
    fn capacity_rounds_to_power_of_two() {
        for (req, size) in [(0, 16), (1, 1), (3, 4), (10, 16), (17, 32), (100, 128)] {
            let t: HTable<DefaultKey> = HTable::with_capacity(req);
            assert_eq!(t.size(), size, "requested {req}");
        }
    }

    #[test]
    fn try_with_capacity_reports_overflow() {
        let r: Result<HTable<DefaultKey>> = HTable::try_with_capacity(usize::MAX);
        assert_eq!(r.err(), Some(Error::CapacityOverflow));

        // A power of two already, but too many bytes for one allocation.
        let r: Result<HTable<DefaultKey>> = HTable::try_with_capacity(1 << (usize::BITS - 1));
        assert_eq!(r.err(), Some(Error::CapacityOverflow));

        let t: HTable<DefaultKey> = HTable::try_with_capacity(5).unwrap();
        assert_eq!(t.size(), 8);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn try_with_capacity_reports_alloc_failure() {
        // Largest power of two whose byte size is still a valid layout;
        // on 64-bit no allocator can satisfy it.
        let per = mem::size_of::<Bucket<DefaultKey>>();
        let n = (isize::MAX as usize / per + 1).next_power_of_two() / 2;
        assert!(n.checked_mul(per).is_some_and(|b| b <= isize::MAX as usize));

        let r: Result<HTable<DefaultKey>> = HTable::try_with_capacity(n);
        assert_eq!(r.err(), Some(Error::Alloc));
    }

    /// Invariant: every added key is found; absent keys are not.
    #[test]
    fn add_find_basic() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let a = put(&mut t, &mut arena, "a", 1);
        let b = put(&mut t, &mut arena, "b", 2);
        let ab = put(&mut t, &mut arena, "ab", 3);
        assert_eq!(t.len(), 3);

        assert_eq!(t.find(&arena, b"a"), Some(a));
        assert_eq!(t.find(&arena, b"b"), Some(b));
        assert_eq!(t.find(&arena, b"ab"), Some(ab));
        assert_eq!(t.find_entry(&arena, b"ab").map(|i| i.value), Some(3));
        assert!(t.contains_key(&arena, b"a"));

        for missing in ["", "ba", "abc", "A"] {
            assert_eq!(t.find(&arena, missing.as_bytes()), None);
        }
        assert!(arena[ab].entry.is_linked());
        assert_eq!(arena[ab].entry.key_len(), Some(2));
    }

    #[test]
    fn add_rejects_stale_and_linked() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let id = put(&mut t, &mut arena, "x", 0);
        assert_eq!(t.add(&mut arena, id), Err(Error::AlreadyLinked));
        assert_eq!(t.len(), 1);

        let gone = arena.insert(item("y", 0));
        arena.remove(gone);
        assert_eq!(t.add(&mut arena, gone), Err(Error::NoSuchEntry));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: duplicates are kept and the newest is found first.
    #[test]
    fn duplicates_newest_first() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let first = put(&mut t, &mut arena, "dup", 1);
        let second = put(&mut t, &mut arena, "dup", 2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.find(&arena, b"dup"), Some(second));

        assert_eq!(t.delete_by_key(&mut arena, b"dup"), Some(second));
        assert_eq!(t.find(&arena, b"dup"), Some(first));
        assert_eq!(t.len(), 1);

        assert_eq!(t.delete_by_key(&mut arena, b"dup"), Some(first));
        assert_eq!(t.find(&arena, b"dup"), None);
        assert_eq!(t.delete_by_key(&mut arena, b"dup"), None);
        assert!(t.is_empty());
    }

    /// Invariant: deleting by entry goes through the key, so with duplicates
    /// the newest record is the one removed.
    #[test]
    fn delete_by_entry_follows_key() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let older = put(&mut t, &mut arena, "k", 1);
        let newer = put(&mut t, &mut arena, "k", 2);

        assert_eq!(t.delete_by_entry(&mut arena, older), Some(newer));
        assert!(arena[older].entry.is_linked());
        assert!(!arena[newer].entry.is_linked());

        assert_eq!(t.delete_by_entry(&mut arena, older), Some(older));
        assert_eq!(t.delete_by_entry(&mut arena, older), None);
        assert!(t.is_empty());
    }

    #[test]
    fn delete_by_entry_never_added_is_absent() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let empty = put(&mut t, &mut arena, "", 1);
        let loose = arena.insert(item("abc", 2));
        assert_eq!(arena[loose].entry.key_len(), None);

        assert_eq!(t.delete_by_entry(&mut arena, loose), None);
        assert_eq!(t.len(), 1);
        assert!(arena[empty].entry.is_linked());
        assert_eq!(t.find(&arena, b""), Some(empty));
    }

    /// Invariant: a deleted entry keeps its remembered key length.
    #[test]
    fn delete_by_entry_after_unlink_uses_remembered_key() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let gone = put(&mut t, &mut arena, "same", 1);
        let live = put(&mut t, &mut arena, "same", 2);
        assert_eq!(t.unlink(&mut arena, gone), Some(gone));
        assert_eq!(arena[gone].entry.key_len(), Some(4));

        assert_eq!(t.delete_by_entry(&mut arena, gone), Some(live));
        assert!(t.is_empty());
    }

    #[test]
    fn unlink_removes_exact_entry() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let older = put(&mut t, &mut arena, "k", 1);
        let newer = put(&mut t, &mut arena, "k", 2);

        assert_eq!(t.unlink(&mut arena, older), Some(older));
        assert_eq!(t.find(&arena, b"k"), Some(newer));
        assert_eq!(t.unlink(&mut arena, older), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn unlink_ignores_entries_of_other_tables() {
        let mut arena = Arena::new();
        let mut t1 = HTable::new();
        let mut t2 = HTable::new();
        let a = put(&mut t1, &mut arena, "a", 1);
        let _b = put(&mut t2, &mut arena, "b", 2);

        assert_eq!(t2.unlink(&mut arena, a), None);
        assert_eq!(t1.find(&arena, b"a"), Some(a));
        assert_eq!((t1.len(), t2.len()), (1, 1));
    }

    /// Invariant: bucket counters always sum to the table count.
    #[test]
    fn bucket_counts_track_links() {
        let mut arena = Arena::new();
        let mut t = HTable::with_capacity(4);
        let ids: Vec<_> = (0..40)
            .map(|i| put(&mut t, &mut arena, &format!("key{i}"), i))
            .collect();
        let sum = |t: &HTable<DefaultKey>| {
            (0..t.size())
                .filter_map(|i| t.bucket_len(i))
                .sum::<usize>()
        };
        assert_eq!(sum(&t), 40);

        for id in ids.iter().step_by(3) {
            let b = t.which_bucket(t.hash_key(&arena[*id].name));
            let before = t.bucket_len(b).unwrap();
            assert!(t.delete_by_entry(&mut arena, *id).is_some());
            assert_eq!(t.bucket_len(b), Some(before - 1));
        }
        assert_eq!(sum(&t), t.len());
        assert_eq!(t.len(), 40 - 14);
    }

    /// Invariant: a clear filter bit short-circuits find before any key
    /// comparison in the bucket.
    #[test]
    fn filter_miss_skips_bucket_scan() {
        let mut arena = Arena::new();
        let mut t = HTable::with_capacity(1);
        let id = put(&mut t, &mut arena, "present", 1);
        let present_low = t.hash_key(b"present") & 0xff;

        let miss = (0..)
            .map(|i| format!("probe{i}"))
            .find(|k| t.hash_key(k.as_bytes()) & 0xff != present_low)
            .unwrap();

        arena[id].key_reads.set(0);
        assert!(!t.filter().test(t.hash_key(miss.as_bytes())));
        assert_eq!(t.find(&arena, miss.as_bytes()), None);
        assert_eq!(arena[id].key_reads.get(), 0);

        // A key sharing the low byte must scan the (single) bucket.
        assert_eq!(t.find(&arena, b"present"), Some(id));
        assert!(arena[id].key_reads.get() > 0);
    }

    /// Invariant: filter bits survive deletion (monotonic).
    #[test]
    fn filter_is_monotonic() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        put(&mut t, &mut arena, "gone", 1);
        let h = t.hash_key(b"gone");
        assert!(t.filter().test(h));

        assert!(t.delete_by_key(&mut arena, b"gone").is_some());
        assert!(t.filter().test(h));
        assert_eq!(t.find(&arena, b"gone"), None);
    }

    /// Invariant: equality is decided on length and bytes even when every
    /// key collides.
    #[test]
    fn collisions_with_const_hasher() {
        let mut arena = Arena::new();
        let mut t: HTable<DefaultKey, ConstHasher> = HTable::with_hasher(ConstHasher);
        let ids: Vec<_> = ["a", "aa", "ab", "b", ""]
            .iter()
            .map(|k| {
                let id = arena.insert(item(k, 0));
                t.add(&mut arena, id).unwrap();
                id
            })
            .collect();
        assert_eq!(t.bucket_len(0), Some(5));
        for (k, id) in ["a", "aa", "ab", "b", ""].iter().zip(&ids) {
            assert_eq!(t.find(&arena, k.as_bytes()), Some(*id));
        }
        assert_eq!(t.delete_by_key(&mut arena, b"aa"), Some(ids[1]));
        assert_eq!(t.find(&arena, b"a"), Some(ids[0]));
        assert_eq!(t.find(&arena, b"ab"), Some(ids[2]));
        assert_eq!(t.bucket_len(0), Some(4));
    }

    /// Invariant: clear unlinks everything and the records can be re-added.
    #[test]
    fn clear_resets_and_allows_reuse() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let ids: Vec<_> = (0..10)
            .map(|i| put(&mut t, &mut arena, &format!("c{i}"), i))
            .collect();
        t.clear(&mut arena);
        assert!(t.is_empty());
        assert_eq!(t.filter().popcount(), 0);
        assert!(ids.iter().all(|id| !arena[*id].entry.is_linked()));
        assert!((0..t.size()).all(|i| t.bucket_len(i) == Some(0)));

        for id in &ids {
            t.add(&mut arena, *id).unwrap();
        }
        assert_eq!(t.len(), 10);
        let found: BTreeSet<_> = (0..10)
            .filter_map(|i| t.find(&arena, format!("c{i}").as_bytes()))
            .collect();
        assert_eq!(found, ids.iter().copied().collect::<BTreeSet<_>>());
    }

    #[test]
    fn iteration_visits_each_once() {
        let mut arena = Arena::new();
        let mut t = HTable::with_capacity(2);
        let ids: BTreeSet<_> = (0..25)
            .map(|i| put(&mut t, &mut arena, &format!("it{i}"), i))
            .collect();

        let seen: Vec<_> = t.iter(&arena).collect();
        assert_eq!(seen.len(), 25);
        assert_eq!(seen.iter().copied().collect::<BTreeSet<_>>(), ids);

        let values: i32 = t.iter_entries(&arena).map(|(_, it)| it.value).sum();
        assert_eq!(values, (0..25).sum());
    }

    #[test]
    fn destroy_leaves_records_alone() {
        let mut arena = Arena::new();
        let mut t = HTable::new();
        let id = put(&mut t, &mut arena, "kept", 7);
        t.destroy();
        assert_eq!(arena[id].value, 7);
        assert!(arena[id].entry.is_linked());
    }
}
