//! Traversals over an `HTable`.
//!
//! All of them walk buckets in index order and each chain in link order,
//! which is newest-first because entries are added at the head. None can
//! be restarted part way through.

use crate::hlist;
use crate::htable::{Bucket, HTable, Hashed};
use crate::jhash::KeyHasher;
use slotmap::{Key, SlotMap};

/// Linked entries with their records.
pub struct Entries<'a, K: Key, T> {
    buckets: core::slice::Iter<'a, Bucket<K>>,
    chain: hlist::Iter<'a, K, T>,
    arena: &'a SlotMap<K, T>,
    remaining: usize,
}

impl<'a, K: Key, T: Hashed<K>> Entries<'a, K, T> {
    pub(crate) fn new<S: KeyHasher>(table: &'a HTable<K, S>, arena: &'a SlotMap<K, T>) -> Self {
        Self {
            buckets: table.buckets().iter(),
            chain: hlist::Iter::new(arena, None),
            arena,
            remaining: table.len(),
        }
    }
}

impl<'a, K: Key, T: Hashed<K>> Iterator for Entries<'a, K, T> {
    type Item = (K, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.chain.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(item);
            }
            let bucket = self.buckets.next()?;
            self.chain = hlist::Iter::new(self.arena, bucket.head.first());
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: Key, T: Hashed<K>> ExactSizeIterator for Entries<'a, K, T> {}

/// Linked entries as bare arena keys.
pub struct Iter<'a, K: Key, T> {
    inner: Entries<'a, K, T>,
}

impl<'a, K: Key, T: Hashed<K>> Iter<'a, K, T> {
    pub(crate) fn new<S: KeyHasher>(table: &'a HTable<K, S>, arena: &'a SlotMap<K, T>) -> Self {
        Self {
            inner: Entries::new(table, arena),
        }
    }
}

impl<'a, K: Key, T: Hashed<K>> Iterator for Iter<'a, K, T> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(id, _)| id)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: Key, T: Hashed<K>> ExactSizeIterator for Iter<'a, K, T> {}

/// Detached traversal that holds no borrow between steps.
///
/// Each step reads the successor before returning, so the caller may
/// unlink (or delete) the entry it was just handed and keep going.
/// Unlinking any other entry mid-pass may skip or end the traversal.
#[derive(Clone, Debug)]
pub struct Cursor<K> {
    bucket: usize,
    next: Option<K>,
}

impl<K: Key> Cursor<K> {
    pub(crate) fn new() -> Self {
        Self {
            bucket: 0,
            next: None,
        }
    }

    pub fn next<S, T>(&mut self, table: &HTable<K, S>, arena: &SlotMap<K, T>) -> Option<K>
    where
        S: KeyHasher,
        T: Hashed<K>,
    {
        loop {
            if let Some(id) = self.next.take() {
                self.next = arena.get(id).and_then(|rec| hlist::Linked::node(rec).next());
                return Some(id);
            }
            self.next = table.bucket_head(self.bucket)?.first();
            self.bucket += 1;
        }
    }

    /// [`Cursor::next`], resolved to the record.
    pub fn next_entry<'a, S, T>(
        &mut self,
        table: &HTable<K, S>,
        arena: &'a SlotMap<K, T>,
    ) -> Option<(K, &'a T)>
    where
        S: KeyHasher,
        T: Hashed<K>,
    {
        let id = self.next(table, arena)?;
        arena.get(id).map(|rec| (id, rec))
    }
}
