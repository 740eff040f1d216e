//! hlist: hash-chain lists threaded through records stored in a `SlotMap`.
//!
//! A chain is a singly linked list with a back link (`pprev`) on every
//! node, so unlinking never walks the chain. Links are arena keys rather
//! than pointers: a node names its successor and either its predecessor
//! or the index of the head it hangs off. Recovering the enclosing record
//! from a link is an arena lookup.

use slotmap::{Key, SlotMap};

/// What a linked node points back at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Prev<K> {
    /// First node of the chain rooted at head `idx`.
    Head(usize),
    /// Any later node; holds the predecessor.
    Node(K),
}

/// Link embedded in a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HlistNode<K> {
    next: Option<K>,
    pprev: Option<Prev<K>>,
}

impl<K: Copy> HlistNode<K> {
    pub const fn new() -> Self {
        Self {
            next: None,
            pprev: None,
        }
    }

    /// True when the node is not on any chain.
    #[inline]
    pub fn is_unhashed(&self) -> bool {
        self.pprev.is_none()
    }

    #[inline]
    pub fn next(&self) -> Option<K> {
        self.next
    }

    #[inline]
    pub fn pprev(&self) -> Option<Prev<K>> {
        self.pprev
    }

    // Clears both links and returns the old successor.
    fn detach(&mut self) -> Option<K> {
        self.pprev = None;
        self.next.take()
    }
}

impl<K: Copy> Default for HlistNode<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of a chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HlistHead<K> {
    first: Option<K>,
}

impl<K: Copy> HlistHead<K> {
    pub const fn new() -> Self {
        Self { first: None }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    #[inline]
    pub fn first(&self) -> Option<K> {
        self.first
    }
}

impl<K: Copy> Default for HlistHead<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Records that embed an `HlistNode`.
pub trait Linked<K> {
    fn node(&self) -> &HlistNode<K>;
    fn node_mut(&mut self) -> &mut HlistNode<K>;
}

/// Links `id` in front of the chain rooted at `head` (which lives at
/// index `head_idx` of its owner). Returns false if `id` does not resolve.
///
/// The node must be unhashed; relinking a live node corrupts both chains.
pub fn add_head<K, T>(
    arena: &mut SlotMap<K, T>,
    head: &mut HlistHead<K>,
    head_idx: usize,
    id: K,
) -> bool
where
    K: Key,
    T: Linked<K>,
{
    let first = head.first;
    let Some(rec) = arena.get_mut(id) else {
        return false;
    };
    let node = rec.node_mut();
    debug_assert!(node.is_unhashed(), "add_head on a linked node");
    node.next = first;
    node.pprev = Some(Prev::Head(head_idx));

    if let Some(old) = first.and_then(|f| arena.get_mut(f)) {
        old.node_mut().pprev = Some(Prev::Node(id));
    }
    head.first = Some(id);
    true
}

/// Unlinks `id` and leaves it unhashed so it can be linked again.
///
/// `head` is asked for the root only when `id` is first on its chain.
/// Returns false if `id` does not resolve or is not linked.
pub fn del_init<'h, K, T, F>(arena: &mut SlotMap<K, T>, id: K, head: F) -> bool
where
    K: Key + 'h,
    T: Linked<K>,
    F: FnOnce(usize) -> &'h mut HlistHead<K>,
{
    let Some(rec) = arena.get_mut(id) else {
        return false;
    };
    let node = rec.node_mut();
    let Some(pprev) = node.pprev else {
        return false;
    };
    let next = node.detach();

    match pprev {
        Prev::Head(idx) => head(idx).first = next,
        Prev::Node(p) => {
            if let Some(prev) = arena.get_mut(p) {
                prev.node_mut().next = next;
            }
        }
    }
    if let Some(succ) = next.and_then(|n| arena.get_mut(n)) {
        succ.node_mut().pprev = Some(pprev);
    }
    true
}

/// Follows back links from `id` to the root of its chain. Returns the
/// head index and the first node, or `None` if `id` is unhashed.
pub fn head_of<K, T>(arena: &SlotMap<K, T>, id: K) -> Option<(usize, K)>
where
    K: Key,
    T: Linked<K>,
{
    let mut cur = id;
    loop {
        match arena.get(cur)?.node().pprev? {
            Prev::Head(idx) => return Some((idx, cur)),
            Prev::Node(p) => cur = p,
        }
    }
}

/// Empties the chain rooted at `head`, leaving every node unhashed.
/// Returns how many nodes were detached.
pub fn drain_init<K, T>(arena: &mut SlotMap<K, T>, head: &mut HlistHead<K>) -> usize
where
    K: Key,
    T: Linked<K>,
{
    let mut n = 0;
    let mut cur = head.first.take();
    while let Some(id) = cur {
        cur = arena.get_mut(id).and_then(|rec| rec.node_mut().detach());
        n += 1;
    }
    n
}

/// Walks one chain in link order, yielding each key with its record.
pub struct Iter<'a, K: Key, T> {
    arena: &'a SlotMap<K, T>,
    cur: Option<K>,
}

impl<'a, K: Key, T> Iter<'a, K, T> {
    pub fn new(arena: &'a SlotMap<K, T>, first: Option<K>) -> Self {
        Self { arena, cur: first }
    }
}

impl<'a, K, T> Iterator for Iter<'a, K, T>
where
    K: Key,
    T: Linked<K>,
{
    type Item = (K, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let rec = self.arena.get(id)?;
        self.cur = rec.node().next;
        Some((id, rec))
    }
}
