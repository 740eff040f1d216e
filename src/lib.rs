//! htable: a single-threaded, fixed-size chained hash table whose entries
//! are embedded in records the caller owns.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: index caller records by a byte key without the table ever
//!   allocating, copying or owning anything per entry.
//! - Layers:
//!   - `jhash`: lookup3 byte hash behind a small `KeyHasher` trait; the
//!     table uses `JHash` with seed 0 unless told otherwise.
//!   - `hlist`: hash-chain lists linked through arena keys, with a back
//!     link per node so unlinking from a known head is O(1).
//!   - `presence`: 256-bit filter on the hash low byte that lets `find`
//!     skip the bucket walk for provably absent keys.
//!   - `HTable<K, S>`: the bucket array, counters and filter; exposes
//!     add/find/delete and the traversals in `iter`.
//!
//! Embedding
//! - Records live in a caller-owned `slotmap::SlotMap<K, T>`. Each record
//!   embeds an `HtableEntry<K>` and implements `Hashed<K>` to expose it
//!   along with its key bytes.
//! - The table stores arena keys only. "Recovering the enclosing record"
//!   from an entry is `arena[id]`; there is no pointer arithmetic and no
//!   unsafe code.
//! - Every operation takes the arena explicitly. One table must always be
//!   used with the same arena.
//!
//! Constraints
//! - Single-threaded: no locks or atomics. `&mut self` serializes
//!   mutation; share across threads behind a `Mutex` if needed.
//! - Fixed bucket count, rounded up to a power of two at construction.
//!   There is no rehashing, however long a chain grows.
//! - Duplicate keys are allowed. Entries go in at the head of a bucket
//!   chain, so lookups and traversals see the newest first.
//! - Keys are borrowed from the record and never copied; mutating them
//!   while linked makes the record unreachable by key (but never unsafe).
//!
//! Presence filter
//! - Bits are set on add and never cleared by delete, so its
//!   false-positive rate only grows. `clear` is the one place that resets
//!   it, because the table is empty afterwards.
//!
//! Failure model
//! - Lookups and deletes report absence with `None`.
//! - `add` rejects stale keys and already-linked records (`Error`).
//! - `with_capacity` aborts on allocation failure like any `Vec`;
//!   `try_with_capacity` reports it instead.
//! - `destroy` consumes the table, so use-after-destroy cannot compile.
//!   It leaves linked records untouched.
//!
//! Hashing
//! - The default seed is fixed and public. Keys chosen by an adversary
//!   can all be steered into one bucket; use a seeded `JHash` or another
//!   `KeyHasher` if that matters.

mod error;
pub mod hlist;
pub mod htable;
mod htable_proptest;
pub mod iter;
pub mod jhash;
pub mod presence;

// Public surface
pub use error::{Error, Result};
pub use htable::{HTable, Hashed, HtableEntry, DEFAULT_BUCKETS, MIN_BUCKETS};
pub use iter::{Cursor, Entries, Iter};
pub use jhash::{jhash, JHash, KeyHasher};
pub use presence::{PresenceFilter, FILTER_BITS};
