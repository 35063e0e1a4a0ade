//! shiftmap: single-threaded open-addressing hash maps and sets with
//! Fibonacci placement, linear probing and backward-shift deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one table engine shared by every container, so object keys,
//!   integer keys, maps and sets differ only in how a key sits in a slot
//!   and how it is hashed.
//! - Layers:
//!   - `placement`: folds a 64-bit hash into a power-of-two table by
//!     multiplying with 2^64/phi and keeping the top bits; computes table
//!     sizes and growth thresholds from a load factor.
//!   - `keys`: slot representations. Object keys use `Option<K>`; integer
//!     keys are stored bare with `0` meaning vacant.
//!   - `RawTable<S, V>`: parallel key/value arrays, `locate`, insert,
//!     backward-shift removal, resize, clear, reserve and shrink. Callers
//!     pass hashes and equality closures, so it never names a hasher.
//!   - Containers: `ObjectMap`, `ObjectIntMap`, `IntMap`/`LongMap`,
//!     `IntIntMap`, `ObjectSet`. Integer maps keep key `0` in a side
//!     `Option` next to the table.
//!   - `Table`: the operation set every container exposes.
//!   - `Ordered<B: Table>`: insertion-order overlay by composition.
//!   - `view`: detached `Cursor`s, per-container ticket registries, and
//!     borrowing `Entries`/`Keys`/`Values` iterators.
//!
//! Constraints
//! - Single-threaded: view registries use `Cell`/`RefCell`, so containers
//!   are `!Sync`. They are `Send` when their keys, values and hasher are,
//!   so a `Mutex` can share one across threads.
//! - Table sizes are powers of two between 2 and 2^30 slots; the table
//!   always keeps a vacant slot, so probe loops terminate.
//! - Probe chains never contain holes: removal shifts later chain members
//!   back instead of leaving tombstones.
//! - Growth doubles once the entry count (zero key included) reaches
//!   `floor(slots * load_factor)`. Nothing shrinks implicitly.
//!
//! Reentrancy policy
//! - `RawTable` runs user `Eq` while probing and user `Hash` while
//!   shifting and rehashing, with its arrays transiently rearranged. A
//!   debug-only `DebugReentrancy` guard is entered around those sections
//!   and panics if a callback reaches back into the same table.
//! - Outside those sections the table is consistent. Values dropped after
//!   `remove` returns may touch the container freely.
//!
//! Views
//! - Under `IterationPolicy::Reuse` (the default) a container keeps one
//!   live ticket per view kind; requesting a new view of a kind retires
//!   the old one, which then fails with `ViewError::Invalidated`. Under
//!   `IterationPolicy::Allocate` views never expire and may nest.
//! - `iter()` and `&container` iteration always use a ticket that never
//!   expires.
//! - A `Cursor` does not borrow its container, so it can remove the
//!   current entry; a later entry shifted into the vacated slot is
//!   revisited rather than skipped.
//!
//! Notes and non-goals
//! - No thread safety and no protection against adversarial hashes
//!   beyond what the chosen `BuildHasher` provides.
//! - Integer maps cannot store their key `0` in the slot array; it lives
//!   in `zero` and is visited first by views.
//! - Unordered containers iterate in slot order, which depends on
//!   hashing and table size.
//! - The `*_identity` searches compare addresses, so they only match
//!   references obtained from the container itself.

pub mod config;
pub mod error;
mod int_int_map;
mod int_map;
pub mod keys;
mod object_int_map;
mod object_map;
mod object_set;
mod ordered;
pub mod placement;
mod raw_table;
mod raw_table_proptest;
mod reentrancy;
mod table;
pub mod view;

// Public surface
pub use config::{IterationPolicy, TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use error::{Result, TableError, ViewError};
pub use int_int_map::IntIntMap;
pub use int_map::{IntMap, LongMap};
pub use keys::{IntKey, KeySlot};
pub use object_int_map::ObjectIntMap;
pub use object_map::ObjectMap;
pub use object_set::ObjectSet;
pub use ordered::{Ordered, OrderedIntMap, OrderedMap, OrderedSet};
pub use table::Table;
pub use view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind};
