//! ObjectSet: unordered set of `K: Hash + Eq` on the shared table engine.

use crate::config::{TableConfig, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::raw_table::RawTable;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Keys, Position, ViewKind, ViewRegistry};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// ```
/// use shiftmap::ObjectSet;
///
/// let mut s: ObjectSet<&str> = ["a", "b"].into_iter().collect();
/// assert!(!s.add("a"));
/// assert!(s.add("c"));
/// assert!(s.remove("b"));
/// assert_eq!(s.len(), 2);
/// ```
#[derive(Clone)]
pub struct ObjectSet<K, S = RandomState> {
    table: RawTable<Option<K>, ()>,
    hasher: S,
    views: ViewRegistry,
}

impl<K> ObjectSet<K, RandomState>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, S> ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        match Self::with_config_and_hasher(TableConfig::with_capacity(capacity), hasher) {
            Ok(set) => set,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: RawTable::from_config(&config)?,
            hasher,
            views: ViewRegistry::new(config.iteration),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    pub fn table_size(&self) -> usize {
        self.table.slot_count()
    }

    fn locate<Q>(&self, key: &Q) -> core::result::Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table
            .locate(self.hasher.hash_one(key), |k| <K as Borrow<Q>>::borrow(k) == key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).is_ok()
    }

    /// The stored key equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        self.table.key_at(i)
    }

    /// Adds `key`. Returns false, keeping the stored key, if an equal key
    /// was already present.
    pub fn add(&mut self, key: K) -> bool {
        match self.locate(&key) {
            Ok(_) => false,
            Err(i) => {
                let hasher = &self.hasher;
                self.table.insert_at(i, key, (), 0, |k| hasher.hash_one(k));
                true
            }
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        let hasher = &self.hasher;
        Some(self.table.remove_at(i, |k| hasher.hash_one(k)).key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        let hasher = &self.hasher;
        self.table.retain(|k, _| keep(k), |k| hasher.hash_one(k));
    }

    /// Panics on overflow; see [`try_ensure_capacity`](Self::try_ensure_capacity).
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(e) = self.try_ensure_capacity(additional) {
            panic!("{e}");
        }
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let total = self.len().saturating_add(additional);
        let hasher = &self.hasher;
        self.table.ensure_capacity(total, |k| hasher.hash_one(k))
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        let live = self.len();
        let hasher = &self.hasher;
        self.table.shrink(max_capacity, live, |k| hasher.hash_one(k));
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity);
    }

    /// Traversal that never expires, whatever the iteration policy.
    pub fn iter(&self) -> Keys<'_, Self> {
        Keys::new(self, ViewRegistry::fresh(ViewKind::Keys))
    }

    /// Keys view; under the reuse policy the next `keys()` retires it.
    pub fn keys(&self) -> Keys<'_, Self> {
        Keys::new(self, self.views.issue(ViewKind::Keys))
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.views.issue(ViewKind::Keys))
    }
}

impl<K, S> ObjectSet<K, S> {
    /// The key in the lowest occupied slot. Which key that is depends on
    /// hashing, not on insertion order.
    pub fn first(&self) -> Option<&K> {
        self.table.iter().next().map(|(k, _)| k)
    }
}

impl<K, S> CursorTarget for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Key = K;
    type Value = ();

    fn views(&self) -> &ViewRegistry {
        &self.views
    }

    fn has_sentinel(&self) -> bool {
        false
    }

    fn slot_count(&self) -> usize {
        self.table.slot_count()
    }

    fn entry_at(&self, pos: Position) -> Option<(&K, &())> {
        match pos {
            Position::Sentinel => None,
            Position::Slot(i) => self.table.slot(i),
        }
    }

    fn remove_at(&mut self, pos: Position) -> Option<usize> {
        let Position::Slot(i) = pos else { return None };
        if !self.table.is_occupied(i) {
            return None;
        }
        let hasher = &self.hasher;
        self.table.remove_at(i, |k| hasher.hash_one(k)).refilled_from
    }
}

impl<K, S> Table for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = ();

    const KEYS_ONLY: bool = true;

    fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }

    fn len(&self) -> usize {
        ObjectSet::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn get(&self, key: &K) -> Option<&()> {
        let i = self.locate(key).ok()?;
        self.table.value_at(i)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut ()> {
        let i = self.locate(key).ok()?;
        self.table.value_at_mut(i)
    }

    fn put(&mut self, key: K, _value: ()) -> Option<()> {
        (!self.add(key)).then_some(())
    }

    fn remove(&mut self, key: &K) -> Option<()> {
        ObjectSet::remove(self, key).then_some(())
    }

    fn clear(&mut self) {
        ObjectSet::clear(self)
    }

    fn clear_to(&mut self, max_capacity: usize) {
        ObjectSet::clear_to(self, max_capacity)
    }

    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        ObjectSet::try_ensure_capacity(self, additional)
    }

    fn shrink(&mut self, max_capacity: usize) {
        ObjectSet::shrink(self, max_capacity)
    }

    fn views(&self) -> &ViewRegistry {
        &self.views
    }
}

impl<K, S> Default for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, S::default())
    }
}

impl<K: fmt::Debug, S> fmt::Debug for ObjectSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, (k, _)) in self.table.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}")?;
        }
        f.write_str("}")
    }
}

impl<K, S> PartialEq for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.table.iter().all(|(k, _)| other.contains(k))
    }
}

impl<K, S> Eq for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
}

impl<K, S> Extend<K> for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for k in iter {
            self.add(k);
        }
    }
}

impl<K, S> FromIterator<K> for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, K, S> IntoIterator for &'a ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a K;
    type IntoIter = Keys<'a, ObjectSet<K, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
