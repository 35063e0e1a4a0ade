//! ObjectMap: hash map from arbitrary `K: Hash + Eq` keys to values.
//!
//! Keys hash through the map's `BuildHasher` and the 64-bit result is
//! folded into the table by Fibonacci placement. Lookups accept any
//! borrowed form of the key, like `std::collections::HashMap`.

use crate::config::{TableConfig, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::raw_table::RawTable;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind, ViewRegistry};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Unordered map with open addressing, linear probing and backward-shift
/// deletion.
///
/// ```
/// use shiftmap::ObjectMap;
///
/// let mut m = ObjectMap::new();
/// assert_eq!(m.put("a", 1), None);
/// assert_eq!(m.put("a", 2), Some(1));
/// assert_eq!(m.get("a"), Some(&2));
/// assert_eq!(m.remove("a"), Some(2));
/// assert!(m.is_empty());
/// ```
#[derive(Clone)]
pub struct ObjectMap<K, V, S = RandomState> {
    table: RawTable<Option<K>, V>,
    hasher: S,
    views: ViewRegistry,
}

impl<K, V> ObjectMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    /// Empty map sized for 51 entries at load factor 0.8.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty map whose table is sized for `capacity` entries at the load
    /// factor. The insert that brings the count up to the threshold still
    /// doubles the table, which can be the `capacity`-th one; call
    /// [`ensure_capacity`](Self::ensure_capacity) to reserve strictly.
    ///
    /// Panics if that needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, S> ObjectMap<K, V, S>
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
            Ok(map) => map,
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

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current number of slots (a power of two).
    pub fn table_size(&self) -> usize {
        self.table.slot_count()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    fn locate<Q>(&self, key: &Q) -> core::result::Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table
            .locate(self.hasher.hash_one(key), |k| <K as Borrow<Q>>::borrow(k) == key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).is_ok()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        self.table.value_at(i)
    }

    /// The value for `key`, or `default` when absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        self.table.value_at_mut(i)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        self.table.slot(i)
    }

    /// Inserts or overwrites. An existing key keeps its slot and its
    /// original key object; only the value is replaced.
    ///
    /// Panics if growing the table would need more than 2^30 slots.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key) {
            Ok(i) => self.table.replace_value(i, value),
            Err(i) => {
                let hasher = &self.hasher;
                self.table
                    .insert_at(i, key, value, 0, |k| hasher.hash_one(k));
                None
            }
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = self.locate(key).ok()?;
        let hasher = &self.hasher;
        let removed = self.table.remove_at(i, |k| hasher.hash_one(k));
        Some((removed.key, removed.value))
    }

    /// Keeps only the entries for which `keep` returns true. Each entry is
    /// offered to `keep` once.
    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        let hasher = &self.hasher;
        self.table.retain(keep, |k| hasher.hash_one(k));
    }

    /// Grows the table so that `additional` more entries fit without a
    /// resize. Panics on overflow; see [`try_ensure_capacity`](Self::try_ensure_capacity).
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

    /// Reduces the table to the size `max_capacity` entries need, keeping
    /// room for the current entries. Does nothing if already that small.
    pub fn shrink(&mut self, max_capacity: usize) {
        let live = self.len();
        let hasher = &self.hasher;
        self.table.shrink(max_capacity, live, |k| hasher.hash_one(k));
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Clears, then reallocates at the size `max_capacity` entries need if
    /// the table is currently larger.
    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity);
    }

    /// Traversal that never expires, whatever the iteration policy.
    pub fn iter(&self) -> Entries<'_, Self> {
        Entries::new(self, ViewRegistry::fresh(ViewKind::Entries))
    }

    /// Entries view. Under the reuse policy, requesting another entries
    /// view retires this one.
    pub fn entries(&self) -> Entries<'_, Self> {
        Entries::new(self, self.views.issue(ViewKind::Entries))
    }

    pub fn keys(&self) -> Keys<'_, Self> {
        Keys::new(self, self.views.issue(ViewKind::Keys))
    }

    pub fn values(&self) -> Values<'_, Self> {
        Values::new(self, self.views.issue(ViewKind::Values))
    }

    /// Detached cursor, for removing entries mid-traversal.
    pub fn cursor(&self, kind: ViewKind) -> Cursor {
        Cursor::new(self.views.issue(kind))
    }
}

impl<K, V, S> ObjectMap<K, V, S> {
    /// Whether some entry holds a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.iter().any(|(_, v)| v == value)
    }

    /// Whether `value` refers to a value stored in this map.
    pub fn contains_value_identity(&self, value: &V) -> bool {
        self.table.iter().any(|(_, v)| core::ptr::eq(v, value))
    }

    /// A key mapped to a value equal to `value`. Linear in the table size.
    pub fn find_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.table.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }

    /// The key whose stored value is `value` itself.
    pub fn find_key_identity(&self, value: &V) -> Option<&K> {
        self.table
            .iter()
            .find(|(_, v)| core::ptr::eq(*v, value))
            .map(|(k, _)| k)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.table.iter_mut()
    }
}

impl<K, V, S> CursorTarget for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn views(&self) -> &ViewRegistry {
        &self.views
    }

    fn has_sentinel(&self) -> bool {
        false
    }

    fn slot_count(&self) -> usize {
        self.table.slot_count()
    }

    fn entry_at(&self, pos: Position) -> Option<(&K, &V)> {
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

impl<K, V, S> Table for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = V;

    fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }

    fn len(&self) -> usize {
        ObjectMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        ObjectMap::contains_key(self, key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        ObjectMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        ObjectMap::get_mut(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        ObjectMap::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ObjectMap::remove(self, key)
    }

    fn clear(&mut self) {
        ObjectMap::clear(self)
    }

    fn clear_to(&mut self, max_capacity: usize) {
        ObjectMap::clear_to(self, max_capacity)
    }

    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        ObjectMap::try_ensure_capacity(self, additional)
    }

    fn shrink(&mut self, max_capacity: usize) {
        ObjectMap::shrink(self, max_capacity)
    }

    fn views(&self) -> &ViewRegistry {
        &self.views
    }
}

impl<K, V, S> Default for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ObjectMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, (k, v)) in self.table.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}={v:?}")?;
        }
        f.write_str("}")
    }
}

impl<K, V, S> PartialEq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .table
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, ObjectMap<K, V, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
