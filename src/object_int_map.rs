//! ObjectIntMap: object keys to `i32` values, with by-value accessors and
//! counters.

use crate::config::{TableConfig, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::object_map::ObjectMap;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind, ViewRegistry};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// ```
/// use shiftmap::ObjectIntMap;
///
/// let mut counts = ObjectIntMap::new();
/// for w in "a b a c a".split(' ') {
///     counts.get_and_increment(w, 0, 1);
/// }
/// assert_eq!(counts.get("a"), Some(3));
/// assert_eq!(counts.get_or("z", 0), 0);
/// ```
#[derive(Clone)]
pub struct ObjectIntMap<K, S = RandomState> {
    inner: ObjectMap<K, i32, S>,
}

impl<K> ObjectIntMap<K, RandomState>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: ObjectMap::with_capacity(capacity),
        }
    }
}

impl<K, S> ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: ObjectMap::with_hasher(hasher),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        Ok(Self {
            inner: ObjectMap::with_config_and_hasher(config, hasher)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn table_size(&self) -> usize {
        self.inner.table_size()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<i32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key).copied()
    }

    pub fn get_or<Q>(&self, key: &Q, default: i32) -> i32
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut i32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get_mut(key)
    }

    pub fn put(&mut self, key: K, value: i32) -> Option<i32> {
        self.inner.put(key, value)
    }

    /// Returns the current value of `key` (or `default` when absent) and
    /// stores that value plus `increment`. Arithmetic wraps.
    pub fn get_and_increment(&mut self, key: K, default: i32, increment: i32) -> i32 {
        if let Some(v) = self.inner.get_mut(&key) {
            let old = *v;
            *v = old.wrapping_add(increment);
            return old;
        }
        self.inner.put(key, default.wrapping_add(increment));
        default
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<i32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K, i32) -> bool) {
        self.inner.retain(|k, v| keep(k, *v));
    }

    /// Panics on overflow; see [`try_ensure_capacity`](Self::try_ensure_capacity).
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.inner.ensure_capacity(additional);
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.inner.try_ensure_capacity(additional)
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        self.inner.shrink(max_capacity);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.inner.clear_to(max_capacity);
    }

    pub fn iter(&self) -> Entries<'_, Self> {
        Entries::new(self, ViewRegistry::fresh(ViewKind::Entries))
    }

    pub fn entries(&self) -> Entries<'_, Self> {
        Entries::new(self, CursorTarget::views(self).issue(ViewKind::Entries))
    }

    pub fn keys(&self) -> Keys<'_, Self> {
        Keys::new(self, CursorTarget::views(self).issue(ViewKind::Keys))
    }

    pub fn values(&self) -> Values<'_, Self> {
        Values::new(self, CursorTarget::views(self).issue(ViewKind::Values))
    }

    pub fn cursor(&self, kind: ViewKind) -> Cursor {
        Cursor::new(CursorTarget::views(self).issue(kind))
    }
}

impl<K, S> ObjectIntMap<K, S> {
    pub fn contains_value(&self, value: i32) -> bool {
        self.inner.contains_value(&value)
    }

    pub fn find_key(&self, value: i32) -> Option<&K> {
        self.inner.find_key(&value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut i32)> + '_ {
        self.inner.iter_mut()
    }
}

impl<K, S> CursorTarget for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Key = K;
    type Value = i32;

    fn views(&self) -> &ViewRegistry {
        CursorTarget::views(&self.inner)
    }

    fn has_sentinel(&self) -> bool {
        false
    }

    fn slot_count(&self) -> usize {
        self.inner.slot_count()
    }

    fn entry_at(&self, pos: Position) -> Option<(&K, &i32)> {
        self.inner.entry_at(pos)
    }

    fn remove_at(&mut self, pos: Position) -> Option<usize> {
        self.inner.remove_at(pos)
    }
}

impl<K, S> Table for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = i32;

    fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, S::default())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    fn get(&self, key: &K) -> Option<&i32> {
        self.inner.get(key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut i32> {
        self.inner.get_mut(key)
    }

    fn put(&mut self, key: K, value: i32) -> Option<i32> {
        self.inner.put(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<i32> {
        self.inner.remove(key)
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn clear_to(&mut self, max_capacity: usize) {
        self.inner.clear_to(max_capacity)
    }

    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.inner.try_ensure_capacity(additional)
    }

    fn shrink(&mut self, max_capacity: usize) {
        self.inner.shrink(max_capacity)
    }

    fn views(&self) -> &ViewRegistry {
        CursorTarget::views(&self.inner)
    }
}

impl<K, S> Default for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self {
            inner: ObjectMap::default(),
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for ObjectIntMap<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl<K, S> PartialEq for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, S> Eq for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
}

impl<K, S> Extend<(K, i32)> for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, i32)>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<K, S> FromIterator<(K, i32)> for ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, i32)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a, K, S> IntoIterator for &'a ObjectIntMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a i32);
    type IntoIter = Entries<'a, ObjectIntMap<K, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
