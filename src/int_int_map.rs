//! IntIntMap: `i32 -> i32` map with by-value accessors and counters.

use crate::config::TableConfig;
use crate::error::Result;
use crate::int_map::IntMap;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind, ViewRegistry};
use core::fmt;

/// ```
/// use shiftmap::IntIntMap;
///
/// let mut hits = IntIntMap::new();
/// for word_len in [3, 5, 3, 0, 3] {
///     hits.get_and_increment(word_len, 0, 1);
/// }
/// assert_eq!(hits.get_or(3, 0), 3);
/// assert_eq!(hits.get_or(0, 0), 1);
/// assert_eq!(hits.get_or(9, -1), -1);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IntIntMap {
    inner: IntMap<i32, i32>,
}

impl IntIntMap {
    pub fn new() -> Self {
        Self {
            inner: IntMap::new(),
        }
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: IntMap::with_capacity(capacity),
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Ok(Self {
            inner: IntMap::with_config(config)?,
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

    pub fn contains_key(&self, key: i32) -> bool {
        self.inner.contains_key(key)
    }

    pub fn get(&self, key: i32) -> Option<i32> {
        self.inner.get(key).copied()
    }

    pub fn get_or(&self, key: i32, default: i32) -> i32 {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: i32) -> Option<&mut i32> {
        self.inner.get_mut(key)
    }

    pub fn put(&mut self, key: i32, value: i32) -> Option<i32> {
        self.inner.put(key, value)
    }

    /// Returns the current value of `key` (or `default` when absent) and
    /// stores that value plus `increment`. Arithmetic wraps.
    pub fn get_and_increment(&mut self, key: i32, default: i32, increment: i32) -> i32 {
        if let Some(v) = self.inner.get_mut(key) {
            let old = *v;
            *v = old.wrapping_add(increment);
            return old;
        }
        self.inner.put(key, default.wrapping_add(increment));
        default
    }

    pub fn remove(&mut self, key: i32) -> Option<i32> {
        self.inner.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(i32, i32) -> bool) {
        self.inner.retain(|k, v| keep(k, *v));
    }

    pub fn contains_value(&self, value: i32) -> bool {
        self.inner.contains_value(&value)
    }

    pub fn find_key(&self, value: i32) -> Option<i32> {
        self.inner.find_key(&value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i32, &mut i32)> + '_ {
        self.inner.iter_mut()
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

impl CursorTarget for IntIntMap {
    type Key = i32;
    type Value = i32;

    fn views(&self) -> &ViewRegistry {
        CursorTarget::views(&self.inner)
    }

    fn has_sentinel(&self) -> bool {
        self.inner.has_sentinel()
    }

    fn slot_count(&self) -> usize {
        self.inner.slot_count()
    }

    fn entry_at(&self, pos: Position) -> Option<(&i32, &i32)> {
        self.inner.entry_at(pos)
    }

    fn remove_at(&mut self, pos: Position) -> Option<usize> {
        self.inner.remove_at(pos)
    }
}

impl Table for IntIntMap {
    type Key = i32;
    type Value = i32;

    fn with_config(config: TableConfig) -> Result<Self> {
        IntIntMap::with_config(config)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains_key(&self, key: &i32) -> bool {
        self.inner.contains_key(*key)
    }

    fn get(&self, key: &i32) -> Option<&i32> {
        self.inner.get(*key)
    }

    fn get_mut(&mut self, key: &i32) -> Option<&mut i32> {
        self.inner.get_mut(*key)
    }

    fn put(&mut self, key: i32, value: i32) -> Option<i32> {
        self.inner.put(key, value)
    }

    fn remove(&mut self, key: &i32) -> Option<i32> {
        self.inner.remove(*key)
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

impl fmt::Debug for IntIntMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl Extend<(i32, i32)> for IntIntMap {
    fn extend<I: IntoIterator<Item = (i32, i32)>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl FromIterator<(i32, i32)> for IntIntMap {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IntIntMap {
    type Item = (&'a i32, &'a i32);
    type IntoIter = Entries<'a, IntIntMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
