//! Ordered: insertion-order overlay over any [`Table`].
//!
//! The base table owns the entries; `order` holds a clone of every key in
//! insertion order and is kept equal to the base's key set after each
//! mutation. Lookups cost what the base costs. Removing by key and `alter`
//! search `order` linearly; positional operations do not.

use crate::config::TableConfig;
use crate::error::Result;
use crate::int_map::IntMap;
use crate::object_map::ObjectMap;
use crate::object_set::ObjectSet;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind, ViewRegistry};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Map with object keys that iterates in insertion order.
pub type OrderedMap<K, V, S = RandomState> = Ordered<ObjectMap<K, V, S>>;

/// Set that iterates in insertion order.
pub type OrderedSet<K, S = RandomState> = Ordered<ObjectSet<K, S>>;

/// Integer-keyed map that iterates in insertion order.
pub type OrderedIntMap<V, K = i32> = Ordered<IntMap<V, K>>;

/// ```
/// use shiftmap::OrderedMap;
///
/// let mut m: OrderedMap<&str, i32> = OrderedMap::new();
/// m.put("b", 2);
/// m.put("a", 1);
/// m.put("c", 3);
/// m.put("a", 10);
/// assert_eq!(m.order(), &["b", "a", "c"]);
/// assert!(m.alter(&"c", "z"));
/// let keys: Vec<_> = m.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, ["b", "a", "z"]);
/// ```
pub struct Ordered<B: Table> {
    base: B,
    order: Vec<B::Key>,
}

impl<B> Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    /// Empty overlay over a base sized for 51 entries at load factor 0.8.
    pub fn new() -> Self {
        Self::with_capacity(TableConfig::default().initial_capacity)
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::with_config(TableConfig::with_capacity(capacity)) {
            Ok(ordered) => ordered,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Ok(Self {
            base: B::with_config(config)?,
            order: Vec::new(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn contains_key(&self, key: &B::Key) -> bool {
        self.base.contains_key(key)
    }

    pub fn get(&self, key: &B::Key) -> Option<&B::Value> {
        self.base.get(key)
    }

    pub fn get_mut(&mut self, key: &B::Key) -> Option<&mut B::Value> {
        self.base.get_mut(key)
    }

    /// The entry at position `index` in insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&B::Key, &B::Value)> {
        let key = self.order.get(index)?;
        Some((key, self.base.get(key)?))
    }

    /// Inserts at the end, or overwrites in place when the key exists.
    pub fn put(&mut self, key: B::Key, value: B::Value) -> Option<B::Value> {
        let old = self.base.put(key.clone(), value);
        if old.is_none() {
            self.order.push(key);
        }
        old
    }

    /// Inserts at `index`. An existing key gets the new value and moves to
    /// `index` (clamped to the end).
    ///
    /// Panics if `index > len()` and the key is new.
    pub fn insert_at(&mut self, key: B::Key, value: B::Value, index: usize) -> Option<B::Value> {
        if let Some(from) = self.index_of(&key) {
            let old = self.base.put(key, value);
            let moved = self.order.remove(from);
            let to = index.min(self.order.len());
            self.order.insert(to, moved);
            return old;
        }
        assert!(
            index <= self.order.len(),
            "insertion index {index} out of bounds for length {}",
            self.order.len()
        );
        self.base.put(key.clone(), value);
        self.order.insert(index, key);
        None
    }

    pub fn remove(&mut self, key: &B::Key) -> Option<B::Value> {
        let value = self.base.remove(key)?;
        if let Some(pos) = self.index_of(key) {
            self.order.remove(pos);
        }
        Some(value)
    }

    /// Removes the entry at position `index` in insertion order.
    pub fn remove_index(&mut self, index: usize) -> Option<(B::Key, B::Value)> {
        if index >= self.order.len() {
            return None;
        }
        let key = self.order.remove(index);
        let value = self.base.remove(&key)?;
        Some((key, value))
    }

    /// The oldest key still present.
    pub fn first(&self) -> Option<&B::Key> {
        self.order.first()
    }

    /// Keys in iteration order.
    pub fn order(&self) -> &[B::Key] {
        &self.order
    }

    pub fn index_of(&self, key: &B::Key) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    pub fn sort(&mut self)
    where
        B::Key: Ord,
    {
        self.order.sort();
    }

    pub fn sort_by(&mut self, compare: impl FnMut(&B::Key, &B::Key) -> Ordering) {
        self.order.sort_by(compare);
    }

    /// Renames `before` to `after`, keeping its value and position.
    ///
    /// Returns false and changes nothing if `after` is already present or
    /// `before` is not.
    pub fn alter(&mut self, before: &B::Key, after: B::Key) -> bool {
        if self.base.contains_key(&after) {
            return false;
        }
        match self.index_of(before) {
            Some(index) => self.rekey(index, after),
            None => false,
        }
    }

    /// Renames the key at position `index` to `after`, keeping its value.
    ///
    /// Returns false and changes nothing if `index` is out of range or
    /// `after` is already present.
    pub fn alter_index(&mut self, index: usize, after: B::Key) -> bool {
        if index >= self.order.len() || self.base.contains_key(&after) {
            return false;
        }
        self.rekey(index, after)
    }

    fn rekey(&mut self, index: usize, after: B::Key) -> bool {
        let Some(value) = self.base.remove(&self.order[index]) else {
            return false;
        };
        self.base.put(after.clone(), value);
        self.order[index] = after;
        true
    }

    /// Keeps only the entries for which `keep` returns true, preserving the
    /// order of the survivors.
    pub fn retain(&mut self, mut keep: impl FnMut(&B::Key, &mut B::Value) -> bool) {
        let base = &mut self.base;
        self.order.retain(|k| {
            let kept = base.get_mut(k).map_or(false, |v| keep(k, v));
            if !kept {
                base.remove(k);
            }
            kept
        });
    }

    /// Panics on overflow; see [`try_ensure_capacity`](Self::try_ensure_capacity).
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(e) = self.try_ensure_capacity(additional) {
            panic!("{e}");
        }
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.base.try_ensure_capacity(additional)?;
        self.order.reserve(additional);
        Ok(())
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        self.base.shrink(max_capacity);
        self.order.shrink_to(max_capacity);
    }

    pub fn clear(&mut self) {
        self.base.clear();
        self.order.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.base.clear_to(max_capacity);
        self.order.clear();
        self.order.shrink_to(max_capacity);
    }

    /// Traversal in insertion order that never expires.
    pub fn iter(&self) -> Entries<'_, Self> {
        Entries::new(self, ViewRegistry::fresh(ViewKind::Entries))
    }

    pub fn entries(&self) -> Entries<'_, Self> {
        Entries::new(self, self.base.views().issue(ViewKind::Entries))
    }

    pub fn keys(&self) -> Keys<'_, Self> {
        Keys::new(self, self.base.views().issue(ViewKind::Keys))
    }

    pub fn values(&self) -> Values<'_, Self> {
        Values::new(self, self.base.views().issue(ViewKind::Values))
    }

    pub fn cursor(&self, kind: ViewKind) -> Cursor {
        Cursor::new(self.base.views().issue(kind))
    }
}

impl<K, S> Ordered<ObjectSet<K, S>>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    pub fn contains(&self, key: &K) -> bool {
        self.base.contains(key)
    }

    /// Appends `key`. Returns false, leaving the order alone, if present.
    pub fn add(&mut self, key: K) -> bool {
        self.put(key, ()).is_none()
    }

    /// Inserts `key` at `index`, or moves it there if already present (in
    /// which case this returns false).
    ///
    /// Panics if `index > len()` and the key is new.
    pub fn add_at(&mut self, key: K, index: usize) -> bool {
        self.insert_at(key, (), index).is_none()
    }
}

impl<B> CursorTarget for Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    type Key = B::Key;
    type Value = B::Value;

    fn views(&self) -> &ViewRegistry {
        self.base.views()
    }

    fn has_sentinel(&self) -> bool {
        false
    }

    fn slot_count(&self) -> usize {
        self.order.len()
    }

    fn entry_at(&self, pos: Position) -> Option<(&B::Key, &B::Value)> {
        match pos {
            Position::Sentinel => None,
            Position::Slot(i) => self.get_index(i),
        }
    }

    fn remove_at(&mut self, pos: Position) -> Option<usize> {
        let Position::Slot(i) = pos else { return None };
        self.remove_index(i)?;
        (i < self.order.len()).then_some(i + 1)
    }
}

impl<B> Table for Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    type Key = B::Key;
    type Value = B::Value;

    const KEYS_ONLY: bool = B::KEYS_ONLY;

    fn with_config(config: TableConfig) -> Result<Self> {
        Ordered::with_config(config)
    }

    fn len(&self) -> usize {
        self.base.len()
    }

    fn contains_key(&self, key: &B::Key) -> bool {
        self.base.contains_key(key)
    }

    fn get(&self, key: &B::Key) -> Option<&B::Value> {
        self.base.get(key)
    }

    fn get_mut(&mut self, key: &B::Key) -> Option<&mut B::Value> {
        self.base.get_mut(key)
    }

    fn put(&mut self, key: B::Key, value: B::Value) -> Option<B::Value> {
        Ordered::put(self, key, value)
    }

    fn remove(&mut self, key: &B::Key) -> Option<B::Value> {
        Ordered::remove(self, key)
    }

    fn clear(&mut self) {
        Ordered::clear(self)
    }

    fn clear_to(&mut self, max_capacity: usize) {
        Ordered::clear_to(self, max_capacity)
    }

    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        Ordered::try_ensure_capacity(self, additional)
    }

    fn shrink(&mut self, max_capacity: usize) {
        Ordered::shrink(self, max_capacity)
    }

    fn views(&self) -> &ViewRegistry {
        self.base.views()
    }
}

impl<B> Clone for Ordered<B>
where
    B: Table + Clone,
    B::Key: Clone,
{
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            order: self.order.clone(),
        }
    }
}

impl<B> Default for Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Ordered<B>
where
    B: Table,
    B::Key: fmt::Debug,
    B::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, k) in self.order.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            match self.base.get(k) {
                Some(v) if !B::KEYS_ONLY => write!(f, "{k:?}={v:?}")?,
                _ => write!(f, "{k:?}")?,
            }
        }
        f.write_str("}")
    }
}

/// Content equality; insertion order is not compared.
impl<B> PartialEq for Ordered<B>
where
    B: Table + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<B> Eq for Ordered<B> where B: Table + Eq {}

impl<B> Extend<(B::Key, B::Value)> for Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    fn extend<I: IntoIterator<Item = (B::Key, B::Value)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<B> FromIterator<(B::Key, B::Value)> for Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    fn from_iter<I: IntoIterator<Item = (B::Key, B::Value)>>(iter: I) -> Self {
        let mut ordered = Self::new();
        ordered.extend(iter);
        ordered
    }
}

impl<'a, B> IntoIterator for &'a Ordered<B>
where
    B: Table,
    B::Key: Clone + Eq,
{
    type Item = (&'a B::Key, &'a B::Value);
    type IntoIter = Entries<'a, Ordered<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IterationPolicy;

    fn keys<B>(o: &Ordered<B>) -> Vec<B::Key>
    where
        B: Table,
        B::Key: Clone + Eq,
    {
        o.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut m: OrderedMap<&str, i32> = OrderedMap::new();
        for (i, k) in ["d", "a", "c", "b"].into_iter().enumerate() {
            m.put(k, i as i32);
        }
        assert_eq!(keys(&m), ["d", "a", "c", "b"]);
        assert_eq!(m.first(), Some(&"d"));
        assert_eq!(m.get_index(2), Some((&"c", &2)));
    }

    #[test]
    fn overwrite_keeps_position_and_reinsert_moves_to_end() {
        let mut m: OrderedMap<&str, i32> = OrderedMap::new();
        m.put("a", 1);
        m.put("b", 2);
        m.put("c", 3);
        assert_eq!(m.put("a", 10), Some(1));
        assert_eq!(keys(&m), ["a", "b", "c"]);
        assert_eq!(m.remove(&"a"), Some(10));
        m.put("a", 11);
        assert_eq!(keys(&m), ["b", "c", "a"]);
    }

    #[test]
    fn remove_index_and_bounds() {
        let mut m: OrderedIntMap<char> = [(5, 'e'), (0, 'z'), (7, 'g')].into_iter().collect();
        assert_eq!(m.remove_index(1), Some((0, 'z')));
        assert_eq!(m.remove_index(5), None);
        assert_eq!(m.order(), &[5, 7]);
        assert!(!m.contains_key(&0));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn alter_renames_in_place() {
        let mut m: OrderedMap<String, u8> = OrderedMap::new();
        m.put("a".into(), 1);
        m.put("b".into(), 2);
        m.put("c".into(), 3);
        assert!(m.alter(&"b".into(), "x".into()));
        assert_eq!(m.order(), &["a", "x", "c"]);
        assert_eq!(m.get(&"x".into()), Some(&2));
        assert!(!m.contains_key(&"b".into()));

        // Target exists, or source missing: nothing changes.
        assert!(!m.alter(&"a".into(), "c".into()));
        assert!(!m.alter(&"missing".into(), "y".into()));
        assert_eq!(m.order(), &["a", "x", "c"]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn alter_index_checks_bounds_and_target() {
        let mut m: OrderedIntMap<&str> = OrderedIntMap::new();
        m.put(1, "one");
        m.put(2, "two");
        assert!(m.alter_index(1, 20));
        assert_eq!(m.order(), &[1, 20]);
        assert_eq!(m.get(&20), Some(&"two"));
        assert!(!m.alter_index(2, 30));
        assert!(!m.alter_index(0, 20));
        // Renaming to the zero key goes through the sentinel.
        assert!(m.alter_index(0, 0));
        assert_eq!(m.get(&0), Some(&"one"));
        assert_eq!(m.order(), &[0, 20]);
    }

    #[test]
    fn insert_at_places_or_moves() {
        let mut m: OrderedMap<&str, i32> = OrderedMap::new();
        m.put("a", 1);
        m.put("b", 2);
        assert_eq!(m.insert_at("c", 3, 0), None);
        assert_eq!(keys(&m), ["c", "a", "b"]);
        assert_eq!(m.insert_at("b", 20, 1), Some(2));
        assert_eq!(keys(&m), ["c", "b", "a"]);
        assert_eq!(m.insert_at("c", 30, 99), Some(3));
        assert_eq!(keys(&m), ["b", "a", "c"]);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            m.insert_at("d", 4, 10);
        }));
        assert!(res.is_err());
        assert!(!m.contains_key(&"d"), "failed insert must not touch the base");
    }

    #[test]
    fn ordered_set_add_at() {
        let mut s: OrderedSet<&str> = OrderedSet::new();
        assert!(s.add("x"));
        assert!(s.add("y"));
        assert!(!s.add("x"));
        assert!(s.add_at("w", 0));
        assert!(!s.add_at("y", 0));
        assert_eq!(s.order(), &["y", "w", "x"]);
        assert!(s.contains(&"w"));
        assert_eq!(format!("{s:?}"), "{\"y\", \"w\", \"x\"}");
    }

    #[test]
    fn sort_and_sort_by() {
        let mut m: OrderedIntMap<()> = [3, 1, 2].into_iter().map(|k| (k, ())).collect();
        m.sort();
        assert_eq!(m.order(), &[1, 2, 3]);
        m.sort_by(|a, b| b.cmp(a));
        assert_eq!(m.order(), &[3, 2, 1]);
    }

    #[test]
    fn retain_preserves_survivor_order() {
        let mut m: OrderedIntMap<i32> = (1..=10).rev().map(|k| (k, k)).collect();
        m.retain(|_, v| *v % 3 != 0);
        assert_eq!(m.order(), &[10, 8, 7, 5, 4, 2, 1]);
        assert_eq!(m.len(), 7);
    }

    #[test]
    fn cursor_removal_visits_each_entry_once() {
        let mut m: OrderedIntMap<i32> = (0..10).map(|k| (k, k)).collect();
        let mut c = m.cursor(ViewKind::Entries);
        let mut seen = Vec::new();
        while let Some((k, _)) = c.advance(&m).unwrap() {
            let k = *k;
            seen.push(k);
            if k % 3 == 0 {
                c.remove(&mut m).unwrap();
            }
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(m.order(), &[1, 2, 4, 5, 7, 8]);
    }

    #[test]
    fn views_share_the_base_registry() {
        let m: OrderedMap<u8, u8> = (1..=3).map(|k| (k, k)).collect();
        let stale = m.cursor(ViewKind::Values);
        let _fresh = m.values();
        assert!(stale.has_next(&m).is_err());

        let cfg = TableConfig::default().with_iteration(IterationPolicy::Allocate);
        let n: OrderedMap<u8, u8> = {
            let mut n = OrderedMap::with_config(cfg).unwrap();
            n.extend((1..=3).map(|k| (k, k)));
            n
        };
        let outer: Vec<u8> = n.values().copied().collect();
        let nested: usize = n.values().map(|_| n.values().count()).sum();
        assert_eq!(outer, [1, 2, 3]);
        assert_eq!(nested, 9);
    }

    #[test]
    fn clear_and_equality() {
        let a: OrderedMap<u8, u8> = [(1, 1), (2, 2)].into_iter().collect();
        let b: OrderedMap<u8, u8> = [(2, 2), (1, 1)].into_iter().collect();
        assert_eq!(a, b);
        let mut c = a.clone();
        assert_eq!(format!("{c:?}"), "{1=1, 2=2}");
        c.clear_to(4);
        assert!(c.is_empty());
        assert!(c.order().is_empty());
        c.put(9, 9);
        assert_eq!(c.first(), Some(&9));
    }
}
