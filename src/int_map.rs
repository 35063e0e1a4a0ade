//! IntMap: map from primitive integer keys to values.
//!
//! Keys are stored bare in the slot array, where `0` means vacant. The entry
//! for a real key `0` lives in `zero`, outside the slots. It counts toward
//! `len()` and toward the growth check, and views visit it first.

use crate::config::{TableConfig, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::keys::IntKey;
use crate::raw_table::RawTable;
use crate::table::Table;
use crate::view::{Cursor, CursorTarget, Entries, Keys, Position, Values, ViewKind, ViewRegistry};
use core::fmt;

fn hash_of<K: IntKey>(k: &K) -> u64 {
    k.hash_bits()
}

/// Integer-keyed map. `K` is one of `i32` (default), `i64`, `u32`, `u64`.
///
/// ```
/// use shiftmap::IntMap;
///
/// let mut m = IntMap::new();
/// m.put(0, "zero");
/// m.put(-5, "minus five");
/// assert_eq!(m.get(0), Some(&"zero"));
/// assert_eq!(m.len(), 2);
/// ```
#[derive(Clone)]
pub struct IntMap<V, K: IntKey = i32> {
    table: RawTable<K, V>,
    zero: Option<V>,
    views: ViewRegistry,
}

/// [`IntMap`] keyed by `i64`.
pub type LongMap<V> = IntMap<V, i64>;

impl<V, K: IntKey> IntMap<V, K> {
    /// Empty map sized for 51 entries at load factor 0.8.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Panics if `capacity` needs more than 2^30 slots.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::with_config(TableConfig::with_capacity(capacity)) {
            Ok(map) => map,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: RawTable::from_config(&config)?,
            zero: None,
            views: ViewRegistry::new(config.iteration),
        })
    }

    /// Entries, the zero key included.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len() + usize::from(self.zero.is_some())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table_size(&self) -> usize {
        self.table.slot_count()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    fn locate(&self, key: K) -> core::result::Result<usize, usize> {
        self.table.locate(key.hash_bits(), |k| *k == key)
    }

    pub fn contains_key(&self, key: K) -> bool {
        if key == K::ZERO {
            return self.zero.is_some();
        }
        self.locate(key).is_ok()
    }

    pub fn get(&self, key: K) -> Option<&V> {
        if key == K::ZERO {
            return self.zero.as_ref();
        }
        let i = self.locate(key).ok()?;
        self.table.value_at(i)
    }

    pub fn get_or<'a>(&'a self, key: K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if key == K::ZERO {
            return self.zero.as_mut();
        }
        let i = self.locate(key).ok()?;
        self.table.value_at_mut(i)
    }

    /// Inserts or overwrites, returning the previous value.
    ///
    /// Panics if growing the table would need more than 2^30 slots.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if key == K::ZERO {
            return self.zero.replace(value);
        }
        match self.locate(key) {
            Ok(i) => self.table.replace_value(i, value),
            Err(i) => {
                let outside = usize::from(self.zero.is_some());
                self.table.insert_at(i, key, value, outside, hash_of::<K>);
                None
            }
        }
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        if key == K::ZERO {
            return self.zero.take();
        }
        let i = self.locate(key).ok()?;
        Some(self.table.remove_at(i, hash_of::<K>).value)
    }

    /// Keeps only the entries for which `keep` returns true; the zero key
    /// is offered first.
    pub fn retain(&mut self, mut keep: impl FnMut(K, &mut V) -> bool) {
        if let Some(v) = self.zero.as_mut() {
            if !keep(K::ZERO, v) {
                self.zero = None;
            }
        }
        self.table.retain(|k, v| keep(*k, v), hash_of::<K>);
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.find_key(value).is_some()
    }

    pub fn contains_value_identity(&self, value: &V) -> bool {
        self.find_key_identity(value).is_some()
    }

    pub fn find_key(&self, value: &V) -> Option<K>
    where
        V: PartialEq,
    {
        self.iter_all().find(|(_, v)| *v == value).map(|(k, _)| *k)
    }

    pub fn find_key_identity(&self, value: &V) -> Option<K> {
        self.iter_all()
            .find(|(_, v)| core::ptr::eq(*v, value))
            .map(|(k, _)| *k)
    }

    fn iter_all(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        let zero: &K = K::ZERO_KEY;
        self.zero
            .iter()
            .map(move |v| (zero, v))
            .chain(self.table.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut V)> + '_ {
        self.zero
            .iter_mut()
            .map(|v| (K::ZERO, v))
            .chain(self.table.iter_mut().map(|(k, v)| (*k, v)))
    }

    /// Panics on overflow; see [`try_ensure_capacity`](Self::try_ensure_capacity).
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(e) = self.try_ensure_capacity(additional) {
            panic!("{e}");
        }
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let total = self.len().saturating_add(additional);
        self.table.ensure_capacity(total, hash_of::<K>)
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        let live = self.len();
        self.table.shrink(max_capacity, live, hash_of::<K>);
    }

    pub fn clear(&mut self) {
        self.zero = None;
        self.table.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.zero = None;
        self.table.clear_to(max_capacity);
    }

    /// Traversal that never expires, whatever the iteration policy.
    pub fn iter(&self) -> Entries<'_, Self> {
        Entries::new(self, ViewRegistry::fresh(ViewKind::Entries))
    }

    pub fn entries(&self) -> Entries<'_, Self> {
        Entries::new(self, self.views.issue(ViewKind::Entries))
    }

    pub fn keys(&self) -> Keys<'_, Self> {
        Keys::new(self, self.views.issue(ViewKind::Keys))
    }

    pub fn values(&self) -> Values<'_, Self> {
        Values::new(self, self.views.issue(ViewKind::Values))
    }

    pub fn cursor(&self, kind: ViewKind) -> Cursor {
        Cursor::new(self.views.issue(kind))
    }
}

impl<V, K: IntKey> CursorTarget for IntMap<V, K> {
    type Key = K;
    type Value = V;

    fn views(&self) -> &ViewRegistry {
        &self.views
    }

    fn has_sentinel(&self) -> bool {
        self.zero.is_some()
    }

    fn slot_count(&self) -> usize {
        self.table.slot_count()
    }

    fn entry_at(&self, pos: Position) -> Option<(&K, &V)> {
        match pos {
            Position::Sentinel => self.zero.as_ref().map(|v| (K::ZERO_KEY, v)),
            Position::Slot(i) => self.table.slot(i),
        }
    }

    fn remove_at(&mut self, pos: Position) -> Option<usize> {
        match pos {
            Position::Sentinel => {
                self.zero = None;
                None
            }
            Position::Slot(i) if self.table.is_occupied(i) => {
                self.table.remove_at(i, hash_of::<K>).refilled_from
            }
            Position::Slot(_) => None,
        }
    }
}

impl<V, K: IntKey> Table for IntMap<V, K> {
    type Key = K;
    type Value = V;

    fn with_config(config: TableConfig) -> Result<Self> {
        IntMap::with_config(config)
    }

    fn len(&self) -> usize {
        IntMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        IntMap::contains_key(self, *key)
    }

    fn get(&self, key: &K) -> Option<&V> {
        IntMap::get(self, *key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        IntMap::get_mut(self, *key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        IntMap::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        IntMap::remove(self, *key)
    }

    fn clear(&mut self) {
        IntMap::clear(self)
    }

    fn clear_to(&mut self, max_capacity: usize) {
        IntMap::clear_to(self, max_capacity)
    }

    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        IntMap::try_ensure_capacity(self, additional)
    }

    fn shrink(&mut self, max_capacity: usize) {
        IntMap::shrink(self, max_capacity)
    }

    fn views(&self) -> &ViewRegistry {
        &self.views
    }
}

impl<V, K: IntKey> Default for IntMap<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, K: IntKey> fmt::Debug for IntMap<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, (k, v)) in self.iter_all().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}={v:?}")?;
        }
        f.write_str("}")
    }
}

impl<V: PartialEq, K: IntKey> PartialEq for IntMap<V, K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter_all()
                .all(|(k, v)| other.get(*k).map_or(false, |ov| v == ov))
    }
}

impl<V: Eq, K: IntKey> Eq for IntMap<V, K> {}

impl<V, K: IntKey> Extend<(K, V)> for IntMap<V, K> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<V, K: IntKey> FromIterator<(K, V)> for IntMap<V, K> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, V, K: IntKey> IntoIterator for &'a IntMap<V, K> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, IntMap<V, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Placement;

    #[test]
    fn zero_key_behaves_like_any_other() {
        let mut m: IntMap<&str> = IntMap::new();
        assert!(!m.contains_key(0));
        assert_eq!(m.put(0, "a"), None);
        assert_eq!(m.put(0, "b"), Some("a"));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0), Some(&"b"));
        assert!(m.contains_key(0));
        assert_eq!(m.table.len(), 0, "zero key must not occupy a slot");
        assert_eq!(m.remove(0), Some("b"));
        assert_eq!(m.remove(0), None);
        assert!(m.is_empty());
    }

    #[test]
    fn zero_key_counts_toward_growth() {
        // 8 slots, threshold 6: the sentinel plus five slot keys reach it.
        let mut m: IntMap<i32> = IntMap::with_capacity(6);
        m.put(0, 0);
        for k in 1..=4 {
            m.put(k, k);
        }
        assert_eq!(m.table_size(), 8);
        m.put(5, 5);
        assert_eq!(m.table_size(), 16);
        assert_eq!(m.len(), 6);
    }

    #[test]
    fn eight_slot_scenario() {
        let mut m: IntMap<i32> = IntMap::with_capacity(6);
        assert_eq!(m.table_size(), 8);
        for k in 1..=5 {
            m.put(k, k * 100);
        }
        assert_eq!(m.table_size(), 8);
        m.put(6, 600);
        assert_eq!(m.table_size(), 16);
        assert_eq!(m.get(3), Some(&300));

        let p = Placement::for_table_size(16);
        let a = 7;
        let b = (8..)
            .find(|k: &i32| p.place(k.hash_bits()) == p.place(a.hash_bits()))
            .unwrap();
        m.put(a, 1);
        m.put(b, 2);
        assert_eq!(m.remove(a), Some(1));
        assert_eq!(m.get(b), Some(&2));
    }

    #[test]
    fn negative_and_wide_keys() {
        let mut m: LongMap<u8> = LongMap::new();
        m.put(i64::MIN, 1);
        m.put(-1, 2);
        m.put(i64::MAX, 3);
        assert_eq!(m.get(i64::MIN), Some(&1));
        assert_eq!(m.get(-1), Some(&2));
        assert_eq!(m.get(i64::MAX), Some(&3));

        let mut u: IntMap<u8, u32> = IntMap::new();
        u.put(u32::MAX, 9);
        assert_eq!(u.get(u32::MAX), Some(&9));
    }

    #[test]
    fn multiples_of_table_size_do_not_degrade() {
        let mut m: IntMap<i32> = IntMap::with_capacity(0);
        for k in 1..=2_000 {
            m.put(k * 1024, k);
        }
        for k in 1..=2_000 {
            assert_eq!(m.get(k * 1024), Some(&k));
        }
    }

    #[test]
    fn views_visit_zero_first() {
        let mut m: IntMap<char> = IntMap::new();
        m.put(3, 'c');
        m.put(0, 'z');
        m.put(1, 'a');
        let keys: Vec<i32> = m.keys().copied().collect();
        assert_eq!(keys[0], 0);
        assert_eq!(keys.len(), 3);
        assert_eq!(format!("{:?}", IntMap::<char>::from_iter([(0, 'z')])), "{0='z'}");
    }

    #[test]
    fn cursor_can_remove_zero_key() {
        let mut m: IntMap<i32> = (0..10).map(|k| (k, k)).collect();
        let mut c = m.cursor(ViewKind::Entries);
        while let Some((k, _)) = c.advance(&m).unwrap() {
            if *k < 5 {
                c.remove(&mut m).unwrap();
            }
        }
        assert_eq!(m.len(), 5);
        assert!(!m.contains_key(0));
        assert!((5..10).all(|k| m.contains_key(k)));
    }

    #[test]
    fn retain_and_value_searches_include_zero() {
        let mut m: IntMap<String> = IntMap::new();
        m.put(0, "zero".into());
        m.put(4, "four".into());
        assert_eq!(m.find_key(&"zero".to_string()), Some(0));
        assert!(m.contains_value(&"four".to_string()));
        let stored = m.get(4).unwrap();
        assert_eq!(m.find_key_identity(stored), Some(4));
        m.retain(|k, _| k != 0);
        assert!(!m.contains_key(0));
        for (_, v) in m.iter_mut() {
            v.push('!');
        }
        assert_eq!(m.get(4).map(String::as_str), Some("four!"));
    }

    #[test]
    fn clear_drops_zero_key() {
        let mut m: IntMap<i32> = (0..100).map(|k| (k, k)).collect();
        m.clear_to(4);
        assert!(m.is_empty());
        assert_eq!(m.get(0), None);
        assert_eq!(m.table_size(), 8);
        m.put(0, 1);
        m.clear();
        assert!(m.is_empty());
    }
}
