//! RawTable: the open-addressing engine under every container.
//!
//! Parallel key and value arrays sized to a power of two, linear probing
//! from the Fibonacci placement, and backward-shift deletion so probe
//! chains never contain holes. The table knows nothing about how keys are
//! hashed or compared. Callers pass the hash and an equality closure to
//! `locate`, and a `hash_of` closure to anything that re-places keys, the
//! same convention as `hashbrown::HashTable`.
//!
//! Invariants
//! - `len < slot_count()`: the table grows before it can fill, so every
//!   probe loop finds a vacant slot.
//! - For each occupied slot `i`, probing from `place(hash(key))` reaches
//!   `i` without crossing a vacant slot.
//! - `values[i].is_some()` iff `keys[i]` is occupied.

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::keys::KeySlot;
use crate::placement::{self, Placement, MAX_TABLE_SIZE};
use crate::reentrancy::DebugReentrancy;
use core::mem;

/// An entry taken out of the table by [`RawTable::remove_at`].
#[derive(Debug)]
pub(crate) struct Removed<K, V> {
    pub key: K,
    pub value: V,
    /// Slot whose entry was shifted back into the removed slot, if any.
    pub refilled_from: Option<usize>,
}

#[derive(Clone, Debug)]
pub(crate) struct RawTable<S, V> {
    keys: Box<[S]>,
    values: Box<[Option<V>]>,
    len: usize,
    load_factor: f32,
    threshold: usize,
    placement: Placement,
    guard: DebugReentrancy,
}

fn alloc_slots<S: KeySlot, V>(size: usize) -> (Box<[S]>, Box<[Option<V>]>) {
    let keys = (0..size).map(|_| S::vacant()).collect();
    let values = (0..size).map(|_| None).collect();
    (keys, values)
}

impl<S: KeySlot, V> RawTable<S, V> {
    /// `table_size` must come from [`placement::table_size`] and the load
    /// factor must already be validated.
    pub(crate) fn with_table_size(table_size: usize, load_factor: f32) -> Self {
        let (keys, values) = alloc_slots(table_size);
        Self {
            keys,
            values,
            len: 0,
            load_factor,
            threshold: placement::threshold(table_size, load_factor),
            placement: Placement::for_table_size(table_size),
            guard: DebugReentrancy::new(),
        }
    }

    pub(crate) fn from_config(config: &TableConfig) -> Result<Self> {
        let size = config.table_size()?;
        Ok(Self::with_table_size(size, config.load_factor))
    }

    /// Entries stored in the slot arrays.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    #[cfg(test)]
    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    #[cfg(test)]
    pub(crate) fn placement(&self) -> Placement {
        self.placement
    }

    #[inline]
    pub(crate) fn is_occupied(&self, index: usize) -> bool {
        self.keys.get(index).map_or(false, |s| !s.is_vacant())
    }

    #[inline]
    pub(crate) fn key_at(&self, index: usize) -> Option<&S::Key> {
        self.keys.get(index)?.key()
    }

    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)?.as_ref()
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.values.get_mut(index)?.as_mut()
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Option<(&S::Key, &V)> {
        let key = self.keys.get(index)?.key()?;
        let value = self.values[index].as_ref()?;
        Some((key, value))
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<(&S::Key, &mut V)> {
        let key = self.keys.get(index)?.key()?;
        let value = self.values[index].as_mut()?;
        Some((key, value))
    }

    /// `Ok(slot)` of the key matching `eq`, or `Err(insertion_point)`: the
    /// first vacant slot on the probe path from `place(hash)`.
    pub(crate) fn locate(
        &self,
        hash: u64,
        mut eq: impl FnMut(&S::Key) -> bool,
    ) -> Result<usize, usize> {
        let _g = self.guard.enter();
        let mut i = self.placement.place(hash);
        loop {
            match self.keys[i].key() {
                None => return Err(i),
                Some(k) if eq(k) => return Ok(i),
                Some(_) => i = self.placement.next(i),
            }
        }
    }

    pub(crate) fn replace_value(&mut self, index: usize, value: V) -> Option<V> {
        self.values[index].replace(value)
    }

    /// Writes an absent key at an insertion point returned by `locate`,
    /// then doubles the table once the live count reaches the threshold.
    /// `outside` counts entries the owner keeps out of the slots (the
    /// integer zero key); they count toward the load.
    ///
    /// Panics if doubling would exceed 2^30 slots.
    pub(crate) fn insert_at(
        &mut self,
        index: usize,
        key: S::Key,
        value: V,
        outside: usize,
        hash_of: impl Fn(&S::Key) -> u64,
    ) {
        debug_assert!(self.keys[index].is_vacant(), "insertion point {index} is occupied");
        self.keys[index] = S::fill(key);
        self.values[index] = Some(value);
        self.len += 1;
        let live = self.len + outside;
        if live >= self.threshold {
            let grown = self.keys.len() << 1;
            if grown > MAX_TABLE_SIZE {
                panic!("{}", TableError::CapacityOverflow { requested: live });
            }
            self.resize(grown, hash_of);
        }
    }

    /// Backward-shift deletion of the entry at `index`.
    ///
    /// Walks the chain after the hole. Each entry that sits further from its
    /// ideal slot than the hole does moves back into the hole, and the hole
    /// moves to where that entry was. Stops at the first vacant slot.
    pub(crate) fn remove_at(
        &mut self,
        index: usize,
        hash_of: impl Fn(&S::Key) -> u64,
    ) -> Removed<S::Key, V> {
        let _g = self.guard.enter();
        let (Some(key), Some(value)) = (self.keys[index].take(), self.values[index].take()) else {
            unreachable!("remove_at called on vacant slot {index}");
        };
        // Counted out before any user `Hash` runs.
        self.len -= 1;

        let placement = self.placement;
        let mut hole = index;
        let mut refilled_from = None;
        let mut next = placement.next(index);
        loop {
            let ideal = match self.keys[next].key() {
                Some(k) => placement.place(hash_of(k)),
                None => break,
            };
            if placement.displacement(ideal, next) > placement.displacement(ideal, hole) {
                self.keys.swap(hole, next);
                self.values.swap(hole, next);
                if refilled_from.is_none() {
                    refilled_from = Some(next);
                }
                hole = next;
            }
            next = placement.next(next);
        }

        Removed {
            key,
            value,
            refilled_from,
        }
    }

    /// Reallocates at `new_size` slots and re-places every live key. Values
    /// travel with their keys; nothing is compared since keys are unique.
    ///
    /// `len` counts only entries already re-placed. If `hash_of` panics, the
    /// entries not yet moved are dropped and the table stays consistent
    /// with what it still holds.
    pub(crate) fn resize(&mut self, new_size: usize, hash_of: impl Fn(&S::Key) -> u64) {
        debug_assert!(new_size > self.len, "resize to {new_size} cannot hold {}", self.len);
        let old_size = self.keys.len();
        let (keys, values) = alloc_slots::<S, V>(new_size);
        let old_keys = mem::replace(&mut self.keys, keys);
        let old_values = mem::replace(&mut self.values, values);
        self.placement = Placement::for_table_size(new_size);
        self.threshold = placement::threshold(new_size, self.load_factor);
        log::debug!(
            "resizing table from {} to {} slots ({} live)",
            old_size,
            new_size,
            self.len
        );
        if self.len == 0 {
            return;
        }

        let _g = self.guard.enter();
        self.len = 0;
        let placement = self.placement;
        let old = old_keys.into_vec().into_iter().zip(old_values.into_vec());
        for (slot, value) in old {
            if let (Some(key), Some(value)) = (slot.into_key(), value) {
                let mut i = placement.place(hash_of(&key));
                while !self.keys[i].is_vacant() {
                    i = placement.next(i);
                }
                self.keys[i] = S::fill(key);
                self.values[i] = Some(value);
                self.len += 1;
            }
        }
    }

    /// Grows so that `total` entries fit without a mid-sequence resize: the
    /// resulting threshold is strictly above `total`.
    pub(crate) fn ensure_capacity(
        &mut self,
        total: usize,
        hash_of: impl Fn(&S::Key) -> u64,
    ) -> Result<()> {
        let mut size = placement::table_size(total, self.load_factor)?;
        while placement::threshold(size, self.load_factor) <= total {
            size <<= 1;
            if size > MAX_TABLE_SIZE {
                return Err(TableError::CapacityOverflow { requested: total });
            }
        }
        log::trace!(
            "reserving room for {} entries: {} slots wanted, {} present",
            total,
            size,
            self.keys.len()
        );
        if self.keys.len() < size {
            self.resize(size, hash_of);
        }
        Ok(())
    }

    /// Shrinks to the table size `max_capacity` needs, never below what the
    /// `live` entries need, and only if the table is currently larger.
    pub(crate) fn shrink(
        &mut self,
        max_capacity: usize,
        live: usize,
        hash_of: impl Fn(&S::Key) -> u64,
    ) {
        // A size that overflows is larger than the current table anyway.
        if let Ok(size) = placement::table_size(max_capacity.max(live), self.load_factor) {
            if self.keys.len() > size {
                self.resize(size, hash_of);
            }
        }
    }

    /// Removes every entry for which `keep` returns false and returns how
    /// many were removed.
    ///
    /// The pass starts just after a vacant slot and wraps once around the
    /// table. A backward shift never moves an entry across a vacant slot,
    /// so whatever refills a vacated slot comes from later in the pass and
    /// `keep` sees each entry exactly once.
    pub(crate) fn retain(
        &mut self,
        mut keep: impl FnMut(&S::Key, &mut V) -> bool,
        hash_of: impl Fn(&S::Key) -> u64,
    ) -> usize {
        let size = self.keys.len();
        let Some(start) = self.keys.iter().position(|s| s.is_vacant()) else {
            return 0;
        };
        let mask = self.placement.mask();
        let mut removed = 0;
        let mut step = 1;
        while step < size {
            let i = (start + step) & mask;
            let evict = match self.slot_mut(i) {
                Some((k, v)) => !keep(k, v),
                None => false,
            };
            if evict {
                removed += 1;
                if self.remove_at(i, &hash_of).refilled_from.is_some() {
                    continue;
                }
            }
            step += 1;
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        self.keys.iter_mut().for_each(|s| *s = S::vacant());
        self.values.iter_mut().for_each(|v| *v = None);
        self.len = 0;
    }

    /// Empties the table, reallocating it at the size `max_capacity` needs
    /// when it is currently larger than that.
    pub(crate) fn clear_to(&mut self, max_capacity: usize) {
        match placement::table_size(max_capacity, self.load_factor) {
            Ok(size) if self.keys.len() > size => {
                log::debug!(
                    "clearing table and reallocating from {} to {} slots",
                    self.keys.len(),
                    size
                );
                let (keys, values) = alloc_slots(size);
                self.keys = keys;
                self.values = values;
                self.len = 0;
                self.placement = Placement::for_table_size(size);
                self.threshold = placement::threshold(size, self.load_factor);
            }
            _ => self.clear(),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&S::Key, &V)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(s, v)| Some((s.key()?, v.as_ref()?)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&S::Key, &mut V)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter_mut())
            .filter_map(|(s, v)| Some((s.key()?, v.as_mut()?)))
    }

    /// Panics unless every occupied slot is reachable from its ideal slot
    /// without crossing a vacant one, and `len` matches the occupied count.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, hash_of: impl Fn(&S::Key) -> u64) {
        let mut occupied = 0;
        for i in 0..self.keys.len() {
            let Some(k) = self.keys[i].key() else {
                assert!(self.values[i].is_none(), "value left behind in vacant slot {i}");
                continue;
            };
            occupied += 1;
            assert!(self.values[i].is_some(), "occupied slot {i} has no value");
            let mut j = self.placement.place(hash_of(k));
            while j != i {
                assert!(
                    !self.keys[j].is_vacant(),
                    "probe chain to slot {i} broken at slot {j}"
                );
                j = self.placement.next(j);
            }
        }
        assert_eq!(occupied, self.len, "len out of sync with occupied slots");
        assert!(self.len < self.keys.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::IntKey;

    type IntTable = RawTable<i32, i32>;

    fn hash_of(k: &i32) -> u64 {
        k.hash_bits()
    }

    fn put(t: &mut IntTable, key: i32, value: i32) -> Option<i32> {
        match t.locate(hash_of(&key), |k| *k == key) {
            Ok(i) => t.replace_value(i, value),
            Err(i) => {
                t.insert_at(i, key, value, 0, hash_of);
                None
            }
        }
    }

    fn get(t: &IntTable, key: i32) -> Option<i32> {
        t.locate(hash_of(&key), |k| *k == key)
            .ok()
            .and_then(|i| t.value_at(i).copied())
    }

    fn remove(t: &mut IntTable, key: i32) -> Option<i32> {
        let i = t.locate(hash_of(&key), |k| *k == key).ok()?;
        Some(t.remove_at(i, hash_of).value)
    }

    /// `count` distinct non-zero keys that share one ideal slot in a table
    /// of `size` slots.
    fn colliding_keys(size: usize, count: usize) -> Vec<i32> {
        let p = Placement::for_table_size(size);
        let target = p.place(1i32.hash_bits());
        (1..)
            .filter(|k: &i32| p.place(k.hash_bits()) == target)
            .take(count)
            .collect()
    }

    #[test]
    fn locate_reports_insertion_point_for_missing_keys() {
        let t = IntTable::with_table_size(8, 0.8);
        let ideal = t.placement().place(hash_of(&42));
        assert_eq!(t.locate(hash_of(&42), |k| *k == 42), Err(ideal));
    }

    #[test]
    fn grows_at_threshold_and_keeps_values() {
        // 8 slots, threshold 6.
        let mut t = IntTable::with_table_size(8, 0.8);
        assert_eq!(t.threshold(), 6);
        for k in 1..=5 {
            assert_eq!(put(&mut t, k, k * 10), None);
        }
        assert_eq!(t.slot_count(), 8);
        put(&mut t, 6, 60);
        assert_eq!(t.slot_count(), 16);
        assert_eq!(t.threshold(), 12);
        assert_eq!(get(&t, 3), Some(30));
        for k in 1..=6 {
            assert_eq!(get(&t, k), Some(k * 10));
        }
        t.assert_invariants(hash_of);
    }

    #[test]
    fn overwrite_keeps_slot_and_does_not_grow() {
        let mut t = IntTable::with_table_size(8, 0.8);
        for k in 1..=5 {
            put(&mut t, k, k);
        }
        let before = t.locate(hash_of(&3), |k| *k == 3);
        assert_eq!(put(&mut t, 3, 33), Some(3));
        assert_eq!(t.locate(hash_of(&3), |k| *k == 3), before);
        assert_eq!(t.len(), 5);
        assert_eq!(t.slot_count(), 8);
    }

    #[test]
    fn removing_middle_of_colliding_chain_keeps_successors_reachable() {
        let keys = colliding_keys(16, 4);
        let mut t = IntTable::with_table_size(16, 0.8);
        for &k in &keys {
            put(&mut t, k, k + 1);
        }
        let first = t.locate(hash_of(&keys[0]), |k| *k == keys[0]).unwrap();
        let second = t.locate(hash_of(&keys[1]), |k| *k == keys[1]).unwrap();
        assert_eq!(second, t.placement().next(first), "chain should be contiguous");

        assert_eq!(remove(&mut t, keys[1]), Some(keys[1] + 1));
        t.assert_invariants(hash_of);
        for &k in [keys[0], keys[2], keys[3]].iter() {
            assert_eq!(get(&t, k), Some(k + 1), "key {k} lost after backward shift");
        }
        assert_eq!(get(&t, keys[1]), None);
    }

    #[test]
    fn remove_reports_refill_source() {
        let keys = colliding_keys(16, 3);
        let mut t = IntTable::with_table_size(16, 0.8);
        for &k in &keys {
            put(&mut t, k, 0);
        }
        let head = t.locate(hash_of(&keys[0]), |k| *k == keys[0]).unwrap();
        let removed = t.remove_at(head, hash_of);
        assert_eq!(removed.key, keys[0]);
        assert_eq!(removed.refilled_from, Some(t.placement().next(head)));

        // The last entry of a chain leaves nothing to shift.
        let tail = t.locate(hash_of(&keys[2]), |k| *k == keys[2]).unwrap();
        let removed = t.remove_at(tail, hash_of);
        assert_eq!(removed.refilled_from, None);
        t.assert_invariants(hash_of);
    }

    #[test]
    fn chains_wrapping_past_the_end_survive_removal() {
        let p = Placement::for_table_size(16);
        let last: Vec<i32> = (1..)
            .filter(|k: &i32| p.place(k.hash_bits()) == 15)
            .take(3)
            .collect();
        let mut t = IntTable::with_table_size(16, 0.8);
        for &k in &last {
            put(&mut t, k, k);
        }
        assert_eq!(t.locate(hash_of(&last[1]), |k| *k == last[1]), Ok(0));
        remove(&mut t, last[0]);
        t.assert_invariants(hash_of);
        assert_eq!(get(&t, last[1]), Some(last[1]));
        assert_eq!(get(&t, last[2]), Some(last[2]));
    }

    #[test]
    fn ten_thousand_keys_survive_growth() {
        let mut t = IntTable::with_table_size(2, 0.8);
        for k in 1..=10_000 {
            put(&mut t, k, -k);
        }
        assert_eq!(t.len(), 10_000);
        for k in 1..=10_000 {
            assert_eq!(get(&t, k), Some(-k));
        }
        t.assert_invariants(hash_of);
    }

    #[test]
    fn ensure_capacity_pre_sizes() {
        let mut t = IntTable::with_table_size(8, 0.8);
        t.ensure_capacity(100, hash_of).unwrap();
        assert_eq!(t.slot_count(), 128);
        let before = t.slot_count();
        for k in 1..=100 {
            put(&mut t, k, k);
        }
        assert_eq!(t.slot_count(), before);
        assert!(matches!(
            t.ensure_capacity(usize::MAX / 2, hash_of),
            Err(TableError::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn ensure_capacity_covers_a_total_equal_to_the_threshold() {
        // 6 entries fit 8 slots by load factor, but the 6th put reaches the
        // 8-slot threshold, so 16 slots are reserved up front.
        let mut t = IntTable::with_table_size(2, 0.8);
        t.ensure_capacity(6, hash_of).unwrap();
        assert_eq!(t.slot_count(), 16);
        for k in 1..=6 {
            put(&mut t, k, k);
        }
        assert_eq!(t.slot_count(), 16);

        let mut t = IntTable::with_table_size(2, 0.8);
        t.ensure_capacity(12, hash_of).unwrap();
        assert!(t.threshold() > 12);
        let before = t.slot_count();
        for k in 1..=12 {
            put(&mut t, k, k);
        }
        assert_eq!(t.slot_count(), before);
    }

    #[test]
    fn ensure_capacity_overflows_when_doubling_passes_the_cap() {
        // threshold(2^30, 0.5) == 2^29, which needs one more doubling.
        let mut t = IntTable::with_table_size(2, 0.5);
        assert!(matches!(
            t.ensure_capacity(1 << 29, hash_of),
            Err(TableError::CapacityOverflow { .. })
        ));
        assert_eq!(t.slot_count(), 2);
    }

    #[test]
    fn shrink_preserves_contents_and_only_shrinks() {
        let mut t = IntTable::with_table_size(1024, 0.8);
        for k in 1..=10 {
            put(&mut t, k, k);
        }
        t.shrink(4096, 10, hash_of);
        assert_eq!(t.slot_count(), 1024);
        t.shrink(0, 10, hash_of);
        assert_eq!(t.slot_count(), 16);
        for k in 1..=10 {
            assert_eq!(get(&t, k), Some(k));
        }
        t.assert_invariants(hash_of);
    }

    #[test]
    fn clear_to_reallocates_only_when_larger() {
        let mut t = IntTable::with_table_size(256, 0.8);
        for k in 1..=20 {
            put(&mut t, k, k);
        }
        t.clear_to(1000);
        assert_eq!(t.slot_count(), 256);
        assert_eq!(t.len(), 0);
        put(&mut t, 1, 1);
        t.clear_to(10);
        assert_eq!(t.slot_count(), 16);
        assert_eq!(t.len(), 0);
        assert_eq!(get(&t, 1), None);
        put(&mut t, 7, 70);
        assert_eq!(get(&t, 7), Some(70));
    }

    #[test]
    fn retain_sees_each_entry_once_across_wrapping_chains() {
        let p = Placement::for_table_size(16);
        let mut keys: Vec<i32> = (1..)
            .filter(|k: &i32| p.place(k.hash_bits()) == 14)
            .take(4)
            .collect();
        keys.extend((1..).filter(|k: &i32| p.place(k.hash_bits()) == 3).take(2));
        let mut t = IntTable::with_table_size(16, 0.8);
        for &k in &keys {
            put(&mut t, k, k);
        }
        let mut calls = std::collections::HashMap::new();
        let removed = t.retain(
            |k, _| {
                *calls.entry(*k).or_insert(0) += 1;
                *k != keys[0] && *k != keys[4]
            },
            hash_of,
        );
        assert_eq!(removed, 2);
        assert_eq!(calls.len(), keys.len());
        assert!(calls.values().all(|&n| n == 1), "{calls:?}");
        t.assert_invariants(hash_of);
        for &k in &[keys[1], keys[2], keys[3], keys[5]] {
            assert_eq!(get(&t, k), Some(k));
        }
    }

    #[test]
    fn iter_mut_updates_values() {
        let mut t = IntTable::with_table_size(16, 0.8);
        for k in 1..=5 {
            put(&mut t, k, k);
        }
        for (_, v) in t.iter_mut() {
            *v *= 2;
        }
        let mut seen: Vec<(i32, i32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        seen.sort();
        assert_eq!(seen, (1..=5).map(|k| (k, k * 2)).collect::<Vec<_>>());
    }
}
