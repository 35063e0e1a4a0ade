//! The operation set shared by every container.
//!
//! [`Ordered`](crate::Ordered) is generic over this trait, so any container
//! can be given an insertion-order overlay. Sets implement it with
//! `Value = ()`.

use crate::config::TableConfig;
use crate::error::Result;
use crate::view::ViewRegistry;

pub trait Table {
    type Key;
    type Value;

    /// Set-like tables, whose values are `()` and carry no information.
    const KEYS_ONLY: bool = false;

    /// Builds an empty container. Fails on an invalid load factor or a
    /// capacity hint that needs more than 2^30 slots.
    fn with_config(config: TableConfig) -> Result<Self>
    where
        Self: Sized;

    /// Number of entries, including an integer zero key.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &Self::Key) -> bool;

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn get_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;

    /// Inserts or overwrites. Returns the previous value of an existing
    /// key, whose slot is left where it was.
    fn put(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    fn clear(&mut self);

    /// Clears, and reallocates smaller if the table is larger than
    /// `max_capacity` entries need.
    fn clear_to(&mut self, max_capacity: usize);

    /// Makes room for `additional` more entries without resizing.
    fn try_ensure_capacity(&mut self, additional: usize) -> Result<()>;

    /// Reduces the table to what `max_capacity` entries need, but never
    /// below what the current entries need.
    fn shrink(&mut self, max_capacity: usize);

    fn views(&self) -> &ViewRegistry;
}
