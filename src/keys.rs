//! How keys are stored in a table's slot array.
//!
//! Object keys live in `Option<K>` slots; `None` is a vacant slot and no key
//! value is reserved.
//!
//! Integer keys are stored bare, and the value `0` marks a vacant slot.
//! Integer-keyed containers keep the entry for key `0` in an `Option` field
//! next to the table; [`KeySlot::fill`] must never be handed `0`.

use core::fmt::Debug;
use core::hash::Hash;

/// One slot of a key array: vacant, or holding exactly one key.
pub trait KeySlot: Sized {
    type Key;

    fn vacant() -> Self;

    /// Wraps a key for storage.
    fn fill(key: Self::Key) -> Self;

    /// The stored key, or `None` for a vacant slot.
    fn key(&self) -> Option<&Self::Key>;

    /// Moves the key out, leaving the slot vacant.
    fn take(&mut self) -> Option<Self::Key>;

    fn into_key(self) -> Option<Self::Key>;

    #[inline]
    fn is_vacant(&self) -> bool {
        self.key().is_none()
    }
}

impl<K> KeySlot for Option<K> {
    type Key = K;

    #[inline]
    fn vacant() -> Self {
        None
    }

    #[inline]
    fn fill(key: K) -> Self {
        Some(key)
    }

    #[inline]
    fn key(&self) -> Option<&K> {
        self.as_ref()
    }

    #[inline]
    fn take(&mut self) -> Option<K> {
        Option::take(self)
    }

    #[inline]
    fn into_key(self) -> Option<K> {
        self
    }
}

/// Primitive integer key whose value `0` doubles as the vacant-slot marker.
///
/// `hash_bits` is the key's own bit pattern (signed keys sign-extended), so
/// placement is driven entirely by the Fibonacci multiply.
pub trait IntKey: KeySlot<Key = Self> + Copy + Eq + Hash + Debug + 'static {
    const ZERO: Self;

    /// `&ZERO` with a `'static` lifetime, for views that lend the zero key.
    const ZERO_KEY: &'static Self;

    fn hash_bits(self) -> u64;
}

macro_rules! int_key {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl KeySlot for $t {
            type Key = $t;

            #[inline]
            fn vacant() -> Self {
                0
            }

            #[inline]
            fn fill(key: $t) -> Self {
                debug_assert!(key != 0, "key 0 is the vacant marker and lives outside the slots");
                key
            }

            #[inline]
            fn key(&self) -> Option<&$t> {
                if *self == 0 {
                    None
                } else {
                    Some(self)
                }
            }

            #[inline]
            fn take(&mut self) -> Option<$t> {
                let key = core::mem::replace(self, 0);
                (key != 0).then_some(key)
            }

            #[inline]
            fn into_key(self) -> Option<$t> {
                (self != 0).then_some(self)
            }
        }

        impl IntKey for $t {
            const ZERO: Self = 0;
            const ZERO_KEY: &'static Self = &0;

            #[inline]
            fn hash_bits(self) -> u64 {
                <$wide>::from(self) as u64
            }
        }
    )*};
}

int_key!(i32 => i64, i64 => i64, u32 => u64, u64 => u64);
