//! Fibonacci placement: folds a 64-bit hash into a power-of-two table.
//!
//! The hash is multiplied by 2^64 / phi and only the top `log2(capacity)`
//! bits are kept. Sequential keys, and keys that are multiples of the
//! capacity, spread across the table instead of piling up the way they do
//! under plain masking.

use crate::error::{Result, TableError};

/// 2^64 divided by the golden ratio, rounded to odd.
pub const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Largest slot count a table may have.
pub const MAX_TABLE_SIZE: usize = 1 << 30;

/// Mask and shift for one table size. Recomputed on every resize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Placement {
    mask: usize,
    shift: u32,
}

impl Placement {
    /// `size` must be a power of two, at least 2.
    pub fn for_table_size(size: usize) -> Self {
        debug_assert!(size >= 2 && size.is_power_of_two(), "bad table size {size}");
        let mask = size - 1;
        Self {
            mask,
            shift: (mask as u64).leading_zeros(),
        }
    }

    /// Ideal slot for `hash`, in `[0, mask]`.
    #[inline]
    pub fn place(&self, hash: u64) -> usize {
        (hash.wrapping_mul(GOLDEN_GAMMA) >> self.shift) as usize
    }

    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    pub fn table_size(&self) -> usize {
        self.mask + 1
    }

    /// Slot following `index`, wrapping at the end of the table.
    #[inline]
    pub fn next(&self, index: usize) -> usize {
        (index + 1) & self.mask
    }

    /// Wrap-aware distance from an entry's ideal slot to `index`.
    #[inline]
    pub fn displacement(&self, ideal: usize, index: usize) -> usize {
        index.wrapping_sub(ideal) & self.mask
    }
}

/// Slot count needed to hold `capacity` entries below `load_factor`:
/// the next power of two of `ceil(capacity / load_factor)`, at least 2.
pub fn table_size(capacity: usize, load_factor: f32) -> Result<usize> {
    let overflow = TableError::CapacityOverflow {
        requested: capacity,
    };
    let wanted = (capacity as f64 / f64::from(load_factor)).ceil();
    if wanted.is_nan() || wanted > MAX_TABLE_SIZE as f64 {
        return Err(overflow);
    }
    let size = (wanted as usize).max(2).next_power_of_two();
    if size > MAX_TABLE_SIZE {
        return Err(overflow);
    }
    Ok(size)
}

/// Number of live entries at which a table of `size` slots grows.
pub fn threshold(size: usize, load_factor: f32) -> usize {
    (size as f64 * f64::from(load_factor)) as usize
}
