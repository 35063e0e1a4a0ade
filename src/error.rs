//! Error types for table construction, sizing, and view traversal.
//!
//! All of these describe programming errors rather than transient
//! conditions; nothing here is worth retrying.

use crate::view::ViewKind;
use thiserror::Error;

/// Errors raised while sizing or configuring a table.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TableError {
    /// The load factor must lie strictly between 0 and 1.
    #[error("load factor must be > 0 and < 1: {0}")]
    InvalidLoadFactor(f32),

    /// The requested capacity implies a table larger than 2^30 slots.
    #[error("the required capacity is too large: {requested}")]
    CapacityOverflow {
        /// Number of entries the caller asked room for.
        requested: usize,
    },
}

/// Errors raised by [`Cursor`](crate::view::Cursor) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// A newer view of the same kind was handed out by the container, so
    /// this one was recycled.
    #[error("{0:?} view was invalidated by a newer view of the same kind; views cannot be used nested")]
    Invalidated(ViewKind),

    /// `remove` was called without a preceding successful `advance`.
    #[error("advance must be called before remove")]
    RemoveBeforeAdvance,
}

/// Crate-wide result alias; defaults to [`TableError`].
pub type Result<T, E = TableError> = core::result::Result<T, E>;
