//! Construction-time configuration shared by every container.
//!
//! There is no process-wide iteration flag: the view reuse policy travels
//! with the [`TableConfig`] a container is built from.

use crate::error::{Result, TableError};
use crate::placement;

/// Capacity hint used by `new()` and `Default`.
pub const DEFAULT_CAPACITY: usize = 51;

/// Load factor used by `new()` and `Default`.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.8;

/// How a container hands out `entries()`, `keys()` and `values()` views.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum IterationPolicy {
    /// Recycle views: handing out a view invalidates the previously issued
    /// view of the same kind. Avoids per-traversal bookkeeping allocations
    /// and detects accidental nesting.
    #[default]
    Reuse,
    /// Every view is independent and stays valid, so traversals may nest.
    Allocate,
}

/// Initial sizing, growth trigger, and view policy for a table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    /// Capacity hint the initial table is sized from: the next power of two
    /// of `initial_capacity / load_factor`. Growth still triggers when the
    /// count reaches `floor(slots * load_factor)`, which may equal the hint.
    pub initial_capacity: usize,
    /// Fraction of slots that may be occupied before the table doubles.
    pub load_factor: f32,
    /// View reuse policy.
    pub iteration: IterationPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            iteration: IterationPolicy::Reuse,
        }
    }
}

impl TableConfig {
    /// Default configuration with a different capacity hint.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_iteration(mut self, iteration: IterationPolicy) -> Self {
        self.iteration = iteration;
        self
    }

    /// Checks the load factor and that the capacity hint fits in a table.
    pub fn validate(&self) -> Result<()> {
        self.table_size().map(|_| ())
    }

    /// Slot count a table built from this configuration starts with.
    pub fn table_size(&self) -> Result<usize> {
        check_load_factor(self.load_factor)?;
        placement::table_size(self.initial_capacity, self.load_factor)
    }
}

pub(crate) fn check_load_factor(load_factor: f32) -> Result<()> {
    // Written so that NaN is rejected too.
    if load_factor > 0.0 && load_factor < 1.0 {
        Ok(())
    } else {
        Err(TableError::InvalidLoadFactor(load_factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_sizes_to_64_slots() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.initial_capacity, 51);
        assert_eq!(cfg.iteration, IterationPolicy::Reuse);
        assert_eq!(cfg.table_size(), Ok(64));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_factor_outside_open_unit_interval_is_rejected() {
        for lf in [0.0f32, 1.0, -0.5, 1.5, f32::NAN] {
            let cfg = TableConfig::default().with_load_factor(lf);
            assert!(
                matches!(cfg.validate(), Err(TableError::InvalidLoadFactor(_))),
                "load factor {lf} should be rejected"
            );
        }
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let cfg = TableConfig::with_capacity(1 << 30);
        assert_eq!(
            cfg.validate(),
            Err(TableError::CapacityOverflow {
                requested: 1 << 30
            })
        );
    }

    #[test]
    fn builder_methods_compose() {
        let cfg = TableConfig::with_capacity(6)
            .with_load_factor(0.5)
            .with_iteration(IterationPolicy::Allocate);
        assert_eq!(cfg.initial_capacity, 6);
        assert_eq!(cfg.load_factor, 0.5);
        assert_eq!(cfg.iteration, IterationPolicy::Allocate);
        assert_eq!(cfg.table_size(), Ok(16));
    }
}
