//! Debug-only guard against reentering a table from user callbacks.
//!
//! Probing runs `K: Eq`, and the backward shift and rehash run `K: Hash`
//! while the slot arrays are being rearranged. A callback that reaches
//! back into the same table at that point (through a raw pointer or a
//! shared cell) would observe a half-moved table. In debug builds,
//! entering a guarded section twice panics. In release builds the guard
//! compiles to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table section tracker. Guard a section with
/// `let _g = self.guard.enter();` and only touch sibling fields while the
/// returned [`Section`] is alive.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    depth: Cell<u32>,
    // Tables may move between threads but are never shared.
    _nosync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            depth: Cell::new(0),
            _nosync: PhantomData,
        }
    }

    /// Enters a guarded section. Panics in debug builds if one is already
    /// open on this table.
    #[inline]
    pub(crate) fn enter(&self) -> Section<'_> {
        #[cfg(debug_assertions)]
        {
            let d = self.depth.get();
            assert!(
                d == 0,
                "table reentered from a Hash/Eq callback while its slots were being rearranged"
            );
            self.depth.set(d + 1);
            Section { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Section { _z: PhantomData }
        }
    }

    /// Whether a guarded section is currently open. Always false in
    /// release builds.
    #[cfg(test)]
    fn is_entered(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            self.depth.get() > 0
        }

        #[cfg(not(debug_assertions))]
        {
            false
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DebugReentrancy {
    // A cloned table starts outside any section.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII section returned by [`DebugReentrancy::enter`].
pub(crate) struct Section<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for Section<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let d = self.owner.depth.get();
            debug_assert!(d > 0);
            self.owner.depth.set(d - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sections_open_and_close() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter();
            assert_eq!(r.is_entered(), cfg!(debug_assertions));
        }
        assert!(!r.is_entered());
        let _again = r.enter();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_section_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _g1 = r.enter();
            let _g2 = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_section_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _g1 = r.enter();
        let _g2 = r.enter();
    }

    #[test]
    fn guard_is_send_but_not_shared() {
        fn assert_send<T: Send>() {}
        assert_send::<DebugReentrancy>();
    }

    #[test]
    fn clone_starts_closed() {
        let r = DebugReentrancy::new();
        let _g = r.enter();
        let c = r.clone();
        assert!(!c.is_entered());
    }
}
