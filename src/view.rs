//! Views: explicit cursors, per-container view registries, and the
//! borrowing `Entries`/`Keys`/`Values` iterators built on them.
//!
//! A [`Cursor`] is a plain value. It remembers a scan position and a
//! [`Ticket`] but does not borrow its container, so it can remove entries
//! mid-traversal through `&mut` access. Under [`IterationPolicy::Reuse`] a
//! container keeps one live ticket per [`ViewKind`]; handing out a new view
//! of that kind retires the previous ticket, and the old view then fails
//! with [`ViewError::Invalidated`]. Tickets are generational `slotmap` keys,
//! so a retired ticket can never be mistaken for a live one.

use crate::config::IterationPolicy;
use crate::error::ViewError;
use core::cell::{Cell, RefCell};
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SlotMap};

/// The three view families a container hands out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Entries,
    Keys,
    Values,
}

impl ViewKind {
    fn index(self) -> usize {
        match self {
            ViewKind::Entries => 0,
            ViewKind::Keys => 1,
            ViewKind::Values => 2,
        }
    }
}

/// A cursor position: the integer zero-key entry, or a table slot. For the
/// ordered overlay, `Slot(i)` is the i-th key in insertion order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Position {
    Sentinel,
    Slot(usize),
}

impl Position {
    fn successor(self) -> Position {
        match self {
            Position::Sentinel => Position::Slot(0),
            Position::Slot(i) => Position::Slot(i + 1),
        }
    }
}

/// Proof that a view was handed out. `key == None` never expires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    kind: ViewKind,
    key: Option<DefaultKey>,
}

impl Ticket {
    pub fn kind(&self) -> ViewKind {
        self.kind
    }
}

/// Issues and validates view tickets for one container.
#[derive(Debug)]
pub struct ViewRegistry {
    policy: IterationPolicy,
    live: RefCell<SlotMap<DefaultKey, ViewKind>>,
    current: [Cell<Option<DefaultKey>>; 3],
}

impl ViewRegistry {
    pub fn new(policy: IterationPolicy) -> Self {
        Self {
            policy,
            live: RefCell::new(SlotMap::new()),
            current: Default::default(),
        }
    }

    pub fn policy(&self) -> IterationPolicy {
        self.policy
    }

    /// Hands out a ticket for a view of `kind`. Under `Reuse` this retires
    /// the previously issued ticket of the same kind.
    pub fn issue(&self, kind: ViewKind) -> Ticket {
        if self.policy == IterationPolicy::Allocate {
            return Self::fresh(kind);
        }
        let mut live = self.live.borrow_mut();
        let slot = &self.current[kind.index()];
        if let Some(old) = slot.take() {
            live.remove(old);
        }
        let key = live.insert(kind);
        slot.set(Some(key));
        Ticket {
            kind,
            key: Some(key),
        }
    }

    /// A ticket that is never retired, whatever the policy.
    pub fn fresh(kind: ViewKind) -> Ticket {
        Ticket { kind, key: None }
    }

    pub fn check(&self, ticket: &Ticket) -> Result<(), ViewError> {
        match ticket.key {
            None => Ok(()),
            Some(key) if self.live.borrow().contains_key(key) => Ok(()),
            Some(_) => Err(ViewError::Invalidated(ticket.kind)),
        }
    }
}

impl Clone for ViewRegistry {
    // Views belong to the container that issued them; a clone starts with none.
    fn clone(&self) -> Self {
        Self::new(self.policy)
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(IterationPolicy::default())
    }
}

/// A container a [`Cursor`] can walk.
///
/// Positions run `Sentinel` (only when [`has_sentinel`](Self::has_sentinel)
/// is true), then `Slot(0)` up to `Slot(slot_count() - 1)`; vacant slots
/// yield `None` from [`entry_at`](Self::entry_at).
pub trait CursorTarget {
    type Key;
    type Value;

    fn views(&self) -> &ViewRegistry;

    fn has_sentinel(&self) -> bool;

    fn slot_count(&self) -> usize;

    fn entry_at(&self, pos: Position) -> Option<(&Self::Key, &Self::Value)>;

    /// Removes the entry at `pos`. Returns the position whose entry moved
    /// into `pos` to fill it, if any.
    fn remove_at(&mut self, pos: Position) -> Option<usize>;
}

/// Explicit traversal state over a [`CursorTarget`].
///
/// ```
/// use shiftmap::{IntMap, ViewKind};
///
/// let mut m: IntMap<&str> = (1..=4).map(|k| (k, "v")).collect();
/// let mut c = m.cursor(ViewKind::Keys);
/// while let Some((k, _)) = c.advance(&m).unwrap() {
///     if k % 2 == 0 {
///         c.remove(&mut m).unwrap();
///     }
/// }
/// assert_eq!(m.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    ticket: Ticket,
    next: Option<Position>,
    current: Option<Position>,
}

impl Cursor {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            next: Some(Position::Sentinel),
            current: None,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.ticket.kind
    }

    /// Restarts the traversal. Keeps the ticket, so a retired cursor stays
    /// retired.
    pub fn rewind(&mut self) {
        self.next = Some(Position::Sentinel);
        self.current = None;
    }

    fn peek<T: CursorTarget + ?Sized>(&self, target: &T) -> Option<Position> {
        let start = match self.next? {
            Position::Sentinel if target.has_sentinel() => return Some(Position::Sentinel),
            Position::Sentinel => 0,
            Position::Slot(i) => i,
        };
        (start..target.slot_count())
            .map(Position::Slot)
            .find(|&pos| target.entry_at(pos).is_some())
    }

    pub fn has_next<T: CursorTarget + ?Sized>(&self, target: &T) -> Result<bool, ViewError> {
        target.views().check(&self.ticket)?;
        Ok(self.peek(target).is_some())
    }

    /// Moves to the next live entry and returns it, or `None` once the
    /// traversal is exhausted.
    pub fn advance<'a, T: CursorTarget + ?Sized>(
        &mut self,
        target: &'a T,
    ) -> Result<Option<(&'a T::Key, &'a T::Value)>, ViewError> {
        target.views().check(&self.ticket)?;
        match self.peek(target) {
            Some(pos) => {
                self.current = Some(pos);
                self.next = Some(pos.successor());
                Ok(target.entry_at(pos))
            }
            None => {
                self.current = None;
                self.next = None;
                Ok(None)
            }
        }
    }

    /// Removes the entry last returned by [`advance`](Self::advance).
    ///
    /// When a later entry is shifted back into the vacated slot, the next
    /// `advance` revisits that slot, so nothing is skipped. An entry that
    /// wraps from the start of the table into the vacated slot has already
    /// been visited and may be seen a second time.
    pub fn remove<T: CursorTarget + ?Sized>(&mut self, target: &mut T) -> Result<(), ViewError> {
        target.views().check(&self.ticket)?;
        let pos = self.current.take().ok_or(ViewError::RemoveBeforeAdvance)?;
        let refilled = target.remove_at(pos);
        if let (Position::Slot(i), Some(src)) = (pos, refilled) {
            if src > i {
                self.next = Some(Position::Slot(i));
            }
        }
        Ok(())
    }
}

/// Borrowing iterator over `(key, value)` pairs.
///
/// Panics if the container retires its ticket mid-traversal, which under
/// [`IterationPolicy::Reuse`] happens when another view of the same kind
/// is requested.
pub struct Entries<'a, T: CursorTarget + ?Sized> {
    target: &'a T,
    cursor: Cursor,
}

impl<'a, T: CursorTarget + ?Sized> Entries<'a, T> {
    pub fn new(target: &'a T, ticket: Ticket) -> Self {
        Self {
            target,
            cursor: Cursor::new(ticket),
        }
    }

    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }
}

impl<'a, T: CursorTarget + ?Sized> Iterator for Entries<'a, T> {
    type Item = (&'a T::Key, &'a T::Value);

    fn next(&mut self) -> Option<Self::Item> {
        // Exhausted iterators stay exhausted even after their ticket retires.
        self.cursor.next?;
        match self.cursor.advance(self.target) {
            Ok(entry) => entry,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, T: CursorTarget + ?Sized> FusedIterator for Entries<'a, T> {}

/// Borrowing iterator over keys. Panics like [`Entries`].
pub struct Keys<'a, T: CursorTarget + ?Sized>(Entries<'a, T>);

impl<'a, T: CursorTarget + ?Sized> Keys<'a, T> {
    pub fn new(target: &'a T, ticket: Ticket) -> Self {
        Keys(Entries::new(target, ticket))
    }

    pub fn rewind(&mut self) {
        self.0.rewind();
    }
}

impl<'a, T: CursorTarget + ?Sized> Iterator for Keys<'a, T> {
    type Item = &'a T::Key;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }
}

impl<'a, T: CursorTarget + ?Sized> FusedIterator for Keys<'a, T> {}

/// Borrowing iterator over values. Panics like [`Entries`].
pub struct Values<'a, T: CursorTarget + ?Sized>(Entries<'a, T>);

impl<'a, T: CursorTarget + ?Sized> Values<'a, T> {
    pub fn new(target: &'a T, ticket: Ticket) -> Self {
        Values(Entries::new(target, ticket))
    }

    pub fn rewind(&mut self) {
        self.0.rewind();
    }
}

impl<'a, T: CursorTarget + ?Sized> Iterator for Values<'a, T> {
    type Item = &'a T::Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }
}

impl<'a, T: CursorTarget + ?Sized> FusedIterator for Values<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slots are a plain vector; removal shifts the tail down like the
    /// ordered overlay does.
    struct VecTarget {
        zero: Option<u8>,
        slots: Vec<Option<(u8, u8)>>,
        views: ViewRegistry,
    }

    impl CursorTarget for VecTarget {
        type Key = u8;
        type Value = u8;

        fn views(&self) -> &ViewRegistry {
            &self.views
        }

        fn has_sentinel(&self) -> bool {
            self.zero.is_some()
        }

        fn slot_count(&self) -> usize {
            self.slots.len()
        }

        fn entry_at(&self, pos: Position) -> Option<(&u8, &u8)> {
            match pos {
                Position::Sentinel => self.zero.as_ref().map(|v| (&0, v)),
                Position::Slot(i) => self.slots.get(i)?.as_ref().map(|(k, v)| (k, v)),
            }
        }

        fn remove_at(&mut self, pos: Position) -> Option<usize> {
            match pos {
                Position::Sentinel => {
                    self.zero = None;
                    None
                }
                Position::Slot(i) => {
                    self.slots.remove(i);
                    (i < self.slots.len()).then_some(i + 1)
                }
            }
        }
    }

    fn target(policy: IterationPolicy) -> VecTarget {
        VecTarget {
            zero: Some(100),
            slots: vec![Some((1, 10)), None, Some((3, 30)), Some((4, 40))],
            views: ViewRegistry::new(policy),
        }
    }

    #[test]
    fn cursor_visits_sentinel_then_live_slots() {
        let t = target(IterationPolicy::Reuse);
        let keys: Vec<u8> = Keys::new(&t, t.views.issue(ViewKind::Keys)).copied().collect();
        assert_eq!(keys, vec![0, 1, 3, 4]);
    }

    #[test]
    fn remove_before_advance_is_an_error() {
        let mut t = target(IterationPolicy::Reuse);
        let mut c = Cursor::new(t.views.issue(ViewKind::Entries));
        assert_eq!(c.remove(&mut t), Err(ViewError::RemoveBeforeAdvance));
        c.advance(&t).unwrap();
        c.remove(&mut t).unwrap();
        assert_eq!(c.remove(&mut t), Err(ViewError::RemoveBeforeAdvance));
    }

    #[test]
    fn removal_with_refill_revisits_the_slot() {
        let mut t = target(IterationPolicy::Reuse);
        let mut c = Cursor::new(t.views.issue(ViewKind::Entries));
        let mut seen = Vec::new();
        while let Some((k, _)) = c.advance(&t).unwrap() {
            let k = *k;
            seen.push(k);
            if k == 3 {
                c.remove(&mut t).unwrap();
            }
        }
        assert_eq!(seen, vec![0, 1, 3, 4]);
        assert_eq!(t.slots.len(), 3);
    }

    #[test]
    fn reuse_policy_retires_previous_view_of_same_kind() {
        let t = target(IterationPolicy::Reuse);
        let first = Cursor::new(t.views.issue(ViewKind::Keys));
        let other_kind = Cursor::new(t.views.issue(ViewKind::Values));
        let second = Cursor::new(t.views.issue(ViewKind::Keys));
        assert_eq!(
            first.has_next(&t),
            Err(ViewError::Invalidated(ViewKind::Keys))
        );
        assert_eq!(other_kind.has_next(&t), Ok(true));
        assert_eq!(second.has_next(&t), Ok(true));
    }

    #[test]
    fn allocate_policy_never_retires() {
        let t = target(IterationPolicy::Allocate);
        let first = Cursor::new(t.views.issue(ViewKind::Keys));
        let _second = Cursor::new(t.views.issue(ViewKind::Keys));
        assert_eq!(first.has_next(&t), Ok(true));
    }

    #[test]
    fn rewind_restarts_but_keeps_ticket() {
        let t = target(IterationPolicy::Reuse);
        let mut c = Cursor::new(t.views.issue(ViewKind::Values));
        while c.advance(&t).unwrap().is_some() {}
        assert_eq!(c.has_next(&t), Ok(false));
        c.rewind();
        assert_eq!(c.advance(&t).unwrap().map(|(_, v)| *v), Some(100));

        t.views.issue(ViewKind::Values);
        c.rewind();
        assert!(c.advance(&t).is_err());
    }

    #[test]
    fn cloned_registry_issues_independent_tickets() {
        let t = target(IterationPolicy::Reuse);
        let ticket = t.views.issue(ViewKind::Entries);
        let copy = t.views.clone();
        assert!(t.views.check(&ticket).is_ok());
        copy.issue(ViewKind::Entries);
        assert!(t.views.check(&ticket).is_ok());
    }

    #[test]
    fn stale_borrowing_iterator_panics() {
        let t = target(IterationPolicy::Reuse);
        let mut stale = Entries::new(&t, t.views.issue(ViewKind::Entries));
        let _fresh = Entries::new(&t, t.views.issue(ViewKind::Entries));
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| stale.next()));
        assert!(res.is_err());
    }
}
