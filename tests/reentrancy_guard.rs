#![cfg(test)]

use shiftmap::ObjectMap;
use std::cell::Cell;
use std::hash::{Hash, Hasher};

// A key whose equality check looks the key up again in the map it lives
// in, reached through a thread-local pointer.
thread_local! {
    static HOME: Cell<*const ObjectMap<Nosy, u8>> = Cell::new(std::ptr::null());
    static ARMED: Cell<bool> = Cell::new(false);
}

struct Nosy(u32);

impl Hash for Nosy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq for Nosy {
    fn eq(&self, other: &Self) -> bool {
        if ARMED.with(|a| a.replace(false)) {
            let home = HOME.with(Cell::get);
            // SAFETY: only armed while `home` is alive and borrowed shared.
            let _ = unsafe { (*home).contains_key(&Nosy(self.0)) };
        }
        self.0 == other.0
    }
}

impl Eq for Nosy {}

#[cfg(debug_assertions)]
#[test]
fn lookup_from_eq_callback_panics_in_debug() {
    let mut m: ObjectMap<Nosy, u8> = ObjectMap::new();
    m.put(Nosy(7), 1);
    HOME.with(|h| h.set(&m));
    ARMED.with(|a| a.set(true));
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| m.get(&Nosy(7)).copied()));
    HOME.with(|h| h.set(std::ptr::null()));
    assert!(res.is_err(), "expected nested lookup to panic in debug builds");
}

#[test]
fn lookup_after_callback_returns_is_fine() {
    let mut m: ObjectMap<Nosy, u8> = ObjectMap::new();
    m.put(Nosy(3), 9);
    ARMED.with(|a| a.set(false));
    assert_eq!(m.get(&Nosy(3)), Some(&9));
    assert_eq!(m.remove(&Nosy(3)), Some(9));
    assert!(m.is_empty());
}
