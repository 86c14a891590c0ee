//! Guard predicates for controlling when transitions start.
//!
//! Guards are boolean functions polled once per tick while a machine is idle.
//! They usually read timers or game data captured by the closure.

use std::fmt;
use std::rc::Rc;

/// Predicate that determines if a transition may begin.
///
/// A guard is cheap to clone: clones share the same closure, so one guard can
/// gate several transitions.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let health = Rc::new(Cell::new(10));
/// let is_dead = {
///     let health = Rc::clone(&health);
///     Guard::new(move || health.get() <= 0)
/// };
///
/// assert!(!is_dead.check());
/// health.set(0);
/// assert!(is_dead.check());
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Rc<dyn Fn() -> bool>,
}

impl Guard {
    /// Create a guard from a predicate closure.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard {
            predicate: Rc::new(predicate),
        }
    }

    /// A guard that always allows the transition.
    pub fn always() -> Self {
        Guard::new(|| true)
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }

    /// Guard that holds only when both guards hold. `other` is not evaluated
    /// when `self` fails.
    pub fn and(self, other: Guard) -> Self {
        Guard::new(move || self.check() && other.check())
    }

    /// Guard that holds when either guard holds.
    pub fn or(self, other: Guard) -> Self {
        Guard::new(move || self.check() || other.check())
    }

    /// Guard that holds when `self` does not.
    pub fn negate(self) -> Self {
        Guard::new(move || !self.check())
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn guard_reflects_captured_state() {
        let flag = Rc::new(Cell::new(false));
        let guard = {
            let flag = Rc::clone(&flag);
            Guard::new(move || flag.get())
        };

        assert!(!guard.check());
        flag.set(true);
        assert!(guard.check());
    }

    #[test]
    fn always_guard_passes() {
        assert!(Guard::always().check());
    }

    #[test]
    fn guards_compose() {
        let yes = Guard::always();
        let no = Guard::new(|| false);

        assert!(!yes.clone().and(no.clone()).check());
        assert!(yes.clone().or(no.clone()).check());
        assert!(no.negate().check());
    }

    #[test]
    fn and_short_circuits() {
        let calls = Rc::new(Cell::new(0));
        let counted = {
            let calls = Rc::clone(&calls);
            Guard::new(move || {
                calls.set(calls.get() + 1);
                true
            })
        };

        let guard = Guard::new(|| false).and(counted);
        assert!(!guard.check());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn cloned_guards_share_predicate() {
        let calls = Rc::new(Cell::new(0));
        let guard = {
            let calls = Rc::clone(&calls);
            Guard::new(move || {
                calls.set(calls.get() + 1);
                true
            })
        };
        let clone = guard.clone();

        guard.check();
        clone.check();
        assert_eq!(calls.get(), 2);
    }
}
