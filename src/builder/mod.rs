//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and shorthand constructors for
//! wiring states and transitions before the first tick.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Guard, State, Transition};

/// Create a transition that starts as soon as it is evaluated.
///
/// # Example
///
/// ```
/// use statecraft::builder::simple_transition;
/// use statecraft::core::State;
///
/// let start = State::new("Start");
/// let end = State::new("End");
/// let transition = simple_transition("finish", &start, &end);
///
/// assert!(transition.should_begin());
/// ```
pub fn simple_transition(name: impl Into<String>, from: &State, to: &State) -> Transition {
    let transition = Transition::new(name, Some(from), to);
    transition.set_guard(Guard::always());
    transition
}

/// Create a transition gated by a predicate.
///
/// # Example
///
/// ```
/// use statecraft::builder::guarded_transition;
/// use statecraft::core::State;
///
/// let idle = State::new("Idle");
/// let patrol = State::new("Patrol");
/// let handle = idle.downgrade();
/// let transition = guarded_transition("bored", &idle, &patrol, move || {
///     handle.upgrade().is_some_and(|idle| idle.timer() >= 2.0)
/// });
///
/// assert!(!transition.should_begin());
/// ```
pub fn guarded_transition<F>(
    name: impl Into<String>,
    from: &State,
    to: &State,
    predicate: F,
) -> Transition
where
    F: Fn() -> bool + 'static,
{
    let transition = Transition::new(name, Some(from), to);
    transition.when(predicate);
    transition
}

/// Create a transition with no origin, for registration with
/// [`StateMachine::add_any_state`](crate::core::StateMachine::add_any_state).
pub fn any_state_transition<F>(name: impl Into<String>, to: &State, predicate: F) -> Transition
where
    F: Fn() -> bool + 'static,
{
    let transition = Transition::new(name, None, to);
    transition.when(predicate);
    transition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_transition_builds() {
        let start = State::new("Start");
        let middle = State::new("Middle");
        let transition = simple_transition("advance", &start, &middle);

        assert_eq!(transition.from(), Some(start));
        assert_eq!(transition.to(), Some(middle));
        assert!(transition.should_begin());
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let start = State::new("Start");
        let middle = State::new("Middle");
        let open = guarded_transition("open", &start, &middle, || true);
        let closed = guarded_transition("closed", &start, &middle, || false);

        assert!(open.should_begin());
        assert!(!closed.should_begin());
    }

    #[test]
    fn any_state_transition_has_no_origin() {
        let dead = State::new("Dead");
        let transition = any_state_transition("die", &dead, || true);

        assert!(transition.is_any_state());
        assert!(transition.should_begin());
    }
}
