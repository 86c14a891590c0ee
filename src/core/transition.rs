//! Guarded transitions between states.

use super::guard::Guard;
use super::state::{State, WeakState};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Completion callback polled every tick while a transition is in progress.
/// Returns `true` once the transition has finished.
pub type TransitionAction = Rc<dyn Fn() -> bool>;

struct TransitionInner {
    name: RefCell<String>,
    from: RefCell<Option<WeakState>>,
    to: RefCell<WeakState>,
    guard: RefCell<Option<Guard>>,
    action: RefCell<Option<TransitionAction>>,
}

/// Directed edge from one state (or from any state) to a target.
///
/// Transitions only refer to their endpoints; the owning machine keeps the
/// states alive. A transition never starts once its target has been dropped.
///
/// Progress is tracked by the machine running the transition, not here.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{State, Transition};
///
/// let idle = State::new("Idle");
/// let run = State::new("Run");
/// let start_running = Transition::new("start_running", Some(&idle), &run);
///
/// // No predicate: never starts.
/// assert!(!start_running.should_begin());
/// // No completion callback: finishes immediately.
/// assert!(start_running.transition_callback());
///
/// start_running.when(|| true);
/// assert!(start_running.should_begin());
/// ```
#[derive(Clone)]
pub struct Transition {
    inner: Rc<TransitionInner>,
}

impl Transition {
    /// Create a transition. `from` is `None` for a transition that applies
    /// from any state.
    pub fn new(name: impl Into<String>, from: Option<&State>, to: &State) -> Self {
        Transition {
            inner: Rc::new(TransitionInner {
                name: RefCell::new(name.into()),
                from: RefCell::new(from.map(State::downgrade)),
                to: RefCell::new(to.downgrade()),
                guard: RefCell::new(None),
                action: RefCell::new(None),
            }),
        }
    }

    /// Get the transition name.
    pub fn name(&self) -> String {
        self.inner.name.borrow().clone()
    }

    /// Rename the transition.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.inner.name.borrow_mut() = name.into();
    }

    /// The origin state. `None` for any-state transitions, or when the origin
    /// has been dropped.
    pub fn from(&self) -> Option<State> {
        self.inner.from.borrow().as_ref().and_then(WeakState::upgrade)
    }

    /// Replace the origin. `None` makes this an any-state transition.
    pub fn set_from(&self, from: Option<&State>) {
        *self.inner.from.borrow_mut() = from.map(State::downgrade);
    }

    /// Whether this transition has no live origin, either because none was
    /// set or because the origin has been dropped. Agrees with
    /// [`Transition::from`].
    pub fn is_any_state(&self) -> bool {
        self.from().is_none()
    }

    /// The target state, unless it has been dropped.
    pub fn to(&self) -> Option<State> {
        self.inner.to.borrow().upgrade()
    }

    /// Replace the target.
    pub fn set_to(&self, to: &State) {
        *self.inner.to.borrow_mut() = to.downgrade();
    }

    pub(crate) fn targets(&self, state: &State) -> bool {
        self.inner.to.borrow().is(state)
    }

    /// Set the start predicate, replacing any previous one.
    pub fn when<F>(&self, predicate: F) -> &Self
    where
        F: Fn() -> bool + 'static,
    {
        self.set_guard(Guard::new(predicate))
    }

    /// Set the start predicate from a prebuilt [`Guard`].
    pub fn set_guard(&self, guard: Guard) -> &Self {
        *self.inner.guard.borrow_mut() = Some(guard);
        self
    }

    /// Set the completion callback, replacing any previous one.
    pub fn on_transition<F>(&self, callback: F) -> &Self
    where
        F: Fn() -> bool + 'static,
    {
        self.set_action(Rc::new(callback))
    }

    /// Set the completion callback from a shared action.
    pub fn set_action(&self, action: TransitionAction) -> &Self {
        *self.inner.action.borrow_mut() = Some(action);
        self
    }

    /// Whether the transition may start now. `false` without a predicate.
    pub fn should_begin(&self) -> bool {
        let guard = self.inner.guard.borrow().clone();
        guard.is_some_and(|guard| guard.check())
    }

    /// Poll the completion callback. `true` without a callback.
    pub fn transition_callback(&self) -> bool {
        let action = self.inner.action.borrow().clone();
        action.map_or(true, |action| action())
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Transition {}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &*self.inner.name.borrow())
            .field("from", &*self.inner.from.borrow())
            .field("to", &*self.inner.to.borrow())
            .finish()
    }
}
