//! States: named nodes with lifecycle notifications and outgoing transitions.
//!
//! A [`State`] is a cheap, clonable handle. Clones refer to the same node and
//! compare equal; two separately created states never do, even when they share
//! a name.

use super::error::MembershipError;
use super::machine::{MachineCore, StateMachine};
use super::observer::StateObservers;
use super::transition::Transition;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// One of the per-frame invocation points a host drives a machine with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickPhase {
    /// Variable-rate frame update carrying the frame delta in seconds.
    Update(f32),
    /// Post-update pass carrying the frame delta in seconds.
    LateUpdate(f32),
    /// Fixed-rate physics step.
    FixedUpdate,
}

impl TickPhase {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::LateUpdate(_) => "late_update",
            Self::FixedUpdate => "fixed_update",
        }
    }
}

/// What a state node is: a plain leaf or a nested machine.
pub(crate) enum StateKind {
    Leaf,
    Composite(MachineCore),
}

pub(crate) struct StateInner {
    name: String,
    tag: RefCell<String>,
    timer: Cell<f32>,
    parent: RefCell<Weak<StateInner>>,
    transitions: RefCell<Vec<Transition>>,
    observers: StateObservers,
    pub(crate) kind: StateKind,
}

/// Handle to a state node.
///
/// # Example
///
/// ```rust
/// use statecraft::core::State;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let entered = Rc::new(Cell::new(0));
/// let idle = State::new("Idle");
/// {
///     let entered = Rc::clone(&entered);
///     idle.on_enter(move |_previous| entered.set(entered.get() + 1));
/// }
///
/// idle.update_callback(0.25);
/// assert_eq!(idle.timer(), 0.25);
///
/// idle.enter_callback(None);
/// assert_eq!(idle.timer(), 0.0);
/// assert_eq!(entered.get(), 1);
/// ```
#[derive(Clone)]
pub struct State {
    pub(crate) inner: Rc<StateInner>,
}

impl State {
    /// Create a leaf state.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), StateKind::Leaf)
    }

    pub(crate) fn with_kind(name: String, kind: StateKind) -> Self {
        State {
            inner: Rc::new(StateInner {
                name,
                tag: RefCell::new(String::new()),
                timer: Cell::new(0.0),
                parent: RefCell::new(Weak::new()),
                transitions: RefCell::new(Vec::new()),
                observers: StateObservers::new(),
                kind,
            }),
        }
    }

    /// Get the state name (fixed at construction).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the tag, empty when unset.
    pub fn tag(&self) -> String {
        self.inner.tag.borrow().clone()
    }

    /// Replace the tag used by [`StateMachine::get_state_with_tag`].
    pub fn set_tag(&self, tag: impl Into<String>) {
        *self.inner.tag.borrow_mut() = tag.into();
    }

    pub(crate) fn has_tag(&self, tag: &str) -> bool {
        *self.inner.tag.borrow() == tag
    }

    /// Seconds accumulated by update ticks since the state was last entered
    /// or exited.
    pub fn timer(&self) -> f32 {
        self.inner.timer.get()
    }

    /// The machine this state is currently registered with, if it is still
    /// alive.
    pub fn parent(&self) -> Option<StateMachine> {
        let parent = self.inner.parent.borrow().upgrade()?;
        State { inner: parent }.as_machine()
    }

    pub(crate) fn set_parent(&self, parent: Option<&State>) {
        *self.inner.parent.borrow_mut() = match parent {
            Some(machine) => Rc::downgrade(&machine.inner),
            None => Weak::new(),
        };
    }

    /// Outgoing transitions in evaluation order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.inner.transitions.borrow().clone()
    }

    /// Whether `transition` is already registered here.
    pub fn has_transition(&self, transition: &Transition) -> bool {
        self.inner.transitions.borrow().contains(transition)
    }

    /// Append an outgoing transition. Adding a transition twice is a no-op.
    pub fn add_transition(&self, transition: &Transition) {
        if let Err(err) = self.try_add_transition(transition) {
            tracing::trace!("{err}");
        }
    }

    /// Like [`State::add_transition`], reporting why nothing was added.
    pub fn try_add_transition(&self, transition: &Transition) -> Result<(), MembershipError> {
        if self.has_transition(transition) {
            return Err(MembershipError::TransitionAlreadyRegistered {
                transition: transition.name(),
                owner: self.name().to_string(),
            });
        }
        self.inner.transitions.borrow_mut().push(transition.clone());
        Ok(())
    }

    /// Whether this state is a nested machine.
    pub fn is_machine(&self) -> bool {
        matches!(self.inner.kind, StateKind::Composite(_))
    }

    /// View this state as a machine when it is one.
    pub fn as_machine(&self) -> Option<StateMachine> {
        match self.inner.kind {
            StateKind::Composite(_) => Some(StateMachine::from_state(self.clone())),
            StateKind::Leaf => None,
        }
    }

    /// Non-owning handle, for closures that must not keep the state alive.
    pub fn downgrade(&self) -> WeakState {
        WeakState {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a listener for entry. It receives the state left behind,
    /// or `None` on a first entry.
    pub fn on_enter<F>(&self, listener: F) -> &Self
    where
        F: Fn(Option<&State>) + 'static,
    {
        self.inner.observers.enter.subscribe(Rc::new(listener));
        self
    }

    /// Register a listener for exit. It receives the state being entered.
    pub fn on_exit<F>(&self, listener: F) -> &Self
    where
        F: Fn(&State) + 'static,
    {
        self.inner.observers.exit.subscribe(Rc::new(listener));
        self
    }

    /// Register a listener for update ticks. It receives the frame delta.
    pub fn on_update<F>(&self, listener: F) -> &Self
    where
        F: Fn(f32) + 'static,
    {
        self.inner.observers.update.subscribe(Rc::new(listener));
        self
    }

    /// Register a listener for late-update ticks. It receives the frame delta.
    pub fn on_late_update<F>(&self, listener: F) -> &Self
    where
        F: Fn(f32) + 'static,
    {
        self.inner.observers.late_update.subscribe(Rc::new(listener));
        self
    }

    /// Register a listener for fixed-update ticks.
    pub fn on_fixed_update<F>(&self, listener: F) -> &Self
    where
        F: Fn() + 'static,
    {
        self.inner.observers.fixed_update.subscribe(Rc::new(listener));
        self
    }

    /// Enter this state. Machines also enter their active child.
    pub fn enter_callback(&self, previous: Option<&State>) {
        match self.as_machine() {
            Some(machine) => machine.enter_callback(previous),
            None => self.base_enter(previous),
        }
    }

    /// Leave this state for `next`. Machines also exit their active child.
    pub fn exit_callback(&self, next: &State) {
        match self.as_machine() {
            Some(machine) => machine.exit_callback(next),
            None => self.base_exit(next),
        }
    }

    /// Run the update phase: accumulate the timer, then notify.
    pub fn update_callback(&self, delta_time: f32) {
        self.tick(TickPhase::Update(delta_time));
    }

    /// Run the late-update phase. The timer is untouched.
    pub fn late_update_callback(&self, delta_time: f32) {
        self.tick(TickPhase::LateUpdate(delta_time));
    }

    /// Run the fixed-update phase. The timer is untouched.
    pub fn fixed_update_callback(&self) {
        self.tick(TickPhase::FixedUpdate);
    }

    /// Run one tick phase. Machines evaluate their transitions first; leaves
    /// only notify.
    pub fn tick(&self, phase: TickPhase) {
        match self.as_machine() {
            Some(machine) => machine.tick(phase),
            None => self.base_tick(phase),
        }
    }

    pub(crate) fn base_enter(&self, previous: Option<&State>) {
        self.inner.timer.set(0.0);
        for listener in self.inner.observers.enter.snapshot() {
            listener(previous);
        }
    }

    pub(crate) fn base_exit(&self, next: &State) {
        self.inner.timer.set(0.0);
        for listener in self.inner.observers.exit.snapshot() {
            listener(next);
        }
    }

    pub(crate) fn base_tick(&self, phase: TickPhase) {
        match phase {
            TickPhase::Update(delta_time) => {
                self.inner.timer.set(self.inner.timer.get() + delta_time);
                for listener in self.inner.observers.update.snapshot() {
                    listener(delta_time);
                }
            }
            TickPhase::LateUpdate(delta_time) => {
                for listener in self.inner.observers.late_update.snapshot() {
                    listener(delta_time);
                }
            }
            TickPhase::FixedUpdate => {
                for listener in self.inner.observers.fixed_update.snapshot() {
                    listener();
                }
            }
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for State {}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name())
            .field("tag", &*self.inner.tag.borrow())
            .field("timer", &self.timer())
            .field("is_machine", &self.is_machine())
            .finish()
    }
}

/// Non-owning state handle.
#[derive(Clone, Default)]
pub struct WeakState {
    inner: Weak<StateInner>,
}

impl WeakState {
    /// The state, if it is still alive.
    pub fn upgrade(&self) -> Option<State> {
        self.inner.upgrade().map(|inner| State { inner })
    }

    /// Whether this handle points at `state`.
    pub fn is(&self, state: &State) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Rc::as_ptr(&state.inner))
    }
}

impl fmt::Debug for WeakState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(state) => write!(f, "WeakState({:?})", state.name()),
            None => f.write_str("WeakState(<dropped>)"),
        }
    }
}
