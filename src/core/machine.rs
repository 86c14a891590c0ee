//! Hierarchical state machine ticked once per frame phase.

use super::error::MembershipError;
use super::history::{StateHistory, TransitionRecord};
use super::state::{State, StateKind, TickPhase};
use super::transition::Transition;
use chrono::Utc;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;

/// Transition a machine is currently running, if any.
#[derive(Clone, Debug, Default)]
enum PendingTransition {
    #[default]
    Idle,
    InProgress { transition: Transition, ticks: u32 },
}

impl PendingTransition {
    fn transition(&self) -> Option<&Transition> {
        match self {
            Self::Idle => None,
            Self::InProgress { transition, .. } => Some(transition),
        }
    }

    fn ticks(&self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::InProgress { ticks, .. } => *ticks,
        }
    }

    /// Count one poll of the completion callback. A callback may keep a
    /// transition pending forever, so the count saturates.
    fn record_poll(&mut self) {
        if let Self::InProgress { ticks, .. } = self {
            *ticks = ticks.saturating_add(1);
        }
    }
}

/// Machine-only data carried by a composite state node.
pub(crate) struct MachineCore {
    states: RefCell<Vec<State>>,
    default_state: RefCell<Option<State>>,
    current: RefCell<Option<State>>,
    any_state: RefCell<Vec<Transition>>,
    pending: RefCell<PendingTransition>,
    history: RefCell<StateHistory>,
}

impl MachineCore {
    fn new() -> Self {
        Self {
            states: RefCell::new(Vec::new()),
            default_state: RefCell::new(None),
            current: RefCell::new(None),
            any_state: RefCell::new(Vec::new()),
            pending: RefCell::new(PendingTransition::Idle),
            history: RefCell::new(StateHistory::new()),
        }
    }
}

/// A state that owns child states and runs transitions between them.
///
/// A machine is itself a [`State`] (it derefs to one), so it can be added to
/// another machine to build a hierarchy. Each tick evaluates, in order:
///
/// 1. the completion callback of a transition already in progress (and
///    nothing else),
/// 2. the machine's own state-level notifications,
/// 3. any-state transitions, skipping those targeting the active state,
/// 4. the active state's own transitions,
/// 5. the active state's tick, recursing into nested machines.
///
/// The first transition whose predicate holds starts; its completion callback
/// is polled on that same tick and on every following tick until it reports
/// completion.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{State, StateMachine, Transition};
///
/// let idle = State::new("Idle");
/// let alert = State::new("Alert");
/// let machine = StateMachine::new("Guard", Some(&idle));
/// machine.add_state(&alert);
///
/// let spot = Transition::new("spot", Some(&idle), &alert);
/// spot.when(|| true);
/// idle.add_transition(&spot);
///
/// machine.update(0.016);
/// assert_eq!(machine.current_state(), Some(alert));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StateMachine {
    state: State,
}

impl StateMachine {
    /// Create a machine. A given default state is registered right away.
    pub fn new(name: impl Into<String>, default_state: Option<&State>) -> Self {
        let machine = StateMachine {
            state: State::with_kind(name.into(), StateKind::Composite(MachineCore::new())),
        };
        if let Some(state) = default_state {
            machine.add_state(state);
        }
        machine
    }

    /// Callers must pass a composite state.
    pub(crate) fn from_state(state: State) -> Self {
        debug_assert!(state.is_machine());
        StateMachine { state }
    }

    fn core(&self) -> &MachineCore {
        match &self.state.inner.kind {
            StateKind::Composite(core) => core,
            StateKind::Leaf => unreachable!("StateMachine always wraps a composite state"),
        }
    }

    /// Borrow the machine as its underlying state node.
    pub fn as_state(&self) -> &State {
        &self.state
    }

    /// Unwrap into the underlying state node.
    pub fn into_state(self) -> State {
        self.state
    }

    /// The active child. `None` until the first tick or entry, and for a
    /// machine without states.
    pub fn current_state(&self) -> Option<State> {
        self.core().current.borrow().clone()
    }

    /// The state activated on the first tick or entry.
    pub fn default_state(&self) -> Option<State> {
        self.core().default_state.borrow().clone()
    }

    /// Make `state` the default, registering it first if needed.
    pub fn set_default_state(&self, state: &State) {
        match self.try_add_state(state) {
            Ok(()) | Err(MembershipError::AlreadyMember { .. }) => {
                *self.core().default_state.borrow_mut() = Some(state.clone());
            }
            Err(err) => tracing::warn!("{err}; default state of '{}' unchanged", self.name()),
        }
    }

    /// Member states in insertion order.
    pub fn states(&self) -> Vec<State> {
        self.core().states.borrow().clone()
    }

    /// Whether `state` is a direct member.
    pub fn contains(&self, state: &State) -> bool {
        self.core().states.borrow().contains(state)
    }

    /// Whether `state` is a member of this machine or of any nested machine.
    pub fn contains_recursive(&self, state: &State) -> bool {
        self.states().iter().any(|member| {
            member == state
                || member
                    .as_machine()
                    .is_some_and(|machine| machine.contains_recursive(state))
        })
    }

    /// Register a state. Duplicates, and states that would make this machine
    /// contain itself, are ignored. The first state added becomes the default.
    pub fn add_state(&self, state: &State) {
        match self.try_add_state(state) {
            Ok(()) => {}
            Err(err @ MembershipError::WouldCreateCycle { .. }) => tracing::warn!("{err}"),
            Err(err) => tracing::trace!("{err}"),
        }
    }

    /// Like [`StateMachine::add_state`], reporting why nothing was added.
    pub fn try_add_state(&self, state: &State) -> Result<(), MembershipError> {
        if self.contains(state) {
            return Err(MembershipError::AlreadyMember {
                state: state.name().to_string(),
                machine: self.name().to_string(),
            });
        }
        if self.would_contain_itself(state) {
            return Err(MembershipError::WouldCreateCycle {
                state: state.name().to_string(),
                machine: self.name().to_string(),
            });
        }

        let core = self.core();
        core.states.borrow_mut().push(state.clone());
        state.set_parent(Some(&self.state));

        let mut default_state = core.default_state.borrow_mut();
        if default_state.is_none() {
            *default_state = Some(state.clone());
        }
        tracing::trace!(machine = self.name(), state = state.name(), "state added");
        Ok(())
    }

    fn would_contain_itself(&self, state: &State) -> bool {
        *state == self.state
            || state
                .as_machine()
                .is_some_and(|machine| machine.contains_recursive(&self.state))
    }

    /// Unregister a state. The active state and non-members are ignored.
    /// Removing the default promotes the first remaining member.
    pub fn remove_state(&self, state: &State) {
        if let Err(err) = self.try_remove_state(state) {
            tracing::trace!("{err}");
        }
    }

    /// Like [`StateMachine::remove_state`], reporting why nothing was removed.
    pub fn try_remove_state(&self, state: &State) -> Result<(), MembershipError> {
        let core = self.core();
        if core.current.borrow().as_ref() == Some(state) {
            return Err(MembershipError::ActiveState {
                state: state.name().to_string(),
                machine: self.name().to_string(),
            });
        }

        let position = core
            .states
            .borrow()
            .iter()
            .position(|member| member == state)
            .ok_or_else(|| MembershipError::NotMember {
                state: state.name().to_string(),
                machine: self.name().to_string(),
            })?;

        core.states.borrow_mut().remove(position);
        state.set_parent(None);

        let mut default_state = core.default_state.borrow_mut();
        if default_state.as_ref() == Some(state) {
            *default_state = core.states.borrow().first().cloned();
        }
        tracing::trace!(machine = self.name(), state = state.name(), "state removed");
        Ok(())
    }

    /// Register a transition evaluated from whichever state is active. Its
    /// origin is cleared. Registering it twice is a no-op.
    pub fn add_any_state(&self, transition: &Transition) {
        if let Err(err) = self.try_add_any_state(transition) {
            tracing::trace!("{err}");
        }
    }

    /// Like [`StateMachine::add_any_state`], reporting why nothing was added.
    pub fn try_add_any_state(&self, transition: &Transition) -> Result<(), MembershipError> {
        let core = self.core();
        if core.any_state.borrow().contains(transition) {
            return Err(MembershipError::TransitionAlreadyRegistered {
                transition: transition.name(),
                owner: self.name().to_string(),
            });
        }
        transition.set_from(None);
        core.any_state.borrow_mut().push(transition.clone());
        Ok(())
    }

    /// Any-state transitions in evaluation order.
    pub fn any_state_transitions(&self) -> Vec<Transition> {
        self.core().any_state.borrow().clone()
    }

    /// Find a state by tag: direct members first, in insertion order, then
    /// members of nested machines, depth first. An empty tag matches nothing.
    ///
    /// Earlier releases of this lookup were a stub that always reported no
    /// match. Callers relying on `None` now receive the tagged state.
    pub fn get_state_with_tag(&self, tag: &str) -> Option<State> {
        if tag.is_empty() {
            return None;
        }
        let states = self.states();
        states.iter().find(|state| state.has_tag(tag)).cloned().or_else(|| {
            states
                .iter()
                .filter_map(State::as_machine)
                .find_map(|machine| machine.get_state_with_tag(tag))
        })
    }

    /// Whether a transition is waiting on its completion callback.
    pub fn is_transitioning(&self) -> bool {
        self.core().pending.borrow().transition().is_some()
    }

    /// The transition waiting on its completion callback.
    pub fn active_transition(&self) -> Option<Transition> {
        self.core().pending.borrow().transition().cloned()
    }

    /// Snapshot of the transitions this machine executed.
    pub fn history(&self) -> StateHistory {
        self.core().history.borrow().clone()
    }

    /// Bound the history, dropping the oldest records beyond `limit`.
    pub fn set_history_limit(&self, limit: usize) {
        self.core().history.borrow_mut().set_limit(limit);
    }

    /// Host entry point for the frame update.
    pub fn update(&self, delta_time: f32) {
        self.tick(TickPhase::Update(delta_time));
    }

    /// Host entry point for the post-update pass.
    pub fn late_update(&self, delta_time: f32) {
        self.tick(TickPhase::LateUpdate(delta_time));
    }

    /// Host entry point for the fixed-rate step.
    pub fn fixed_update(&self) {
        self.tick(TickPhase::FixedUpdate);
    }

    /// Run one tick phase through the evaluation order described on
    /// [`StateMachine`].
    pub fn tick(&self, phase: TickPhase) {
        let pending = self.active_transition();
        if let Some(transition) = pending {
            self.advance(&transition);
            return;
        }

        self.state.base_tick(phase);

        let Some(current) = self.resolve_current() else {
            tracing::trace!(machine = self.name(), phase = phase.label(), "no states to tick");
            return;
        };

        if let Some(transition) = self.select_transition(&current) {
            self.begin(transition);
            return;
        }

        current.tick(phase);
    }

    /// Enter the machine and its active child, falling back to the default
    /// when no child has been active yet.
    pub fn enter_callback(&self, previous: Option<&State>) {
        self.state.base_enter(previous);
        if let Some(current) = self.resolve_current() {
            current.enter_callback(previous);
        }
    }

    /// Exit the machine and its active child.
    pub fn exit_callback(&self, next: &State) {
        self.state.base_exit(next);
        if let Some(current) = self.current_state() {
            current.exit_callback(next);
        }
    }

    fn resolve_current(&self) -> Option<State> {
        let core = self.core();
        let mut current = core.current.borrow_mut();
        if current.is_none() {
            *current = core.default_state.borrow().clone();
        }
        current.clone()
    }

    fn select_transition(&self, current: &State) -> Option<Transition> {
        let interrupt = self.any_state_transitions().into_iter().find(|transition| {
            transition.to().is_some()
                && !transition.targets(current)
                && transition.should_begin()
        });

        interrupt.or_else(|| {
            current
                .transitions()
                .into_iter()
                .find(|transition| transition.to().is_some() && transition.should_begin())
        })
    }

    fn begin(&self, transition: Transition) {
        tracing::debug!(
            machine = self.name(),
            transition = %transition.name(),
            "transition started"
        );
        *self.core().pending.borrow_mut() = PendingTransition::InProgress {
            transition: transition.clone(),
            ticks: 0,
        };
        self.advance(&transition);
    }

    fn advance(&self, transition: &Transition) {
        let core = self.core();
        core.pending.borrow_mut().record_poll();
        if !transition.transition_callback() {
            return;
        }

        let ticks = core.pending.borrow().ticks();
        match transition.to() {
            Some(target) if self.would_contain_itself(&target) => tracing::warn!(
                machine = self.name(),
                transition = %transition.name(),
                target = target.name(),
                "transition abandoned: target contains this machine"
            ),
            Some(target) => self.do_transition(transition, &target, ticks),
            None => tracing::debug!(
                machine = self.name(),
                transition = %transition.name(),
                "transition abandoned: target dropped"
            ),
        }
        *core.pending.borrow_mut() = PendingTransition::Idle;
    }

    fn do_transition(&self, transition: &Transition, target: &State, ticks: u32) {
        let core = self.core();
        let exited = self.current_state();
        if let Some(exited) = &exited {
            exited.exit_callback(target);
        }
        *core.current.borrow_mut() = Some(target.clone());

        core.history.borrow_mut().record(TransitionRecord {
            transition: transition.name(),
            from: exited.as_ref().map(|state| state.name().to_string()),
            to: target.name().to_string(),
            timestamp: Utc::now(),
            ticks,
        });
        tracing::debug!(
            machine = self.name(),
            transition = %transition.name(),
            from = exited.as_ref().map(State::name),
            to = target.name(),
            ticks,
            "transition completed"
        );

        let previous = transition.from().or(exited);
        target.enter_callback(previous.as_ref());
    }
}

impl Deref for StateMachine {
    type Target = State;

    fn deref(&self) -> &State {
        &self.state
    }
}

impl AsRef<State> for StateMachine {
    fn as_ref(&self) -> &State {
        &self.state
    }
}

impl From<StateMachine> for State {
    fn from(machine: StateMachine) -> Self {
        machine.state
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |states: Vec<State>| -> Vec<String> {
            states.iter().map(|s| s.name().to_string()).collect()
        };
        f.debug_struct("StateMachine")
            .field("name", &self.name())
            .field("current", &self.current_state().map(|s| s.name().to_string()))
            .field("default", &self.default_state().map(|s| s.name().to_string()))
            .field("states", &names(self.states()))
            .field("transitioning", &self.is_transitioning())
            .finish()
    }
}
