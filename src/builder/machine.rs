//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{State, StateMachine, Transition, DEFAULT_HISTORY_LIMIT};

/// Builder for constructing state machines with a fluent API.
///
/// Unlike the machine's own registration methods, which silently ignore
/// duplicates and cycles, `build` reports them.
pub struct StateMachineBuilder {
    name: String,
    states: Vec<State>,
    default_state: Option<State>,
    any_state: Vec<Transition>,
    history_limit: usize,
}

impl StateMachineBuilder {
    /// Create a new builder for a machine called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            default_state: None,
            any_state: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Add a member state. The first one becomes the default unless
    /// `.default_state(..)` says otherwise.
    pub fn state(mut self, state: &State) -> Self {
        self.states.push(state.clone());
        self
    }

    /// Add several member states at once.
    pub fn states<'a>(mut self, states: impl IntoIterator<Item = &'a State>) -> Self {
        self.states.extend(states.into_iter().cloned());
        self
    }

    /// Set the default state, adding it as a member if needed.
    pub fn default_state(mut self, state: &State) -> Self {
        self.default_state = Some(state.clone());
        self
    }

    /// Add a pre-built any-state transition.
    pub fn any_state(mut self, transition: &Transition) -> Self {
        self.any_state.push(transition.clone());
        self
    }

    /// Add an any-state transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn any_state_with(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.any_state.push(transition);
        Ok(self)
    }

    /// Number of executed transitions the machine keeps in its history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        let machine = StateMachine::new(self.name, None);
        for state in &self.states {
            machine.try_add_state(state)?;
        }

        if let Some(default_state) = &self.default_state {
            if !machine.contains(default_state) {
                machine.try_add_state(default_state)?;
            }
            machine.set_default_state(default_state);
        }

        for transition in &self.any_state {
            machine.try_add_any_state(transition)?;
        }

        machine.set_history_limit(self.history_limit);
        Ok(machine)
    }
}
