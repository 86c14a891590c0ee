//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::core::{Guard, State, Transition, TransitionAction};
use std::rc::Rc;

/// Builder for constructing transitions with a fluent API.
///
/// Leaving out `.from(..)` builds an any-state transition.
#[derive(Default)]
pub struct TransitionBuilder {
    name: Option<String>,
    from: Option<State>,
    to: Option<State>,
    guard: Option<Guard>,
    action: Option<TransitionAction>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transition name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the source state (optional).
    pub fn from(mut self, state: &State) -> Self {
        self.from = Some(state.clone());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: &State) -> Self {
        self.to = Some(state.clone());
        self
    }

    /// Add a start guard (optional). Without one the transition never starts.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a start guard using a closure (optional).
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Set the completion callback (optional). Without one the transition
    /// completes on the tick it starts.
    pub fn on_transition<F>(mut self, callback: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.action = Some(Rc::new(callback));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(BuildError::MissingName)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let transition = Transition::new(name, self.from.as_ref(), &to);
        if let Some(guard) = self.guard {
            transition.set_guard(guard);
        }
        if let Some(action) = self.action {
            transition.set_action(action);
        }
        Ok(transition)
    }
}
