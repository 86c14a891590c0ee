//! Core state machine types and the per-tick evaluation algorithm.
//!
//! This module contains:
//! - [`State`] handles with lifecycle notifications
//! - [`Transition`]s gated by [`Guard`] predicates
//! - [`StateMachine`], a state that runs other states and can be nested
//! - Bounded [`StateHistory`] of executed transitions
//!
//! Everything here is single-threaded: handles are reference counted and
//! ticked synchronously by the host.

mod error;
mod guard;
mod history;
mod machine;
mod observer;
mod state;
mod transition;

pub use error::MembershipError;
pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use machine::StateMachine;
pub use state::{State, TickPhase, WeakState};
pub use transition::{Transition, TransitionAction};
