//! Reasons a membership or registration request was ignored.

use thiserror::Error;

/// Why a state or transition registration was a no-op.
///
/// The plain registration methods (`add_state`, `remove_state`,
/// `add_any_state`, `add_transition`) swallow these and leave the machine
/// untouched. Their `try_` counterparts return them to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("State '{state}' is already a member of machine '{machine}'")]
    AlreadyMember { state: String, machine: String },

    #[error("State '{state}' is not a member of machine '{machine}'")]
    NotMember { state: String, machine: String },

    #[error("State '{state}' is active in machine '{machine}' and cannot be removed")]
    ActiveState { state: String, machine: String },

    #[error("Adding state '{state}' to machine '{machine}' would make the machine contain itself")]
    WouldCreateCycle { state: String, machine: String },

    #[error("Transition '{transition}' is already registered on '{owner}'")]
    TransitionAlreadyRegistered { transition: String, owner: String },
}
