//! Build errors for state machine and transition builders.

use crate::core::MembershipError;
use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition name not specified. Call .name(name) before .build()")]
    MissingName,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error(transparent)]
    Membership(#[from] MembershipError),
}
