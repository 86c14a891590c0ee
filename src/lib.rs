//! Statecraft: a hierarchical finite state machine for game entities
//!
//! Machines are ticked by the host once per frame phase (update, late
//! update, fixed update). Each tick checks machine-wide "any-state"
//! transitions first, then the active state's own transitions, and otherwise
//! hands the tick down to the active state. A machine is itself a state, so
//! machines nest.
//!
//! # Core Concepts
//!
//! - **State**: A named node with enter/exit/tick notifications and a timer
//! - **Transition**: A guarded edge that may take several ticks to complete
//! - **StateMachine**: A state that runs member states, possibly nested
//!
//! Handles are `Rc`-based and the library is single-threaded.
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::{any_state_transition, guarded_transition};
//! use statecraft::core::{State, StateMachine};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let idle = State::new("Idle");
//! let walk = State::new("Walk");
//! let dead = State::new("Dead");
//!
//! let player = StateMachine::new("Player", Some(&idle));
//! player.add_state(&walk);
//! player.add_state(&dead);
//!
//! let moving = Rc::new(Cell::new(false));
//! let health = Rc::new(Cell::new(100));
//!
//! idle.add_transition(&guarded_transition("start_walking", &idle, &walk, {
//!     let moving = Rc::clone(&moving);
//!     move || moving.get()
//! }));
//! player.add_any_state(&any_state_transition("die", &dead, {
//!     let health = Rc::clone(&health);
//!     move || health.get() <= 0
//! }));
//!
//! player.update(0.016);
//! assert_eq!(player.current_state(), Some(idle.clone()));
//!
//! moving.set(true);
//! player.update(0.016);
//! assert_eq!(player.current_state(), Some(walk.clone()));
//!
//! health.set(0);
//! player.update(0.016);
//! assert_eq!(player.current_state(), Some(dead));
//! ```

pub mod builder;
pub mod core;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use self::core::{Guard, MembershipError, State, StateMachine, TickPhase, Transition};
