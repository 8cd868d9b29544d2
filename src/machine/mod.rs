//! Signal-gated state machine.
//!
//! A generic named-state engine with no domain knowledge:
//!
//! - **Definitions**: a state name, an enter hook and an ordered list of
//!   guarded transitions
//! - **Signals**: opaque values offered to the current state's transitions
//! - **Context**: an explicit value passed to every hook instead of
//!   captured shared state
//!
//! # Example
//!
//! ```rust
//! use walkguide::machine::{StateDefinition, StateMachine, Transition};
//! use walkguide::state_enum;
//!
//! state_enum! {
//!     enum Door { Closed, Open }
//! }
//!
//! let mut machine: StateMachine<Door, Door, Vec<&'static str>> = StateMachine::new();
//! machine.add_state(
//!     StateDefinition::new(Door::Closed).transition(Transition::to(Door::Open)),
//! ).unwrap();
//! machine.add_state(
//!     StateDefinition::new(Door::Open).on_enter(|log: &mut Vec<&'static str>, _| log.push("opened")),
//! ).unwrap();
//!
//! let mut log = Vec::new();
//! machine.enter_state(&Door::Closed, &mut log).unwrap();
//! machine.send_signal(&Door::Open, &mut log).unwrap();
//!
//! assert_eq!(machine.current_state(), Some(&Door::Open));
//! assert_eq!(log, vec!["opened"]);
//! ```

mod definition;
mod error;
#[allow(clippy::module_inception)]
mod machine;

pub use definition::{EnterHook, StateDefinition, Transition, TransitionAction};
pub use error::MachineError;
pub use machine::StateMachine;
