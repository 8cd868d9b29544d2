//! Runtime errors raised by the state machine.

use thiserror::Error;

/// Errors returned by [`StateMachine`](super::StateMachine) operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State '{name}' is already registered")]
    DuplicateState { name: String },

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },
}
