//! Core state machine types.
//!
//! This module contains the pure pieces of the engine:
//! - State identifiers via the `State` trait
//! - Guard predicates over signals
//! - Immutable entry history

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{EntryCause, StateEntry, StateHistory};
pub use state::State;
