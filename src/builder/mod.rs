//! Builder API for validated construction.
//!
//! Wiring mistakes (duplicate names, edges to unregistered states, missing
//! collaborators, bad config values) are configuration errors: they are
//! collected here, all at once, before anything is entered.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::{BuildError, SetupIssue};
pub use machine::StateMachineBuilder;
