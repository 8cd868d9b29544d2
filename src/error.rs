//! Crate-level error type.

use crate::builder::BuildError;
use crate::machine::MachineError;
use thiserror::Error;

/// Errors surfaced by the tutorial flow and its setup.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Machine(#[from] MachineError),

    #[error(transparent)]
    Setup(#[from] BuildError),

    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),
}
