//! Setup errors for machines, collaborators and configuration.

use crate::machine::MachineError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single setup problem. Setup checks accumulate every issue they find
/// instead of stopping at the first one.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SetupIssue {
    #[error("No states registered. Add at least one state definition")]
    NoStates,

    #[error("State '{0}' is registered more than once")]
    DuplicateState(String),

    #[error("Transition from '{from}' targets unregistered state '{to}'")]
    UnknownTarget { from: String, to: String },

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("Invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Narration `{cue}` uses track {index} but the {language} table has {available} tracks")]
    TrackOutOfRange {
        cue: &'static str,
        index: usize,
        language: String,
        available: usize,
    },

    #[error(transparent)]
    Machine(#[from] MachineError),
}

/// Accumulated setup failure.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("setup failed with {} issue(s): {}", .issues.len(), join_issues(.issues))]
pub struct BuildError {
    pub issues: Vec<SetupIssue>,
}

fn join_issues(issues: &[SetupIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildError {
    pub fn new(issues: Vec<SetupIssue>) -> Self {
        Self { issues }
    }

    /// Whether any accumulated issue matches `predicate`.
    pub fn has(&self, predicate: impl Fn(&SetupIssue) -> bool) -> bool {
        self.issues.iter().any(predicate)
    }
}

impl From<SetupIssue> for BuildError {
    fn from(issue: SetupIssue) -> Self {
        Self::new(vec![issue])
    }
}

impl From<MachineError> for BuildError {
    fn from(err: MachineError) -> Self {
        SetupIssue::from(err).into()
    }
}

/// Result of a single setup check.
pub type Check = Validation<(), NonEmptyVec<SetupIssue>>;

/// Passing check.
pub fn pass() -> Check {
    Validation::success(())
}

/// Failing check carrying `issue`.
pub fn fail(issue: SetupIssue) -> Check {
    Validation::fail(issue)
}

/// Check that fails with `issue` unless `ok` holds.
pub fn ensure(ok: bool, issue: impl FnOnce() -> SetupIssue) -> Check {
    if ok {
        pass()
    } else {
        fail(issue())
    }
}

/// Combine checks, keeping ALL failures.
pub fn combine(checks: Vec<Check>) -> Result<(), BuildError> {
    match Validation::all_vec(checks).map(|_| ()) {
        Validation::Success(()) => Ok(()),
        Validation::Failure(issues) => Err(BuildError::new(issues.iter().cloned().collect())),
    }
}
