//! State entry history tracking.
//!
//! Every time the machine enters a state, whether forced from outside or
//! reached through a transition, an immutable record is appended.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a state was entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryCause {
    /// `enter_state` called directly (first entry or external override)
    Forced,
    /// A transition of the previous state accepted a signal
    Signal,
}

/// Record of a single state entry.
///
/// # Example
///
/// ```rust
/// use walkguide::core::{EntryCause, StateEntry};
/// use walkguide::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Lamp { Off, On }
/// }
///
/// let entry = StateEntry {
///     from: Some(Lamp::Off),
///     to: Lamp::On,
///     cause: EntryCause::Signal,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(entry.to, Lamp::On);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateEntry<S: State> {
    /// The state that was current before the entry, if any
    pub from: Option<S>,
    /// The state that was entered
    pub to: S,
    /// Whether the entry was forced or signal-driven
    pub cause: EntryCause,
    /// When the entry occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state entries.
///
/// History is immutable - `record` returns a new history with the entry
/// appended.
///
/// # Example
///
/// ```rust
/// use walkguide::core::{EntryCause, StateEntry, StateHistory};
/// use walkguide::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Walk { Start, Middle, End }
/// }
///
/// let history = StateHistory::new()
///     .record(StateEntry { from: None, to: Walk::Start, cause: EntryCause::Forced, timestamp: Utc::now() })
///     .record(StateEntry { from: Some(Walk::Start), to: Walk::Middle, cause: EntryCause::Signal, timestamp: Utc::now() })
///     .record(StateEntry { from: Some(Walk::Middle), to: Walk::End, cause: EntryCause::Signal, timestamp: Utc::now() });
///
/// assert_eq!(history.get_path(), vec![&Walk::Start, &Walk::Middle, &Walk::End]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    entries: Vec<StateEntry<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record an entry, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, entry: StateEntry<S>) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self { entries }
    }

    /// Path of states traversed.
    ///
    /// Starts with the `from` state of the first entry when there was one,
    /// followed by the `to` state of every entry.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(from) = self.entries.first().and_then(|e| e.from.as_ref()) {
            path.push(from);
        }
        for entry in &self.entries {
            path.push(&entry.to);
        }
        path
    }

    /// Number of times `state` was entered.
    pub fn entries_into(&self, state: &S) -> usize {
        self.entries.iter().filter(|e| &e.to == state).count()
    }

    /// Duration between the first and last entry, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.entries.first()?, self.entries.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> &[StateEntry<S>] {
        &self.entries
    }
}
