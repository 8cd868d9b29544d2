//! Core State trait for named machine states.
//!
//! A state is identified by a unique name. The machine keys its catalog by
//! state value, so states must be hashable and comparable.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine state identifiers.
///
/// All methods are pure. A state value names a node of the flow; the
/// behavior attached to it lives in a [`StateDefinition`](crate::machine::StateDefinition).
///
/// # Required Traits
///
/// - `Clone`: names are copied into history records and transitions
/// - `Eq` + `Hash`: the machine looks definitions up by name
/// - `Debug`: names appear in diagnostics
/// - `Serialize` + `Deserialize`: names appear in configs and snapshots
///
/// # Example
///
/// ```rust
/// use walkguide::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Closed,
///     Open,
///     Removed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///             Self::Removed => "Removed",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Removed)
///     }
/// }
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Unique display name, used in errors and log fields.
    fn name(&self) -> &str;

    /// Check if this is a terminal state.
    ///
    /// Terminal states register no transitions; signals sent while in one
    /// are dropped. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
