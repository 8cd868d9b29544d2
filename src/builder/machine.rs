//! Builder for constructing validated state machines.

use crate::builder::error::{combine, ensure, BuildError, Check, SetupIssue};
use crate::core::State;
use crate::machine::{StateDefinition, StateMachine};
use std::collections::HashSet;
use std::fmt::Debug;

/// Collects state definitions and validates the whole graph before the
/// machine exists, so wiring mistakes fail at setup instead of at entry.
pub struct StateMachineBuilder<S: State, G, C> {
    definitions: Vec<StateDefinition<S, G, C>>,
}

impl<S: State + 'static, G: Debug, C: 'static> StateMachineBuilder<S, G, C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Add a state definition.
    pub fn state(mut self, definition: StateDefinition<S, G, C>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add multiple state definitions at once.
    pub fn states(mut self, definitions: impl IntoIterator<Item = StateDefinition<S, G, C>>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Validate every definition, reporting all issues together.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut checks: Vec<Check> = Vec::new();
        checks.push(ensure(!self.definitions.is_empty(), || SetupIssue::NoStates));

        let mut seen = HashSet::new();
        for definition in &self.definitions {
            let name = &definition.name;
            checks.push(ensure(seen.insert(name), || {
                SetupIssue::DuplicateState(name.name().to_string())
            }));
        }

        for definition in &self.definitions {
            for transition in &definition.transitions {
                checks.push(ensure(seen.contains(&transition.next), || {
                    SetupIssue::UnknownTarget {
                        from: definition.name.name().to_string(),
                        to: transition.next.name().to_string(),
                    }
                }));
            }
        }

        combine(checks)
    }

    /// Build the state machine. Fails with every issue `validate` finds.
    pub fn build(self) -> Result<StateMachine<S, G, C>, BuildError> {
        self.validate()?;

        let mut machine = StateMachine::new();
        for definition in self.definitions {
            machine.add_state(definition)?;
        }
        Ok(machine)
    }
}

impl<S: State + 'static, G: Debug, C: 'static> Default for StateMachineBuilder<S, G, C> {
    fn default() -> Self {
        Self::new()
    }
}
