//! Named-state machine driven by signals.

use crate::core::{EntryCause, State, StateEntry, StateHistory};
use crate::machine::definition::StateDefinition;
use crate::machine::error::MachineError;
use chrono::Utc;
use std::collections::HashMap;
use std::fmt::Debug;

/// Domain-agnostic state machine.
///
/// States are registered once and never removed; only the current pointer
/// moves. `S` names states, `G` is the signal type and `C` the context
/// handed to every hook. The machine holds no timers and knows nothing
/// about what the hooks do.
pub struct StateMachine<S: State, G, C> {
    states: HashMap<S, StateDefinition<S, G, C>>,
    order: Vec<S>,
    current: Option<S>,
    history: StateHistory<S>,
}

fn unknown<S: State>(name: &S) -> MachineError {
    MachineError::UnknownState {
        name: name.name().to_string(),
    }
}

impl<S: State + 'static, G: Debug, C: 'static> StateMachine<S, G, C> {
    /// Create an empty machine with no current state.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            order: Vec::new(),
            current: None,
            history: StateHistory::new(),
        }
    }

    /// Register a state. Fails if its name is already registered.
    pub fn add_state(&mut self, definition: StateDefinition<S, G, C>) -> Result<(), MachineError> {
        if self.states.contains_key(&definition.name) {
            return Err(MachineError::DuplicateState {
                name: definition.name.name().to_string(),
            });
        }
        self.order.push(definition.name.clone());
        self.states.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &S) -> bool {
        self.states.contains_key(name)
    }

    /// Registered state names, in registration order.
    pub fn state_names(&self) -> &[S] {
        &self.order
    }

    /// Current state, `None` before the first entry.
    pub fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Check if the machine sits in a terminal state.
    pub fn is_final(&self) -> bool {
        self.current.as_ref().is_some_and(|s| s.is_final())
    }

    /// Entry history.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Make `name` the current state and run its enter hook.
    ///
    /// Valid as the first call and as an external override at any later
    /// time. Unknown names fail and leave the current state unchanged.
    pub fn enter_state(&mut self, name: &S, ctx: &mut C) -> Result<(), MachineError> {
        self.enter(name, EntryCause::Forced, ctx)
    }

    /// Offer `signal` to the current state's transitions.
    ///
    /// The first accepting transition runs its side effect, then its target
    /// is entered. Returns the entered state, or `None` when the signal was
    /// dropped because nothing accepted it.
    pub fn send_signal(&mut self, signal: &G, ctx: &mut C) -> Result<Option<S>, MachineError> {
        let Some(current) = self.current.as_ref() else {
            tracing::trace!(?signal, "signal before first entry dropped");
            return Ok(None);
        };
        let definition = self.states.get(current).ok_or_else(|| unknown(current))?;
        let Some(transition) = definition.find_transition(signal) else {
            tracing::trace!(state = current.name(), ?signal, "signal not accepted");
            return Ok(None);
        };

        // Target is checked before the side effect so a bad edge changes nothing.
        let next = transition.next.clone();
        if !self.states.contains_key(&next) {
            return Err(unknown(&next));
        }
        if let Some(action) = &transition.on_execution {
            action(ctx);
        }

        self.enter(&next, EntryCause::Signal, ctx)?;
        Ok(Some(next))
    }

    fn enter(&mut self, name: &S, cause: EntryCause, ctx: &mut C) -> Result<(), MachineError> {
        let definition = self.states.get(name).ok_or_else(|| unknown(name))?;
        let previous = self.current.replace(name.clone());
        self.history = self.history.record(StateEntry {
            from: previous.clone(),
            to: name.clone(),
            cause,
            timestamp: Utc::now(),
        });
        tracing::debug!(
            state = name.name(),
            previous = previous.as_ref().map(|p| p.name()),
            ?cause,
            "entering state"
        );
        (definition.on_enter)(ctx, previous.as_ref());
        Ok(())
    }
}

impl<S: State + 'static, G: Debug, C: 'static> Default for StateMachine<S, G, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Guard;
    use crate::machine::Transition;
    use crate::state_enum;

    state_enum! {
        enum Phase {
            A,
            B,
            C,
            Missing,
        }
        final: [C]
    }

    type Log = Vec<String>;

    fn record_enter(tag: &'static str) -> impl Fn(&mut Log, Option<&Phase>) {
        move |log: &mut Log, prev: Option<&Phase>| {
            log.push(format!("enter {tag} from {:?}", prev));
        }
    }

    fn machine() -> StateMachine<Phase, Phase, Log> {
        let mut machine = StateMachine::new();
        machine
            .add_state(
                StateDefinition::new(Phase::A)
                    .on_enter(record_enter("A"))
                    .transition(
                        Transition::to(Phase::B)
                            .on_execution(|log: &mut Log| log.push("exit A".to_string())),
                    ),
            )
            .unwrap();
        machine
            .add_state(
                StateDefinition::new(Phase::B)
                    .on_enter(record_enter("B"))
                    .transition(Transition::to(Phase::C)),
            )
            .unwrap();
        machine
            .add_state(StateDefinition::new(Phase::C).on_enter(record_enter("C")))
            .unwrap();
        machine
    }

    #[test]
    fn enter_state_sets_current_and_runs_hook_once() {
        let mut machine = machine();
        let mut log = Log::new();

        machine.enter_state(&Phase::B, &mut log).unwrap();

        assert_eq!(machine.current_state(), Some(&Phase::B));
        assert_eq!(log, vec!["enter B from None"]);
    }

    #[test]
    fn enter_unknown_state_fails_and_keeps_current() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        let err = machine.enter_state(&Phase::Missing, &mut log).unwrap_err();

        assert_eq!(
            err,
            MachineError::UnknownState {
                name: "Missing".to_string()
            }
        );
        assert_eq!(machine.current_state(), Some(&Phase::A));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn duplicate_state_is_rejected() {
        let mut machine = machine();
        let err = machine.add_state(StateDefinition::new(Phase::A)).unwrap_err();
        assert!(matches!(err, MachineError::DuplicateState { name } if name == "A"));
    }

    #[test]
    fn execution_runs_before_next_enter() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        let entered = machine.send_signal(&Phase::B, &mut log).unwrap();

        assert_eq!(entered, Some(Phase::B));
        assert_eq!(log, vec!["enter A from None", "exit A", "enter B from Some(A)"]);
    }

    #[test]
    fn unmatched_signal_is_dropped_without_side_effects() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        let entered = machine.send_signal(&Phase::C, &mut log).unwrap();

        assert_eq!(entered, None);
        assert_eq!(machine.current_state(), Some(&Phase::A));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn signal_before_first_entry_is_dropped() {
        let mut machine = machine();
        let mut log = Log::new();

        assert_eq!(machine.send_signal(&Phase::B, &mut log).unwrap(), None);
        assert!(machine.current_state().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn terminal_state_ignores_all_signals() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.enter_state(&Phase::C, &mut log).unwrap();

        for signal in [Phase::A, Phase::B, Phase::C] {
            assert_eq!(machine.send_signal(&signal, &mut log).unwrap(), None);
        }
        assert!(machine.is_final());
    }

    #[test]
    fn transition_to_unregistered_state_fails_before_side_effect() {
        let mut machine: StateMachine<Phase, Phase, Log> = StateMachine::new();
        machine
            .add_state(
                StateDefinition::new(Phase::A).transition(
                    Transition::to(Phase::Missing)
                        .on_execution(|log: &mut Log| log.push("exit A".to_string())),
                ),
            )
            .unwrap();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        let err = machine.send_signal(&Phase::Missing, &mut log).unwrap_err();

        assert!(matches!(err, MachineError::UnknownState { .. }));
        assert_eq!(machine.current_state(), Some(&Phase::A));
        assert!(log.is_empty());
    }

    #[test]
    fn forced_reentry_is_recorded_in_history() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();
        machine.send_signal(&Phase::B, &mut log).unwrap();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        let causes: Vec<EntryCause> = machine
            .history()
            .entries()
            .iter()
            .map(|e| e.cause)
            .collect();
        assert_eq!(
            causes,
            vec![EntryCause::Forced, EntryCause::Signal, EntryCause::Forced]
        );
        assert_eq!(machine.history().entries_into(&Phase::A), 2);
    }

    #[test]
    fn custom_signal_type_with_guard() {
        let mut machine: StateMachine<Phase, u32, Log> = StateMachine::new();
        machine
            .add_state(
                StateDefinition::new(Phase::A)
                    .transition(Transition::new(Phase::B, Guard::new(|n: &u32| *n > 10))),
            )
            .unwrap();
        machine.add_state(StateDefinition::new(Phase::B)).unwrap();
        let mut log = Log::new();
        machine.enter_state(&Phase::A, &mut log).unwrap();

        assert_eq!(machine.send_signal(&3, &mut log).unwrap(), None);
        assert_eq!(machine.send_signal(&11, &mut log).unwrap(), Some(Phase::B));
    }
}
