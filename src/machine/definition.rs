//! State definitions and guarded transitions.

use crate::core::{Guard, State};
use std::fmt;

/// Hook run when a state is entered. Receives the session context and the
/// state that was current before, if any.
pub type EnterHook<S, C> = Box<dyn Fn(&mut C, Option<&S>)>;

/// Side effect run when a transition fires, before the next state is entered.
pub type TransitionAction<C> = Box<dyn Fn(&mut C)>;

/// Guarded edge from its owning state to `next`.
///
/// `G` is the signal type, `C` the context passed to the side effect.
pub struct Transition<S: State, G, C> {
    pub next: S,
    pub guard: Guard<G>,
    pub on_execution: Option<TransitionAction<C>>,
}

impl<S: State, G, C> Transition<S, G, C> {
    /// Transition to `next` whenever `guard` accepts the signal.
    pub fn new(next: S, guard: Guard<G>) -> Self {
        Self {
            next,
            guard,
            on_execution: None,
        }
    }

    /// Attach the side effect run when this transition fires.
    pub fn on_execution<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut C) + 'static,
    {
        self.on_execution = Some(Box::new(action));
        self
    }

    /// Check whether this transition accepts `signal` (pure).
    pub fn accepts(&self, signal: &G) -> bool {
        self.guard.check(signal)
    }
}

impl<S: State + 'static, C> Transition<S, S, C> {
    /// Transition that fires only on the signal equal to its own target.
    ///
    /// This is the usual wiring when signals are state names.
    pub fn to(next: S) -> Self {
        let guard = Guard::matching(next.clone());
        Self::new(next, guard)
    }
}

impl<S: State, G, C> fmt::Debug for Transition<S, G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("next", &self.next)
            .field("has_action", &self.on_execution.is_some())
            .finish()
    }
}

fn ignore_entry<S, C>(_: &mut C, _: Option<&S>) {}

/// A named state: its enter hook and its ordered transition list.
pub struct StateDefinition<S: State, G, C> {
    pub name: S,
    pub on_enter: EnterHook<S, C>,
    pub transitions: Vec<Transition<S, G, C>>,
}

impl<S: State + 'static, G, C: 'static> StateDefinition<S, G, C> {
    /// Definition with a no-op enter hook and no transitions.
    pub fn new(name: S) -> Self {
        Self {
            name,
            on_enter: Box::new(ignore_entry::<S, C>),
            transitions: Vec::new(),
        }
    }

    /// Set the enter hook.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, Option<&S>) + 'static,
    {
        self.on_enter = Box::new(hook);
        self
    }

    /// Append a transition. Earlier transitions win when several accept.
    pub fn transition(mut self, transition: Transition<S, G, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// First transition, in registration order, accepting `signal`.
    pub fn find_transition(&self, signal: &G) -> Option<&Transition<S, G, C>> {
        self.transitions.iter().find(|t| t.accepts(signal))
    }
}

impl<S: State, G, C> fmt::Debug for StateDefinition<S, G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDefinition")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}
