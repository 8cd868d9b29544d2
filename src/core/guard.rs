//! Guard predicates over signals.
//!
//! Guards are pure boolean functions deciding whether a transition accepts
//! a signal. They never perform side effects; those belong to a
//! transition's execution action or to the next state's enter hook.

use std::fmt;

/// Pure predicate that decides whether a transition accepts a signal.
///
/// # Example
///
/// ```rust
/// use walkguide::core::Guard;
///
/// let only_go = Guard::new(|signal: &&str| *signal == "go");
///
/// assert!(only_go.check(&"go"));
/// assert!(!only_go.check(&"stop"));
/// ```
pub struct Guard<G> {
    predicate: Box<dyn Fn(&G) -> bool + Send + Sync>,
}

impl<G> Guard<G> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&G) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that accepts exactly one signal value.
    ///
    /// ```rust
    /// use walkguide::core::Guard;
    ///
    /// let guard = Guard::matching(7u8);
    /// assert!(guard.check(&7));
    /// assert!(!guard.check(&8));
    /// ```
    pub fn matching(expected: G) -> Self
    where
        G: PartialEq + Send + Sync + 'static,
    {
        Self::new(move |signal: &G| *signal == expected)
    }

    /// Check whether the guard accepts `signal`.
    pub fn check(&self, signal: &G) -> bool {
        (self.predicate)(signal)
    }
}

impl<G> fmt::Debug for Guard<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
