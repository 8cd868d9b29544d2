//! Frame-driven timers tagged with a generation.
//!
//! The host advances time once per frame; due timers are handed out one at
//! a time so the caller decides how much work a frame may do. Every timer
//! carries the [`Generation`] that was live when it was scheduled, which
//! lets callers drop callbacks that belong to a state that was left or
//! re-entered in the meantime.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monotonic token identifying one activation of a state.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// Token for the following activation.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Handle returned by [`Scheduler::schedule`], used to cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub generation: Generation,
    pub due: Duration,
    pub payload: T,
}

#[derive(Debug)]
struct Pending<T> {
    id: u64,
    due: Duration,
    generation: Generation,
    payload: T,
}

/// Single-threaded timer queue driven by [`advance`](Scheduler::advance).
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Time elapsed since the scheduler was created.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Schedule `payload` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, generation: Generation, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now.saturating_add(delay),
            generation,
            payload,
        });
        TimerHandle(id)
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != handle.0);
        self.pending.len() != before
    }

    /// Move time forward by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Remove and return the earliest due timer, if any.
    ///
    /// Timers due at the same instant come out in scheduling order.
    pub fn pop_due(&mut self) -> Option<Fired<T>> {
        let now = self.now;
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(i, _)| i)?;
        let p = self.pending.remove(index);
        Some(Fired {
            handle: TimerHandle(p.id),
            generation: p.generation,
            due: p.due,
            payload: p.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn nothing_fires_before_deadline() {
        let mut timers = Scheduler::new();
        timers.schedule(MS(100), Generation::default(), "a");

        timers.advance(MS(99));
        assert!(timers.pop_due().is_none());

        timers.advance(MS(1));
        assert_eq!(timers.pop_due().map(|f| f.payload), Some("a"));
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn due_timers_come_out_in_deadline_then_schedule_order() {
        let mut timers = Scheduler::new();
        let g = Generation::default();
        timers.schedule(MS(50), g, "late");
        timers.schedule(MS(10), g, "early");
        timers.schedule(MS(10), g, "early-second");

        timers.advance(MS(60));
        let order: Vec<_> = std::iter::from_fn(|| timers.pop_due().map(|f| f.payload)).collect();
        assert_eq!(order, vec!["early", "early-second", "late"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Scheduler::new();
        let handle = timers.schedule(MS(10), Generation::default(), 1);

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        timers.advance(MS(20));
        assert!(timers.pop_due().is_none());
    }

    #[test]
    fn fired_timer_keeps_its_generation() {
        let mut timers = Scheduler::new();
        let first = Generation::default();
        let second = first.next();
        timers.schedule(MS(5), first, ());
        timers.schedule(MS(5), second, ());
        timers.advance(MS(5));

        assert_eq!(timers.pop_due().unwrap().generation, first);
        assert_eq!(timers.pop_due().unwrap().generation, second);
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut timers = Scheduler::new();
        timers.advance(MS(1000));
        timers.schedule(MS(10), Generation::default(), ());

        timers.advance(MS(9));
        assert!(timers.pop_due().is_none());
        timers.advance(MS(1));
        assert_eq!(timers.pop_due().unwrap().due, MS(1010));
    }

    #[test]
    fn generations_increase() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().value(), 1);
    }
}
