//! Staggered scale-in of the follow signs.

use std::time::Duration;

/// Bounce easing: overshoots toward 1 in shrinking hops. Input is clamped
/// to [0, 1].
pub fn ease_out_bounce(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Scale animation for `count` signs, each starting `stagger` after the
/// previous one and lasting `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignReveal {
    started: Duration,
    count: usize,
    stagger: Duration,
    duration: Duration,
}

impl SignReveal {
    /// Reveal starting at session time `started`.
    pub fn new(started: Duration, count: usize, stagger: Duration, duration: Duration) -> Self {
        Self {
            started,
            count,
            stagger,
            duration,
        }
    }

    /// Start of sign `index`. Saturates instead of overflowing for
    /// out-of-range indices.
    fn start_of(&self, index: usize) -> Duration {
        let offset = u32::try_from(index)
            .ok()
            .and_then(|i| self.stagger.checked_mul(i))
            .unwrap_or(Duration::MAX);
        self.started.saturating_add(offset)
    }

    /// Scale of sign `index` at `now`, from 0 (hidden) to 1 (landed).
    pub fn scale(&self, index: usize, now: Duration) -> f32 {
        let start = self.start_of(index);
        if now <= start {
            return 0.0;
        }
        let span = self.duration.as_secs_f32().max(f32::EPSILON);
        ease_out_bounce((now - start).as_secs_f32() / span)
    }

    /// (index, scale) for every sign at `now`.
    pub fn scales(&self, now: Duration) -> impl Iterator<Item = (usize, f32)> + '_ {
        (0..self.count).map(move |i| (i, self.scale(i, now)))
    }

    /// Whether every sign has landed by `now`.
    pub fn is_complete(&self, now: Duration) -> bool {
        match self.count.checked_sub(1) {
            Some(last) => now >= self.start_of(last).saturating_add(self.duration),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn bounce_starts_at_zero_and_lands_on_one() {
        assert_eq!(ease_out_bounce(0.0), 0.0);
        assert!((ease_out_bounce(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_out_bounce(2.0) - 1.0).abs() < 1e-6);
        assert_eq!(ease_out_bounce(-1.0), 0.0);
    }

    #[test]
    fn bounce_stays_in_unit_range() {
        for i in 0..=100 {
            let v = ease_out_bounce(i as f32 / 100.0);
            assert!((0.0..=1.0 + 1e-6).contains(&v), "{i}: {v}");
        }
    }

    #[test]
    fn signs_start_staggered() {
        let reveal = SignReveal::new(MS(1000), 3, MS(100), MS(400));

        let at = |ms| reveal.scales(MS(ms)).map(|(_, s)| s > 0.0).collect::<Vec<_>>();
        assert_eq!(at(1000), vec![false, false, false]);
        assert_eq!(at(1050), vec![true, false, false]);
        assert_eq!(at(1150), vec![true, true, false]);
        assert_eq!(at(1250), vec![true, true, true]);
    }

    #[test]
    fn completes_when_last_sign_lands() {
        let reveal = SignReveal::new(MS(0), 3, MS(100), MS(400));
        assert!(!reveal.is_complete(MS(599)));
        assert!(reveal.is_complete(MS(600)));
        assert!((reveal.scale(2, MS(600)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn huge_stagger_saturates_instead_of_overflowing() {
        let reveal = SignReveal::new(MS(1000), 3000, Duration::from_millis(u64::MAX / 2), MS(400));

        assert_eq!(reveal.scale(2999, MS(5000)), 0.0);
        assert!(!reveal.is_complete(MS(5000)));
        assert!(reveal.scales(MS(5000)).skip(1).all(|(_, s)| s == 0.0));
    }

    #[test]
    fn no_signs_is_complete_immediately() {
        assert!(SignReveal::new(MS(0), 0, MS(100), MS(400)).is_complete(MS(0)));
    }
}
