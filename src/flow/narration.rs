//! Declarative narration chains.
//!
//! A [`Narration`] is a list of tracks, each followed by an optional pause,
//! plus a continuation run once the last track and its pause are over. The
//! session plays one track at a time and resumes the chain when the audio
//! channel reports the end of playback.

use crate::schedule::Generation;
use std::time::Duration;

/// One track of a chain and the pause after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationStep {
    /// Position in the host track table for the current language
    pub track: usize,
    /// Pause after the track finishes
    pub gap_after: Duration,
}

/// Ordered narration tracks plus a continuation `K` run at the end.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use walkguide::flow::Narration;
///
/// let chain = Narration::new()
///     .track(4, Duration::ZERO)
///     .track(5, Duration::from_secs(4))
///     .track(6, Duration::ZERO)
///     .then("next step");
///
/// assert_eq!(chain.steps().len(), 3);
/// assert_eq!(chain.steps()[1].gap_after, Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration<K> {
    steps: Vec<NarrationStep>,
    then: Option<K>,
}

impl<K> Default for Narration<K> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            then: None,
        }
    }
}

impl<K> Narration<K> {
    /// Empty chain with no continuation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `track`, followed by a pause of `gap_after`.
    pub fn track(mut self, track: usize, gap_after: Duration) -> Self {
        self.steps.push(NarrationStep { track, gap_after });
        self
    }

    /// Play `tracks` with `gap` between consecutive tracks and none after
    /// the last.
    pub fn spaced(tracks: &[usize], gap: Duration) -> Self {
        let last = tracks.len().saturating_sub(1);
        tracks
            .iter()
            .enumerate()
            .fold(Self::new(), |chain, (i, &track)| {
                chain.track(track, if i == last { Duration::ZERO } else { gap })
            })
    }

    /// Set what runs once the last track and its pause are over.
    pub fn then(mut self, continuation: K) -> Self {
        self.then = Some(continuation);
        self
    }

    /// Tracks in playing order.
    pub fn steps(&self) -> &[NarrationStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A narration in progress, owned by one step activation.
#[derive(Debug, Clone)]
pub struct NarrationRun<K> {
    narration: Narration<K>,
    index: usize,
    generation: Generation,
}

impl<K> NarrationRun<K> {
    /// Cursor at the first track of `narration`, owned by `generation`.
    pub fn new(narration: Narration<K>, generation: Generation) -> Self {
        Self {
            narration,
            index: 0,
            generation,
        }
    }

    /// Step activation this run belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Track being played, `None` once exhausted.
    pub fn current(&self) -> Option<NarrationStep> {
        self.narration.steps.get(self.index).copied()
    }

    /// Move past the current track. Returns the next one, or `None` once the
    /// chain is exhausted.
    pub fn advance(&mut self) -> Option<NarrationStep> {
        if self.index < self.narration.steps.len() {
            self.index += 1;
        }
        self.current()
    }

    /// Consume the run, yielding its continuation.
    pub fn finish(self) -> Option<K> {
        self.narration.then
    }
}
