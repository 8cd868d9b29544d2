//! Single-owner audio channel.
//!
//! The player is shared by every step, so end-of-playback notifications are
//! only meaningful to whoever started the current track. Each `play` stamps
//! the channel with the caller's generation; `finished` hands that owner back
//! exactly once.

use crate::host::{AudioPlayer, TrackId};
use crate::schedule::Generation;

/// Audio player wrapper that remembers who started the current track.
pub struct AudioChannel {
    player: Box<dyn AudioPlayer>,
    owner: Option<Generation>,
    rate: f32,
}

impl AudioChannel {
    /// Wrap `player`; every track plays at `rate`.
    pub fn new(player: Box<dyn AudioPlayer>, rate: f32) -> Self {
        Self {
            player,
            owner: None,
            rate,
        }
    }

    /// Load and play `track`, making `owner` the channel owner.
    pub fn play(&mut self, track: TrackId, owner: Generation) {
        tracing::debug!(track = track.0, owner = owner.value(), "narration track");
        self.player.set_track(track);
        self.player.play(self.rate);
        self.owner = Some(owner);
    }

    /// Stop playback and drop ownership. Any notification still in flight is
    /// then ignored.
    pub fn release(&mut self) {
        if self.owner.take().is_some() {
            self.player.pause();
        }
    }

    /// Report end of playback. Returns the owner, or `None` if nobody owned
    /// the channel.
    pub fn finished(&mut self) -> Option<Generation> {
        self.owner.take()
    }

    /// Generation currently owning playback.
    pub fn owner(&self) -> Option<Generation> {
        self.owner
    }
}

impl std::fmt::Debug for AudioChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChannel")
            .field("owner", &self.owner)
            .field("rate", &self.rate)
            .finish()
    }
}
