//! Single-line audio player
//!
//! Wraps exactly one bound audio source and reports every state transition as
//! a `PlayerStatus` to its owner.

use super::media::{MediaBackend, MediaEvent};
use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Snapshot reported to the owner after every transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStatus {
    pub is_playing: bool,

    /// Playhead in seconds
    pub current_time: f64,

    /// Duration in seconds; 0 until the source metadata loads
    pub duration: f64,
}

/// Outcome of feeding a media event into the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerNotice {
    /// Ordinary status change (metadata, time update)
    StateChanged(PlayerStatus),

    /// The source played to its end; the player is now paused at 0
    Ended(PlayerStatus),
}

/// Player bound to one audio source
pub struct LinePlayer<B> {
    backend: B,
    source: String,
    is_playing: bool,
    current_time: f64,
    duration: f64,
}

impl<B: MediaBackend> LinePlayer<B> {
    pub fn new(mut backend: B, source: impl Into<String>) -> Self {
        let source = source.into();
        backend.load(&source);
        let duration = known_duration(&backend);

        Self {
            backend,
            source,
            is_playing: false,
            current_time: 0.0,
            duration,
        }
    }

    /// Begin playback from the current position.
    ///
    /// On failure the player stays stopped and `Error::Playback` is returned.
    pub fn play(&mut self) -> Result<PlayerStatus> {
        match self.backend.play() {
            Ok(()) => {
                self.is_playing = true;
                debug!("Playing {}", self.source);
                Ok(self.status())
            }
            Err(e) => {
                self.backend.pause();
                self.is_playing = false;
                warn!("Failed to start {}: {}", self.source, e);
                Err(match e {
                    Error::Playback(_) => e,
                    other => Error::Playback(format!("{}: {}", self.source, other)),
                })
            }
        }
    }

    /// Halt playback, keeping the position
    pub fn pause(&mut self) -> PlayerStatus {
        self.backend.pause();
        self.is_playing = false;
        self.current_time = self.backend.position();
        self.status()
    }

    /// Move the playhead, clamped to `[0, duration]`
    pub fn seek(&mut self, seconds: f64) -> PlayerStatus {
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.duration)
        };
        self.backend.set_position(target);
        self.current_time = target;
        self.status()
    }

    /// Force the position to 0 without starting or stopping playback
    pub fn reset(&mut self) -> PlayerStatus {
        self.backend.set_position(0.0);
        self.current_time = 0.0;
        self.status()
    }

    /// Bind a different source. Any playback of the previous one is stopped.
    pub fn rebind(&mut self, source: impl Into<String>) -> PlayerStatus {
        if self.is_playing {
            self.backend.pause();
            self.is_playing = false;
        }

        self.source = source.into();
        self.backend.load(&self.source);
        self.current_time = 0.0;
        self.duration = known_duration(&self.backend);
        self.status()
    }

    /// Apply a backend notification.
    ///
    /// `Ended` is handled as a pause at end of track followed by a reset to 0.
    pub fn handle_media_event(&mut self, event: MediaEvent) -> PlayerNotice {
        match event {
            MediaEvent::MetadataLoaded { duration } => {
                if duration.is_finite() && duration >= 0.0 {
                    self.duration = duration;
                }
                PlayerNotice::StateChanged(self.status())
            }
            MediaEvent::TimeUpdate { position } => {
                self.current_time = position.max(0.0);
                PlayerNotice::StateChanged(self.status())
            }
            MediaEvent::Ended => {
                self.backend.pause();
                self.is_playing = false;
                self.backend.set_position(0.0);
                self.current_time = 0.0;
                debug!("Finished {}", self.source);
                PlayerNotice::Ended(self.status())
            }
        }
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.duration,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// URL or path of the bound source
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

fn known_duration<B: MediaBackend>(backend: &B) -> f64 {
    backend
        .duration()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}
