//! Wall-clock media backend
//!
//! Renders nothing: it advances a playhead over a known duration and emits the
//! same events a real media element would. Used by the headless `play`
//! command, where durations come from decoding each line up front.

use super::media::{MediaBackend, MediaEvent};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Durations in seconds, keyed by source URL
pub type DurationTable = Arc<HashMap<String, f64>>;

pub struct ClockBackend {
    durations: DurationTable,
    source: String,
    duration: Option<f64>,
    position: f64,
    playing: bool,
    metadata_sent: bool,
}

impl ClockBackend {
    pub fn new(durations: DurationTable) -> Self {
        Self {
            durations,
            source: String::new(),
            duration: None,
            position: 0.0,
            playing: false,
            metadata_sent: false,
        }
    }

    /// Move time forward by `elapsed`, returning the events that produces
    pub fn advance(&mut self, elapsed: Duration) -> Vec<MediaEvent> {
        let Some(duration) = self.duration else {
            return Vec::new();
        };
        if !self.playing {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(3);
        if !self.metadata_sent {
            self.metadata_sent = true;
            events.push(MediaEvent::MetadataLoaded { duration });
        }

        self.position += elapsed.as_secs_f64();
        if self.position >= duration {
            self.position = duration;
            self.playing = false;
            events.push(MediaEvent::TimeUpdate {
                position: duration,
            });
            events.push(MediaEvent::Ended);
        } else {
            events.push(MediaEvent::TimeUpdate {
                position: self.position,
            });
        }
        events
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaBackend for ClockBackend {
    fn load(&mut self, source: &str) {
        self.source = source.to_string();
        self.duration = self.durations.get(source).copied();
        self.position = 0.0;
        self.playing = false;
        self.metadata_sent = false;
    }

    fn play(&mut self) -> Result<()> {
        if self.duration.is_none() {
            return Err(Error::Playback(format!("{}: source unavailable", self.source)));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}
