//! Media backend contract
//!
//! A `MediaBackend` is whatever actually renders one audio source (a browser
//! audio element, a device stream, a wall clock in tests). It is driven by
//! `LinePlayer` and reports back through `MediaEvent`s, which its host feeds
//! into the owning player or `Sequencer`.

use crate::error::Result;

/// One underlying playable audio source
pub trait MediaBackend {
    /// Bind a new source, discarding the previous one
    fn load(&mut self, source: &str);

    /// Start or resume playback from the current position
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Move the playhead (seconds)
    fn set_position(&mut self, seconds: f64);

    /// Current playhead (seconds)
    fn position(&self) -> f64;

    /// Source duration in seconds, `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;
}

/// Notifications emitted by a media backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Source metadata available
    MetadataLoaded { duration: f64 },

    /// Playhead moved during playback
    TimeUpdate { position: f64 },

    /// Playback reached the end of the source
    Ended,
}
