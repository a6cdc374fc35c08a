//! Core audio data types

/// Decoded PCM audio held in RAM, one sample vector per channel.
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - Planar: `channels[c][frame]`, every channel the same length
/// - Sample rate is whatever the source (or the stitch target) uses
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Per-channel sample data
    pub channels: Vec<Vec<f32>>,

    /// Frames per second
    pub sample_rate: u32,
}

impl PcmBuffer {
    /// Create a buffer from planar channel data
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(
            channels.windows(2).all(|w| w[0].len() == w[1].len()),
            "channels must have equal length"
        );
        Self {
            channels,
            sample_rate,
        }
    }

    /// Create a silent buffer of the given shape
    pub fn silent(channel_count: u16, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count as usize],
            sample_rate,
        }
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Get duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames() as u64 * 1000) / self.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}
