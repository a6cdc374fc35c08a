//! Audio resampling using rubato
//!
//! Brings decoded lines to a common sample rate before they are stitched.

use super::types::PcmBuffer;
use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Frames of edge hold added before and after the input
const EDGE_PAD: usize = 16;

/// Audio resampler using rubato for sample rate conversion.
pub struct Resampler;

impl Resampler {
    /// Resample a buffer to `target_rate`.
    ///
    /// The output holds exactly `round(frames * target_rate / source_rate)`
    /// frames per channel, so stitched durations add up predictably.
    ///
    /// # Notes
    /// If input is already at the target rate, returns a copy without resampling
    pub fn resample(input: &PcmBuffer, target_rate: u32) -> Result<PcmBuffer> {
        if target_rate == 0 || input.sample_rate == 0 {
            return Err(Error::Resample(format!(
                "Invalid sample rates: {}Hz -> {}Hz",
                input.sample_rate, target_rate
            )));
        }

        // If already at target rate, return copy
        if input.sample_rate == target_rate {
            debug!("Sample rate already at {}Hz, skipping resample", target_rate);
            return Ok(input.clone());
        }

        let input_frames = input.frames();
        let channels = input.channel_count();
        let expected_frames = Self::expected_frames(input_frames, input.sample_rate, target_rate);

        if input_frames == 0 || channels == 0 {
            return Ok(PcmBuffer::silent(channels, 0, target_rate));
        }

        debug!(
            "Resampling from {}Hz to {}Hz ({} channels)",
            input.sample_rate, target_rate, channels
        );

        // Hold the edge samples past both ends so the interpolator never
        // sees the zeros rubato primes and flushes with.
        let padded: Vec<Vec<f32>> = input
            .channels
            .iter()
            .map(|channel| edge_padded(channel, EDGE_PAD))
            .collect();
        let padded_frames = input_frames + 2 * EDGE_PAD;

        let mut resampler =
            Self::create_resampler(input.sample_rate, target_rate, channels, padded_frames)?;

        let mut planar_output = resampler
            .process(&padded, None)
            .map_err(|e| Error::Resample(format!("Resampling failed: {}", e)))?;
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| Error::Resample(format!("Resampler flush failed: {}", e)))?;
        for (channel, rest) in planar_output.iter_mut().zip(tail) {
            channel.extend(rest);
        }

        let ratio = target_rate as f64 / input.sample_rate as f64;
        let skip = resampler.output_delay() + (EDGE_PAD as f64 * ratio).round() as usize;

        for (channel, source) in planar_output.iter_mut().zip(&input.channels) {
            let hold = source.last().copied().unwrap_or(0.0);
            channel.drain(..skip.min(channel.len()));
            channel.resize(expected_frames, hold);
        }

        debug!(
            "Resampled {} input frames to {} output frames (delay {})",
            input_frames,
            expected_frames,
            resampler.output_delay()
        );

        Ok(PcmBuffer::new(planar_output, target_rate))
    }

    /// Frame count a buffer of `frames` at `from` Hz has at `to` Hz
    pub fn expected_frames(frames: usize, from: u32, to: u32) -> usize {
        if from == 0 {
            return 0;
        }
        ((frames as f64) * (to as f64) / (from as f64)).round() as usize
    }

    /// Create a rubato resampler.
    ///
    /// Uses FastFixedIn for efficiency (good quality/performance tradeoff).
    /// The whole buffer is processed as a single chunk, then flushed.
    fn create_resampler(
        input_rate: u32,
        output_rate: u32,
        channels: u16,
        chunk_size: usize,
    ) -> Result<FastFixedIn<f32>> {
        let resampler = FastFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            1.0, // max_relative_ratio (no runtime changes)
            PolynomialDegree::Septic,
            chunk_size,
            channels as usize,
        )
        .map_err(|e| Error::Resample(format!("Failed to create resampler: {}", e)))?;

        Ok(resampler)
    }
}

fn edge_padded(channel: &[f32], pad: usize) -> Vec<f32> {
    let first = channel.first().copied().unwrap_or(0.0);
    let last = channel.last().copied().unwrap_or(0.0);
    let mut out = Vec::with_capacity(channel.len() + 2 * pad);
    out.extend(std::iter::repeat(first).take(pad));
    out.extend_from_slice(channel);
    out.extend(std::iter::repeat(last).take(pad));
    out
}
