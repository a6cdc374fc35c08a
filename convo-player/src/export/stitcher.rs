//! Sample-level concatenation of decoded lines
//!
//! Buffers are first brought to a common format (highest sample rate, highest
//! channel count seen), then copied end to end per channel with no gaps.

use crate::audio::{PcmBuffer, Resampler};
use crate::error::{Error, Result};
use tracing::debug;

/// Highest sample rate and channel count among `buffers`
pub fn target_format(buffers: &[PcmBuffer]) -> Option<(u32, u16)> {
    let rate = buffers.iter().map(|b| b.sample_rate).max()?;
    let channels = buffers.iter().map(PcmBuffer::channel_count).max()?;
    Some((rate, channels))
}

/// Resample and upmix every buffer to the common target format
pub fn normalize_formats(buffers: Vec<PcmBuffer>) -> Result<Vec<PcmBuffer>> {
    let Some((rate, channels)) = target_format(&buffers) else {
        return Ok(buffers);
    };

    buffers
        .into_iter()
        .map(|buffer| {
            let buffer = if buffer.sample_rate != rate {
                Resampler::resample(&buffer, rate)?
            } else {
                buffer
            };
            upmix(buffer, channels)
        })
        .collect()
}

/// Repeat a buffer's channels cyclically up to `channels` (mono fills all)
fn upmix(buffer: PcmBuffer, channels: u16) -> Result<PcmBuffer> {
    let source_channels = buffer.channels.len();
    if source_channels == channels as usize {
        return Ok(buffer);
    }
    if source_channels == 0 {
        return Err(Error::Decode("decoded line has no channels".to_string()));
    }

    debug!("Upmixing {} -> {} channels", source_channels, channels);
    let upmixed = (0..channels as usize)
        .map(|c| buffer.channels[c % source_channels].clone())
        .collect();
    Ok(PcmBuffer::new(upmixed, buffer.sample_rate))
}

/// Concatenate buffers that already share one format.
///
/// Each buffer lands at the frame offset where the previous one ended.
pub fn concatenate(buffers: &[PcmBuffer]) -> Result<PcmBuffer> {
    let first = buffers.first().ok_or(Error::EmptySequence)?;
    let sample_rate = first.sample_rate;
    let channels = first.channels.len();

    if let Some(odd) = buffers
        .iter()
        .find(|b| b.sample_rate != sample_rate || b.channels.len() != channels)
    {
        return Err(Error::Internal(format!(
            "cannot concatenate {}ch@{}Hz with {}ch@{}Hz",
            odd.channels.len(),
            odd.sample_rate,
            channels,
            sample_rate
        )));
    }

    let total_frames: usize = buffers.iter().map(PcmBuffer::frames).sum();
    let mut output = vec![vec![0.0f32; total_frames]; channels];

    let mut offset = 0;
    for buffer in buffers {
        let frames = buffer.frames();
        for (target, source) in output.iter_mut().zip(&buffer.channels) {
            target[offset..offset + frames].copy_from_slice(source);
        }
        offset += frames;
    }

    debug!(
        "Concatenated {} buffers: {} frames, {} channels @ {}Hz",
        buffers.len(),
        total_frames,
        channels,
        sample_rate
    );

    Ok(PcmBuffer::new(output, sample_rate))
}

/// Normalize then concatenate
pub fn stitch(buffers: Vec<PcmBuffer>) -> Result<PcmBuffer> {
    let normalized = normalize_formats(buffers)?;
    concatenate(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenate_preserves_channel_separation() {
        let a = PcmBuffer::new(vec![vec![0.1, 0.2], vec![-0.1, -0.2]], 8000);
        let b = PcmBuffer::new(vec![vec![0.3], vec![-0.3]], 8000);

        let out = concatenate(&[a, b]).unwrap();
        assert_eq!(out.channels[0], vec![0.1, 0.2, 0.3]);
        assert_eq!(out.channels[1], vec![-0.1, -0.2, -0.3]);
        assert_eq!(out.sample_rate, 8000);
    }

    #[test]
    fn test_concatenate_empty_is_error() {
        assert!(matches!(concatenate(&[]), Err(Error::EmptySequence)));
    }

    #[test]
    fn test_concatenate_rejects_mixed_formats() {
        let a = PcmBuffer::silent(1, 10, 8000);
        let b = PcmBuffer::silent(2, 10, 8000);
        assert!(matches!(concatenate(&[a, b]), Err(Error::Internal(_))));
    }

    #[test]
    fn test_mono_upmixed_to_stereo() {
        let mono = PcmBuffer::new(vec![vec![0.5, -0.5]], 8000);
        let stereo = PcmBuffer::new(vec![vec![0.1], vec![0.2]], 8000);

        let out = stitch(vec![mono, stereo]).unwrap();
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.channels[0], vec![0.5, -0.5, 0.1]);
        assert_eq!(out.channels[1], vec![0.5, -0.5, 0.2]);
    }

    #[test]
    fn test_lower_rate_resampled_to_highest() {
        let low = PcmBuffer::silent(1, 22050, 22050);
        let high = PcmBuffer::silent(1, 44100, 44100);

        assert_eq!(target_format(&[low.clone(), high.clone()]), Some((44100, 1)));

        let out = stitch(vec![low, high]).unwrap();
        assert_eq!(out.sample_rate, 44100);
        assert_eq!(out.frames(), 88200);
        assert!((out.duration_seconds() - 2.0).abs() < 1.0 / 44100.0);
    }
}
