//! In-memory WAV fixture generation
//!
//! Produces deterministic 16-bit PCM WAV files with known shape, so decoded
//! frame counts and sample values can be asserted exactly.

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;

fn spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// WAV holding `frames` frames where every sample equals `value`
pub fn constant_wav(channels: u16, sample_rate: u32, frames: usize, value: i16) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec(channels, sample_rate)).unwrap();
        for _ in 0..frames * channels as usize {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Silent WAV of the given duration
pub fn silent_wav(channels: u16, sample_rate: u32, duration_ms: u64) -> Vec<u8> {
    let frames = (sample_rate as u64 * duration_ms / 1000) as usize;
    constant_wav(channels, sample_rate, frames, 0)
}

/// Sine wave WAV, same signal on every channel
pub fn sine_wav(
    channels: u16,
    sample_rate: u32,
    duration_ms: u64,
    frequency_hz: f32,
    amplitude: f32,
) -> Vec<u8> {
    let frames = (sample_rate as u64 * duration_ms / 1000) as usize;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec(channels, sample_rate)).unwrap();
        for frame in 0..frames {
            let t = frame as f32 / sample_rate as f32;
            let sample = ((2.0 * PI * frequency_hz * t).sin() * amplitude * 32767.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Read a WAV file back: (channels, sample rate, interleaved samples)
pub fn read_wav(bytes: &[u8]) -> (u16, u32, Vec<i16>) {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec.channels, spec.sample_rate, samples)
}
