//! 16-bit PCM WAV encoding
//!
//! Layout (little-endian, 44-byte header):
//!
//! | Offset | Field                          |
//! |--------|--------------------------------|
//! | 0      | `"RIFF"`                       |
//! | 4      | `36 + data_len` (u32)          |
//! | 8      | `"WAVE"`                       |
//! | 12     | `"fmt "`                       |
//! | 16     | `16` (u32)                     |
//! | 20     | `1` PCM (u16)                  |
//! | 22     | channels (u16)                 |
//! | 24     | sample rate (u32)              |
//! | 28     | `rate * channels * 2` (u32)    |
//! | 32     | `channels * 2` (u16)           |
//! | 34     | `16` bits per sample (u16)     |
//! | 36     | `"data"`                       |
//! | 40     | `frames * channels * 2` (u32)  |
//! | 44     | interleaved i16 samples        |

use super::types::PcmBuffer;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// Size of the RIFF/fmt/data header preceding the samples
pub const WAV_HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: u32 = 2;

/// Convert a float sample to 16-bit PCM.
///
/// Clamps to [-1, 1], scales by 32767 (positive) or 32768 (negative) and
/// truncates toward zero.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer as a complete WAV file in memory.
///
/// Fails with `Error::Encode` when the buffer has no channels or its data does
/// not fit the 32-bit RIFF size fields.
pub fn encode_wav(buffer: &PcmBuffer) -> Result<Vec<u8>> {
    let channels = buffer.channel_count();
    if channels == 0 {
        return Err(Error::Encode("buffer has no channels".to_string()));
    }

    let frames = buffer.frames();
    let block_align = channels as u32 * BYTES_PER_SAMPLE;
    let data_len = u32::try_from(frames as u64 * block_align as u64)
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or_else(|| {
            Error::Encode(format!(
                "{} frames x {} channels exceeds the WAV size limit",
                frames, channels
            ))
        })?;
    let byte_rate = buffer
        .sample_rate
        .checked_mul(block_align)
        .ok_or_else(|| Error::Encode(format!("sample rate {} too high", buffer.sample_rate)))?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

    // RIFF header
    out.write_all(b"RIFF")?;
    out.write_u32::<LittleEndian>(36 + data_len)?;
    out.write_all(b"WAVE")?;

    // fmt subchunk
    out.write_all(b"fmt ")?;
    out.write_u32::<LittleEndian>(16)?; // Subchunk1Size for PCM
    out.write_u16::<LittleEndian>(1)?; // AudioFormat: PCM
    out.write_u16::<LittleEndian>(channels)?;
    out.write_u32::<LittleEndian>(buffer.sample_rate)?;
    out.write_u32::<LittleEndian>(byte_rate)?;
    out.write_u16::<LittleEndian>(block_align as u16)?;
    out.write_u16::<LittleEndian>(16)?; // BitsPerSample

    // data subchunk
    out.write_all(b"data")?;
    out.write_u32::<LittleEndian>(data_len)?;

    // Frame-major interleave
    for frame in 0..frames {
        for channel in &buffer.channels {
            out.write_i16::<LittleEndian>(sample_to_i16(channel[frame]))?;
        }
    }

    Ok(out)
}
