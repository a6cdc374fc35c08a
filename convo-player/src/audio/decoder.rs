//! Audio decoder using symphonia
//!
//! Decodes an in-memory audio resource (MP3, FLAC, AAC, Vorbis, WAV) to planar
//! f32 PCM at its native sample rate and channel count.

use super::types::PcmBuffer;
use crate::error::{Error, Result};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

/// Simple whole-resource audio decoder.
pub struct SimpleDecoder;

impl SimpleDecoder {
    /// Decode an entire audio resource held in memory.
    ///
    /// `name` is only used for the container hint (its extension) and for
    /// error messages.
    ///
    /// # Errors
    /// - Unrecognised container
    /// - No decodable audio track / unsupported codec
    /// - Stream yields no audio frames
    pub fn decode_bytes(bytes: Vec<u8>, name: &str) -> Result<PcmBuffer> {
        debug!("Decoding {} ({} bytes)", name, bytes.len());

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::Decode(format!("{}: failed to probe format: {}", name, e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode(format!("{}: no audio track found", name)))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("{}: failed to create decoder: {}", name, e)))?;

        let mut sample_rate = codec_params.sample_rate;
        let mut channels: Vec<Vec<f32>> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("{}: stream reset required, stopping decode", name);
                    break;
                }
                Err(e) => {
                    warn!("{}: error reading packet: {}", name, e);
                    break;
                }
            };

            // Skip packets for other tracks
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    // The decoded spec is authoritative over container metadata
                    sample_rate = Some(decoded.spec().rate);
                    Self::append_planar(&decoded, &mut channels);
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("{}: skipping corrupt packet: {}", name, e);
                    continue;
                }
                Err(e) => {
                    return Err(Error::Decode(format!("{}: {}", name, e)));
                }
            }
        }

        let sample_rate = sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| Error::Decode(format!("{}: sample rate not found", name)))?;

        let buffer = PcmBuffer::new(channels, sample_rate);
        if buffer.is_empty() {
            return Err(Error::Decode(format!("{}: no audio frames decoded", name)));
        }

        debug!(
            "Decoded {}: {} frames, {} channels @ {}Hz",
            name,
            buffer.frames(),
            buffer.channel_count(),
            sample_rate
        );

        Ok(buffer)
    }

    /// Append a decoded packet to the per-channel output, converting to f32.
    fn append_planar(decoded: &AudioBufferRef, output: &mut Vec<Vec<f32>>) {
        match decoded {
            AudioBufferRef::U8(buf) => Self::append_typed(buf, output),
            AudioBufferRef::U16(buf) => Self::append_typed(buf, output),
            AudioBufferRef::U24(buf) => Self::append_typed(buf, output),
            AudioBufferRef::U32(buf) => Self::append_typed(buf, output),
            AudioBufferRef::S8(buf) => Self::append_typed(buf, output),
            AudioBufferRef::S16(buf) => Self::append_typed(buf, output),
            AudioBufferRef::S24(buf) => Self::append_typed(buf, output),
            AudioBufferRef::S32(buf) => Self::append_typed(buf, output),
            AudioBufferRef::F32(buf) => Self::append_typed(buf, output),
            AudioBufferRef::F64(buf) => Self::append_typed(buf, output),
        }
    }

    fn append_typed<S>(buf: &AudioBuffer<S>, output: &mut Vec<Vec<f32>>)
    where
        S: Sample,
        f32: FromSample<S>,
    {
        let num_channels = buf.spec().channels.count();
        let num_frames = buf.frames();

        if output.is_empty() {
            output.resize_with(num_channels, Vec::new);
        } else if output.len() != num_channels {
            warn!(
                "Channel count changed mid-stream ({} -> {}), keeping {}",
                output.len(),
                num_channels,
                output.len()
            );
        }

        for (ch_idx, target) in output.iter_mut().enumerate() {
            if ch_idx < num_channels {
                target.extend(buf.chan(ch_idx).iter().map(|&s| f32::from_sample(s)));
            } else {
                target.extend(std::iter::repeat(0.0).take(num_frames));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(channels: u16, sample_rate: u32, frames: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in frames {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_stereo_wav_is_planar() {
        // 3 stereo frames: L = 16384, R = -16384
        let bytes = wav_bytes(2, 22050, &[16384, -16384, 16384, -16384, 16384, -16384]);

        let buffer = SimpleDecoder::decode_bytes(bytes, "line.wav").unwrap();

        assert_eq!(buffer.sample_rate, 22050);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frames(), 3);
        assert!(buffer.channels[0].iter().all(|&s| (s - 0.5).abs() < 1e-3));
        assert!(buffer.channels[1].iter().all(|&s| (s + 0.5).abs() < 1e-3));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = SimpleDecoder::decode_bytes(b"definitely not audio".to_vec(), "x.mp3")
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_empty_wav_is_decode_error() {
        let bytes = wav_bytes(1, 44100, &[]);
        let err = SimpleDecoder::decode_bytes(bytes, "empty.wav").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
