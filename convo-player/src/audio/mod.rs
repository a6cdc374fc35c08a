//! Audio decoding, format conversion and WAV encoding

pub mod decoder;
pub mod locator;
pub mod resampler;
pub mod types;
pub mod wav;

pub use decoder::SimpleDecoder;
pub use locator::AudioLocator;
pub use resampler::Resampler;
pub use types::PcmBuffer;
