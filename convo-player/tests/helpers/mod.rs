//! Test helper modules for convo-player integration tests
//!
//! - audio_generator: deterministic in-memory WAV fixtures (hound)
//! - fakes: media backends and fetchers that need no device or network
//! - conversations: conversation records for the playback scenarios

#![allow(dead_code)]

pub mod audio_generator;
pub mod conversations;
pub mod fakes;

pub use audio_generator::{constant_wav, read_wav, silent_wav, sine_wav};
pub use conversations::{conversation, line};
pub use fakes::{FakeBackend, GatedFetcher, HangingFetcher, MapFetcher, PlayLog};
