//! # Conversation Player Library (convo-player)
//!
//! Playback and export core for character-pair voice-line conversations.
//!
//! **Purpose:** Group a conversation's lines into parts, track the selected
//! variation per part, sequence "play all" across independent line players,
//! and stitch the active lines into one downloadable WAV file.
//!
//! **Architecture:** Synchronous single-owner state machines driven by media
//! events (`playback`), plus an async fetch → decode → stitch → encode export
//! pipeline (`export`) built on symphonia + rubato.

pub mod audio;
pub mod error;
pub mod export;
pub mod playback;

pub use error::{Error, Result};
pub use export::{ExportOutcome, ExportedFile, Exporter};
pub use playback::{ConversationSession, LinePlayer, MediaBackend, MediaEvent, Sequencer};
