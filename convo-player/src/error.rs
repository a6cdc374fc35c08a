//! Error types for convo-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for convo-player
#[derive(Error, Debug)]
pub enum Error {
    /// A line's audio could not start playing
    #[error("Playback error: {0}")]
    Playback(String),

    /// An audio resource could not be retrieved
    #[error("Fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// An audio resource could not be decoded as audio
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Sample rate conversion failed
    #[error("Resample error: {0}")]
    Resample(String),

    /// The stitched buffer could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Export requested for a conversation with no active lines
    #[error("Nothing to export: the active sequence is empty")]
    EmptySequence,

    /// Export abandoned before completion
    #[error("Export cancelled")]
    Cancelled,

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the shared library (dataset, storage, config)
    #[error(transparent)]
    Common(#[from] convo_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn fetch(url: &str, reason: impl std::fmt::Display) -> Self {
        Error::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type using convo-player Error
pub type Result<T> = std::result::Result<T, Error>;
