//! Offline export: fetch, decode, stitch and encode the active sequence

pub mod exporter;
pub mod fetch;
pub mod stitcher;

pub use exporter::{ExportOutcome, ExportedFile, Exporter};
pub use fetch::{AudioFetcher, FileFetcher, HttpFetcher, SourceFetcher};
