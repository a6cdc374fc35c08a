//! Conversation export
//!
//! Fetches and decodes every line of the active sequence in part order,
//! stitches them into one buffer and encodes it as a WAV file named after
//! the two participants. Any failure aborts the whole job; no partial file is
//! produced.
//!
//! Only one export runs at a time per `Exporter`. A request made while one is
//! in flight returns `ExportOutcome::AlreadyRunning` without starting a job.

use super::fetch::AudioFetcher;
use super::stitcher;
use crate::audio::{wav, AudioLocator, PcmBuffer, SimpleDecoder};
use crate::error::{Error, Result};
use convo_common::{Conversation, ConversationLine, ConvoEvent, EventBus};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Default per-resource fetch timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A finished export, ready to be offered as a download
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    /// `{character1}_{character2}_conversation.wav`
    pub file_name: String,

    /// Complete WAV file contents
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write the file into `dir` (created if missing) and return its path
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Result of an export request
#[derive(Debug)]
pub enum ExportOutcome {
    Completed(ExportedFile),

    /// Another export was in flight; this request did nothing
    AlreadyRunning,
}

pub struct Exporter<F> {
    fetcher: F,
    locator: AudioLocator,
    fetch_timeout: Duration,
    in_progress: AtomicBool,
    events: Option<EventBus>,
}

impl<F: AudioFetcher> Exporter<F> {
    pub fn new(fetcher: F, locator: AudioLocator) -> Self {
        Self {
            fetcher,
            locator,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            in_progress: AtomicBool::new(false),
            events: None,
        }
    }

    /// Bound each resource fetch; expiry fails the export with a fetch error
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Publish started/progress/completed/failed events on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Whether an export is currently in flight
    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Export `lines` (the active sequence, in part order) of `conversation`.
    ///
    /// Progress after each decoded line is `round(done / total * 100)`.
    /// Cancelling `cancel` abandons the job with `Error::Cancelled`.
    ///
    /// # Errors
    /// - `EmptySequence` when `lines` is empty
    /// - `Fetch` / `Decode` for the first line that cannot be retrieved or decoded
    /// - `Cancelled` when `cancel` fires before completion
    pub async fn export(
        &self,
        conversation: &Conversation,
        lines: &[ConversationLine],
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome> {
        if lines.is_empty() {
            return Err(Error::EmptySequence);
        }

        let Some(_guard) = RunGuard::acquire(&self.in_progress) else {
            info!(
                "Export of {} ignored: another export is in progress",
                conversation.conversation_id
            );
            return Ok(ExportOutcome::AlreadyRunning);
        };

        let job_id = Uuid::new_v4();
        info!(
            job_id = %job_id,
            "Exporting conversation {} ({} lines)",
            conversation.conversation_id,
            lines.len()
        );
        self.emit(ConvoEvent::ExportStarted {
            job_id,
            conversation_id: conversation.conversation_id.clone(),
            total_lines: lines.len(),
            timestamp: chrono::Utc::now(),
        });

        match self.run(job_id, conversation, lines, cancel).await {
            Ok(file) => {
                info!(job_id = %job_id, "Export complete: {}", file.file_name);
                self.emit(ConvoEvent::ExportCompleted {
                    job_id,
                    file_name: file.file_name.clone(),
                    byte_len: file.bytes.len(),
                    timestamp: chrono::Utc::now(),
                });
                Ok(ExportOutcome::Completed(file))
            }
            Err(e) => {
                error!(job_id = %job_id, "Export failed: {}", e);
                self.emit(ConvoEvent::ExportFailed {
                    job_id,
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Fetch one line's audio and decode it at its native format
    pub async fn fetch_and_decode(
        &self,
        line: &ConversationLine,
        cancel: &CancellationToken,
    ) -> Result<PcmBuffer> {
        let url = self.locator.resolve(&line.filename);

        let bytes = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            fetched = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&url)) => {
                match fetched {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(Error::fetch(
                            &url,
                            format!("timed out after {}ms", self.fetch_timeout.as_millis()),
                        ))
                    }
                }
            }
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let name = line.filename.clone();
        tokio::task::spawn_blocking(move || SimpleDecoder::decode_bytes(bytes, &name))
            .await
            .map_err(|e| Error::Internal(format!("Decode task failed: {}", e)))?
    }

    async fn run(
        &self,
        job_id: Uuid,
        conversation: &Conversation,
        lines: &[ConversationLine],
        cancel: &CancellationToken,
    ) -> Result<ExportedFile> {
        let total = lines.len();
        let mut decoded = Vec::with_capacity(total);

        for (index, line) in lines.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let buffer = self.fetch_and_decode(line, cancel).await?;
            debug!(
                "Decoded part {} variation {}: {} frames @ {}Hz",
                line.part,
                line.variation,
                buffer.frames(),
                buffer.sample_rate
            );
            decoded.push(buffer);

            let percent = progress_percent(index + 1, total);
            debug!(job_id = %job_id, "Export progress {}%", percent);
            self.emit(ConvoEvent::ExportProgress {
                job_id,
                percent,
                timestamp: chrono::Utc::now(),
            });
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bytes = tokio::task::spawn_blocking(move || {
            let stitched = stitcher::stitch(decoded)?;
            wav::encode_wav(&stitched)
        })
        .await
        .map_err(|e| Error::Internal(format!("Encode task failed: {}", e)))??;

        Ok(ExportedFile {
            file_name: conversation.export_file_name(),
            bytes,
        })
    }

    fn emit(&self, event: ConvoEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }
}

/// `round(done / total * 100)`, clamped to 100
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (done as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Holds the single-flight flag; released on drop, whatever the exit path
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_run_guard_is_exclusive_and_released() {
        let flag = AtomicBool::new(false);

        let guard = RunGuard::acquire(&flag).unwrap();
        assert!(RunGuard::acquire(&flag).is_none());
        drop(guard);

        assert!(!flag.load(Ordering::Acquire));
        assert!(RunGuard::acquire(&flag).is_some());
    }
}
