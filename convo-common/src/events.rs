//! Event types and EventBus
//!
//! The player core reports to whatever shell hosts it (CLI, UI) through
//! `ConvoEvent`s broadcast on an `EventBus`. Producers never block: a slow or
//! absent subscriber only loses events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Playback mode of a conversation's sequential playback controller.
///
/// A single tagged state instead of a "playing all" flag plus an optional
/// index, so that e.g. "playing all with no current line" cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Nothing playing
    Idle,

    /// Autonomous playback of the whole active sequence, currently at `index`
    PlayingAll { index: usize },

    /// One line playing on its own
    PlayingSingle { index: usize },
}

impl PlaybackMode {
    /// Index of the line this mode is playing, if any
    pub fn current_index(&self) -> Option<usize> {
        match self {
            PlaybackMode::Idle => None,
            PlaybackMode::PlayingAll { index } | PlaybackMode::PlayingSingle { index } => {
                Some(*index)
            }
        }
    }

    pub fn is_playing_all(&self) -> bool {
        matches!(self, PlaybackMode::PlayingAll { .. })
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Idle => write!(f, "idle"),
            PlaybackMode::PlayingAll { index } => write!(f, "playing all (line {})", index),
            PlaybackMode::PlayingSingle { index } => write!(f, "playing line {}", index),
        }
    }
}

/// Events exposed by the player core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConvoEvent {
    /// A line's player started or stopped
    PlayStateChanged {
        /// Index into the active line sequence
        line_index: usize,
        is_playing: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Sequential playback controller changed mode
    PlaybackModeChanged {
        mode: PlaybackMode,
        /// Line the new mode is playing; `None` when idle
        current_index: Option<usize>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Export job accepted and started
    ExportStarted {
        job_id: Uuid,
        conversation_id: String,
        total_lines: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Lines decoded so far, as a percentage (0-100)
    ExportProgress {
        job_id: Uuid,
        percent: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Export produced a file
    ExportCompleted {
        job_id: Uuid,
        file_name: String,
        byte_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Export aborted; nothing was produced
    ExportFailed {
        job_id: Uuid,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// Emission is synchronous, so the single-owner state machines in the player
/// can publish without an async context.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConvoEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ConvoEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ConvoEvent,
    ) -> Result<usize, broadcast::error::SendError<ConvoEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ConvoEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(10);
        let event = ConvoEvent::PlayStateChanged {
            line_index: 0,
            is_playing: true,
            timestamp: chrono::Utc::now(),
        };

        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit(ConvoEvent::PlayStateChanged {
            line_index: 2,
            is_playing: false,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        match rx.recv().await.unwrap() {
            ConvoEvent::PlayStateChanged {
                line_index,
                is_playing,
                ..
            } => {
                assert_eq!(line_index, 2);
                assert!(!is_playing);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_playback_mode_current_index() {
        assert_eq!(PlaybackMode::Idle.current_index(), None);
        assert_eq!(PlaybackMode::PlayingAll { index: 3 }.current_index(), Some(3));
        assert_eq!(
            PlaybackMode::PlayingSingle { index: 1 }.current_index(),
            Some(1)
        );
        assert!(PlaybackMode::PlayingAll { index: 0 }.is_playing_all());
        assert!(!PlaybackMode::PlayingSingle { index: 0 }.is_playing_all());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let mode = PlaybackMode::PlayingAll { index: 2 };
        let event = ConvoEvent::PlaybackModeChanged {
            mode,
            current_index: mode.current_index(),
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PlaybackModeChanged");
        assert_eq!(json["mode"]["mode"], "playing_all");
        assert_eq!(json["current_index"], 2);

        let idle = ConvoEvent::PlaybackModeChanged {
            mode: PlaybackMode::Idle,
            current_index: None,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&idle).unwrap();
        assert!(json["current_index"].is_null());
    }
}
