//! Dataset model
//!
//! Mirrors the exported conversation dataset: one document holding every
//! character-pair conversation, each made of recorded lines addressed by
//! `(part, variation)`.

use serde::{Deserialize, Serialize};

/// One recorded utterance.
///
/// Within a conversation the `(part, variation)` pairs are the addressable
/// dialogue units. A part may have several variations (alternate takes), of
/// which exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLine {
    /// Dialogue part number, starting at 1
    pub part: u32,

    /// Take number within the part, starting at 1
    pub variation: u32,

    /// Internal name of the speaking character
    pub speaker: String,

    /// Audio file name, resolved against the audio asset base
    pub filename: String,

    /// Transcribed text (may be empty)
    #[serde(default)]
    pub transcription: String,

    #[serde(default)]
    pub has_transcription: bool,

    /// Creation timestamp of the audio file as exported (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_creation_date: Option<String>,
}

/// A conversation between two characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier
    pub conversation_id: String,

    /// Internal name of the first participant
    pub character1: String,

    /// Internal name of the second participant
    pub character2: String,

    /// Ordinal of this conversation among the pair's conversations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// True iff no part is missing from the expected sequence
    pub is_complete: bool,

    /// Part numbers with no recorded line at all
    #[serde(default)]
    pub missing_parts: Vec<u32>,

    /// Internal name of the character who opens the conversation
    #[serde(default)]
    pub starter: String,

    /// Recorded lines in dataset order
    #[serde(default)]
    pub lines: Vec<ConversationLine>,

    #[serde(default)]
    pub summary: String,
}

impl Conversation {
    /// Whether `name` takes part in this conversation
    pub fn involves(&self, name: &str) -> bool {
        self.character1 == name || self.character2 == name
    }

    /// The other participant, if `name` takes part
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        if self.character1 == name {
            Some(&self.character2)
        } else if self.character2 == name {
            Some(&self.character1)
        } else {
            None
        }
    }

    /// Download file name for the stitched conversation audio
    pub fn export_file_name(&self) -> String {
        format!("{}_{}_conversation.wav", self.character1, self.character2)
    }
}

/// Top-level dataset document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationData {
    #[serde(default)]
    pub export_date: String,

    #[serde(default)]
    pub total_conversations: usize,

    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

/// A character derived from the dataset, with everyone it talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    /// Internal name
    pub name: String,

    /// Minimap icon path
    pub icon_path: String,

    /// Internal names of conversation partners, sorted
    pub conversation_partners: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "conversation_id": "sample_conversation_1",
        "character1": "inferno",
        "character2": "hornet",
        "conversation_number": "01",
        "topic": null,
        "is_complete": false,
        "missing_parts": [3],
        "starter": "inferno",
        "lines": [
            {
                "part": 1,
                "variation": 1,
                "speaker": "inferno",
                "filename": "inferno_hornet_01_01.mp3",
                "transcription": "Evening.",
                "has_transcription": true,
                "file_creation_date": "2025-02-27T17:38:50"
            }
        ],
        "summary": "A short exchange."
    }"#;

    #[test]
    fn test_deserialize_dataset_conversation() {
        let convo: Conversation = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(convo.conversation_id, "sample_conversation_1");
        assert_eq!(convo.conversation_number.as_deref(), Some("01"));
        assert!(convo.topic.is_none());
        assert!(!convo.is_complete);
        assert_eq!(convo.missing_parts, vec![3]);
        assert_eq!(convo.lines.len(), 1);
        assert_eq!(convo.lines[0].part, 1);
        assert!(convo.lines[0].has_transcription);
    }

    #[test]
    fn test_partner_of() {
        let convo: Conversation = serde_json::from_str(SAMPLE).unwrap();

        assert!(convo.involves("hornet"));
        assert_eq!(convo.partner_of("inferno"), Some("hornet"));
        assert_eq!(convo.partner_of("hornet"), Some("inferno"));
        assert_eq!(convo.partner_of("haze"), None);
    }

    #[test]
    fn test_export_file_name() {
        let convo: Conversation = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(convo.export_file_name(), "inferno_hornet_conversation.wav");
    }
}
