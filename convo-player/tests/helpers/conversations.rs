//! Conversation fixtures

use convo_common::{Conversation, ConversationLine};

pub fn line(part: u32, variation: u32, speaker: &str, filename: &str) -> ConversationLine {
    ConversationLine {
        part,
        variation,
        speaker: speaker.to_string(),
        filename: filename.to_string(),
        transcription: format!("{} says part {}", speaker, part),
        has_transcription: true,
        file_creation_date: None,
    }
}

/// `inferno` / `hornet` conversation with the given lines
pub fn conversation(id: &str, lines: Vec<ConversationLine>) -> Conversation {
    Conversation {
        conversation_id: id.to_string(),
        character1: "inferno".to_string(),
        character2: "hornet".to_string(),
        conversation_number: Some("01".to_string()),
        topic: None,
        is_complete: true,
        missing_parts: Vec::new(),
        starter: "inferno".to_string(),
        lines,
        summary: String::new(),
    }
}
