//! Dataset loading and browsing queries
//!
//! The dataset is a single static JSON document. Everything here is a pure
//! read-only query over it.

use crate::characters;
use crate::model::{Character, Conversation, ConversationData};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Load the dataset document from a JSON file
pub fn load_from_path(path: &Path) -> Result<ConversationData> {
    debug!("Loading dataset: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let data = load_from_str(&contents)?;
    info!(
        "Loaded {} conversations (exported {})",
        data.conversations.len(),
        data.export_date
    );
    Ok(data)
}

/// Parse the dataset document from a JSON string
pub fn load_from_str(json: &str) -> Result<ConversationData> {
    Ok(serde_json::from_str(json)?)
}

/// Every character appearing in the dataset, sorted by name
pub fn all_characters(data: &ConversationData) -> Vec<Character> {
    let mut partners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for convo in &data.conversations {
        partners
            .entry(&convo.character1)
            .or_default()
            .insert(&convo.character2);
        partners
            .entry(&convo.character2)
            .or_default()
            .insert(&convo.character1);
    }

    partners
        .into_iter()
        .map(|(name, set)| Character {
            name: name.to_string(),
            icon_path: characters::icon_path(name),
            conversation_partners: set.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

/// Conversations the character takes part in
pub fn conversations_for_character<'a>(
    data: &'a ConversationData,
    name: &str,
) -> Vec<&'a Conversation> {
    data.conversations
        .iter()
        .filter(|convo| convo.involves(name))
        .collect()
}

/// Conversations between two characters, in either order
pub fn conversations_between<'a>(
    data: &'a ConversationData,
    a: &str,
    b: &str,
) -> Vec<&'a Conversation> {
    data.conversations
        .iter()
        .filter(|convo| {
            (convo.character1 == a && convo.character2 == b)
                || (convo.character1 == b && convo.character2 == a)
        })
        .collect()
}

/// Case-insensitive search over transcriptions and summaries
pub fn search<'a>(data: &'a ConversationData, term: &str) -> Vec<&'a Conversation> {
    let needle = term.to_lowercase();
    data.conversations
        .iter()
        .filter(|convo| matches_text(convo, &needle))
        .collect()
}

/// Look up one conversation by its identifier
pub fn find_by_id<'a>(data: &'a ConversationData, id: &str) -> Option<&'a Conversation> {
    data.conversations
        .iter()
        .find(|convo| convo.conversation_id == id)
}

fn matches_text(convo: &Conversation, needle: &str) -> bool {
    convo
        .lines
        .iter()
        .any(|line| line.transcription.to_lowercase().contains(needle))
        || convo.summary.to_lowercase().contains(needle)
}

/// Completeness filter for conversation listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Completeness {
    #[default]
    All,
    Complete,
    Incomplete,
}

/// Combined listing filter (search box + character + completeness selectors)
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    /// Free-text search; blank matches everything
    pub search: Option<String>,

    /// Restrict to conversations involving this internal name
    pub character: Option<String>,

    pub completeness: Completeness,
}

impl ConversationFilter {
    /// Conversations matching every active criterion, in dataset order
    pub fn apply<'a>(&self, data: &'a ConversationData) -> Vec<&'a Conversation> {
        data.conversations
            .iter()
            .filter(|convo| self.matches(convo))
            .collect()
    }

    fn matches(&self, convo: &Conversation) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                let needle = term.to_lowercase();
                let hit = matches_text(convo, &needle)
                    || convo.character1.to_lowercase().contains(&needle)
                    || convo.character2.to_lowercase().contains(&needle);
                if !hit {
                    return false;
                }
            }
        }

        if let Some(name) = &self.character {
            if !convo.involves(name) {
                return false;
            }
        }

        match self.completeness {
            Completeness::All => true,
            Completeness::Complete => convo.is_complete,
            Completeness::Incomplete => !convo.is_complete,
        }
    }
}
