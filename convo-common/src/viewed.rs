//! Viewed-conversation tracking
//!
//! Remembers which conversations the user has opened, stored as a JSON array
//! of ids under a single key of an injected `KeyValueStore`.

use crate::model::Conversation;
use crate::storage::KeyValueStore;
use crate::Result;
use tracing::warn;

/// Store key holding the JSON array of viewed ids
pub const VIEWED_CONVERSATIONS_KEY: &str = "viewedConversations";

/// Viewed-state tracker over any key/value store
pub struct ViewedConversations<S> {
    store: S,
}

impl<S: KeyValueStore> ViewedConversations<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All viewed ids, in the order they were first viewed.
    ///
    /// A stored value that is not a JSON string array is logged and treated
    /// as empty.
    pub async fn all(&self) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(VIEWED_CONVERSATIONS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!("Ignoring unreadable viewed-conversation list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Record a conversation as viewed (idempotent)
    pub async fn mark_viewed(&self, conversation_id: &str) -> Result<()> {
        let mut ids = self.all().await?;
        if ids.iter().any(|id| id == conversation_id) {
            return Ok(());
        }
        ids.push(conversation_id.to_string());
        self.save(&ids).await
    }

    pub async fn is_viewed(&self, conversation_id: &str) -> Result<bool> {
        Ok(self.all().await?.iter().any(|id| id == conversation_id))
    }

    /// Forget every viewed conversation
    pub async fn reset_all(&self) -> Result<()> {
        self.store.remove(VIEWED_CONVERSATIONS_KEY).await
    }

    /// Forget viewed conversations the character takes part in.
    ///
    /// Returns how many ids were removed.
    pub async fn reset_for_character(
        &self,
        character: &str,
        conversations: &[Conversation],
    ) -> Result<usize> {
        let involved: Vec<&str> = conversations
            .iter()
            .filter(|convo| convo.involves(character))
            .map(|convo| convo.conversation_id.as_str())
            .collect();

        let ids = self.all().await?;
        let before = ids.len();
        let kept: Vec<String> = ids
            .into_iter()
            .filter(|id| !involved.contains(&id.as_str()))
            .collect();
        let removed = before - kept.len();

        self.save(&kept).await?;
        Ok(removed)
    }

    async fn save(&self, ids: &[String]) -> Result<()> {
        let json = serde_json::to_string(ids)?;
        self.store.set(VIEWED_CONVERSATIONS_KEY, &json).await
    }
}
