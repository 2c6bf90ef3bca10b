//! In-process store for tests and local development.

use crate::conversation::Conversation;
use crate::error::StoreError;
use crate::message::Message;
use crate::store::{ConversationStore, MessageStore};
use async_trait::async_trait;
use careline_core::ConversationId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory implementation of both storage traits.
///
/// Backed by mutex-guarded maps; locks are held only for the duration of the
/// map operation, never across an await point.
#[derive(Default)]
pub struct MemoryStore {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored messages, across all conversations.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.lock().expect("messages lock").len()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.lock().expect("conversations lock");
        let mut found = match conversations.get(id) {
            Some(conversation) => conversation.clone(),
            None => return Ok(None),
        };
        drop(conversations);

        let messages = self.messages.lock().expect("messages lock");
        found.messages = messages
            .iter()
            .filter(|m| &m.conversation_id == id)
            .cloned()
            .collect();
        found.messages.sort_by_key(|m| m.timestamp);
        Ok(Some(found))
    }

    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.conversations
            .lock()
            .expect("conversations lock")
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn touch(&self, id: &ConversationId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut conversations = self.conversations.lock().expect("conversations lock");
        if let Some(conversation) = conversations.get_mut(id) {
            conversation.updated_at = at;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        self.messages
            .lock()
            .expect("messages lock")
            .push(message.clone());
        Ok(())
    }

    async fn recent(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().expect("messages lock");
        let mut matching: Vec<Message> = messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        drop(messages);

        // Newest `limit` by timestamp, then chronological for the model.
        matching.sort_by_key(|m| m.timestamp);
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.split_off(skip))
    }
}
