//! Storage traits for conversations and messages.
//!
//! These traits are the persistence seam of the platform: the engine crate
//! depends only on them, and the server crate provides the PostgreSQL
//! implementations. Concurrent turns against the same conversation rely on
//! store-level atomicity of single-row inserts; no application-level locking
//! is assumed.

use crate::conversation::Conversation;
use crate::error::StoreError;
use crate::message::Message;
use async_trait::async_trait;
use careline_core::ConversationId;
use chrono::{DateTime, Utc};

/// Storage for conversation records.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Finds a conversation by ID, loading its message collection.
    async fn find(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError>;

    /// Inserts a new conversation.
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Refreshes a conversation's update timestamp.
    async fn touch(&self, id: &ConversationId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Append-only storage for messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Appends a message. Messages are never updated or deleted.
    async fn append(&self, message: &Message) -> Result<(), StoreError>;

    /// Returns at most `limit` messages for a conversation, oldest-to-newest.
    ///
    /// Selection prioritizes recency: the newest `limit` entries by timestamp
    /// are chosen, then re-sorted ascending. The language model must see
    /// recent context in chronological order.
    async fn recent(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;
}
