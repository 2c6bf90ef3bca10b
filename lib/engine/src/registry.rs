//! Conversation registry.
//!
//! Conversations are created lazily: the first message against an unknown
//! conversation id brings the record into existence.

use careline_conversation::{Conversation, ConversationStore, StoreError};
use careline_core::{ConversationId, UserId};
use std::sync::Arc;

/// Title given to lazily-created conversations.
const DEFAULT_TITLE: &str = "New Conversation";

/// Lazy get-or-create access to conversation records.
#[derive(Clone)]
pub struct ConversationRegistry {
    store: Arc<dyn ConversationStore>,
}

impl ConversationRegistry {
    /// Creates a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Returns the conversation with the given id, creating and persisting
    /// it first if absent.
    ///
    /// An existing conversation is returned unchanged: in particular, a
    /// second caller with a different user id does not overwrite the owner.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the lookup or insert fails.
    pub async fn get_or_create(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Conversation, StoreError> {
        if let Some(existing) = self.store.find(id).await? {
            return Ok(existing);
        }

        let conversation = Conversation::new(id.clone(), user_id.clone(), DEFAULT_TITLE);
        self.store.insert(&conversation).await?;
        tracing::debug!(conversation_id = %id, "Created conversation");
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careline_conversation::{MemoryStore, Message, MessageStore};

    #[tokio::test]
    async fn creates_conversation_when_absent() {
        let store = Arc::new(MemoryStore::new());
        let registry = ConversationRegistry::new(store.clone());

        let conversation = registry
            .get_or_create(&ConversationId::from("C1"), &UserId::from("U1"))
            .await
            .expect("get_or_create");

        assert_eq!(conversation.title, "New Conversation");
        assert_eq!(conversation.user_id.as_str(), "U1");
        assert!(conversation.state.is_empty());

        // Persisted before returning.
        let found = store
            .find(&ConversationId::from("C1"))
            .await
            .expect("find")
            .expect("conversation");
        assert_eq!(found.id, conversation.id);
    }

    #[tokio::test]
    async fn second_call_does_not_overwrite_owner() {
        let store = Arc::new(MemoryStore::new());
        let registry = ConversationRegistry::new(store);
        let id = ConversationId::from("C1");

        let first = registry
            .get_or_create(&id, &UserId::from("U1"))
            .await
            .expect("first");
        let second = registry
            .get_or_create(&id, &UserId::from("U2"))
            .await
            .expect("second");

        assert_eq!(first.id, second.id);
        assert_eq!(second.user_id.as_str(), "U1");
    }

    #[tokio::test]
    async fn existing_conversation_loads_messages() {
        let store = Arc::new(MemoryStore::new());
        let registry = ConversationRegistry::new(store.clone());
        let id = ConversationId::from("C1");

        registry
            .get_or_create(&id, &UserId::from("U1"))
            .await
            .expect("create");
        store
            .append(&Message::user(id.clone(), "hello"))
            .await
            .expect("append");

        let reloaded = registry
            .get_or_create(&id, &UserId::from("U1"))
            .await
            .expect("reload");
        assert_eq!(reloaded.message_count(), 1);
    }
}
