//! Context window assembly.
//!
//! The window sent to the model is bounded regardless of conversation
//! length: one persona instruction, at most `HISTORY_LIMIT` recent history
//! entries in chronological order, and the incoming user message. This is
//! the system's only backpressure mechanism against unbounded context
//! growth.

use careline_ai::ChatMessage;
use careline_conversation::{MessageRole, MessageStore, StoreError};
use careline_core::ConversationId;
use std::sync::Arc;

/// Persona instruction carried as the first message of every window.
pub const PERSONA_INSTRUCTION: &str =
    "You are a helpful and empathetic AI assistant for social services.";

/// Maximum history entries pulled into a window.
pub const HISTORY_LIMIT: usize = 10;

/// Upper bound on window length: persona + history + the new message.
pub const MAX_WINDOW: usize = HISTORY_LIMIT + 2;

/// Builds bounded context windows from stored history.
#[derive(Clone)]
pub struct ContextWindowBuilder {
    messages: Arc<dyn MessageStore>,
}

impl ContextWindowBuilder {
    /// Creates a builder over the given message store.
    #[must_use]
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    /// Assembles the window for a new user message.
    ///
    /// The new message is appended last even though it has not been
    /// persisted yet; persistence happens after the completion call.
    /// Tool-role history is not forwarded to the model.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if history cannot be loaded.
    pub async fn build(
        &self,
        conversation_id: &ConversationId,
        new_message: &str,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let history = self.messages.recent(conversation_id, HISTORY_LIMIT).await?;

        let mut window = Vec::with_capacity(history.len() + 2);
        window.push(ChatMessage::system(PERSONA_INSTRUCTION));
        for message in &history {
            match message.role {
                MessageRole::User => window.push(ChatMessage::user(message.content.clone())),
                MessageRole::Assistant => {
                    window.push(ChatMessage::assistant(message.content.clone()));
                }
                MessageRole::System => window.push(ChatMessage::system(message.content.clone())),
                MessageRole::Tool => {}
            }
        }
        window.push(ChatMessage::user(new_message));

        debug_assert!(window.len() <= MAX_WINDOW);
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careline_ai::ChatRole;
    use careline_conversation::{MemoryStore, Message};
    use chrono::{Duration, Utc};

    fn seeded(id: &ConversationId, role: MessageRole, content: &str, offset_secs: i64) -> Message {
        let mut message = Message::new(id.clone(), role, content);
        message.timestamp = Utc::now() + Duration::seconds(offset_secs);
        message
    }

    #[tokio::test]
    async fn empty_history_yields_persona_and_new_message() {
        let store = Arc::new(MemoryStore::new());
        let builder = ContextWindowBuilder::new(store);

        let window = builder
            .build(&ConversationId::from("C1"), "I need help paying rent")
            .await
            .expect("build");

        assert_eq!(window.len(), 2);
        assert_eq!(window[0].role, ChatRole::System);
        assert_eq!(window[0].content, PERSONA_INSTRUCTION);
        assert_eq!(window[1].role, ChatRole::User);
        assert_eq!(window[1].content, "I need help paying rent");
    }

    #[tokio::test]
    async fn long_history_is_bounded_at_max_window() {
        let store = Arc::new(MemoryStore::new());
        let id = ConversationId::from("C1");
        for i in 0..30 {
            store
                .append(&seeded(&id, MessageRole::User, &format!("m{i}"), i))
                .await
                .expect("append");
        }
        let builder = ContextWindowBuilder::new(store);

        let window = builder.build(&id, "latest").await.expect("build");

        assert_eq!(window.len(), MAX_WINDOW);
        // Newest HISTORY_LIMIT entries, chronological, between persona and the new message.
        assert_eq!(window[1].content, "m20");
        assert_eq!(window[MAX_WINDOW - 2].content, "m29");
        assert_eq!(window[MAX_WINDOW - 1].content, "latest");
    }

    #[tokio::test]
    async fn history_roles_are_mapped() {
        let store = Arc::new(MemoryStore::new());
        let id = ConversationId::from("C1");
        store
            .append(&seeded(&id, MessageRole::User, "question", 0))
            .await
            .expect("append");
        store
            .append(&seeded(&id, MessageRole::Assistant, "answer", 1))
            .await
            .expect("append");
        store
            .append(&seeded(&id, MessageRole::System, "note", 2))
            .await
            .expect("append");
        let builder = ContextWindowBuilder::new(store);

        let window = builder.build(&id, "next").await.expect("build");

        assert_eq!(window[1].role, ChatRole::User);
        assert_eq!(window[2].role, ChatRole::Assistant);
        assert_eq!(window[3].role, ChatRole::System);
    }

    #[tokio::test]
    async fn tool_history_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        let id = ConversationId::from("C1");
        store
            .append(&seeded(&id, MessageRole::User, "question", 0))
            .await
            .expect("append");
        store
            .append(&seeded(&id, MessageRole::Tool, "tool output", 1))
            .await
            .expect("append");
        let builder = ContextWindowBuilder::new(store);

        let window = builder.build(&id, "next").await.expect("build");

        assert_eq!(window.len(), 3);
        assert!(window.iter().all(|m| m.content != "tool output"));
    }
}
