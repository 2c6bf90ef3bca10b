//! Message types for conversations.

use chrono::{DateTime, Utc};
use careline_core::{ConversationId, MessageId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System/instruction message.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
    /// Tool result message.
    Tool,
}

impl MessageRole {
    /// Returns the lowercase wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A message in a conversation.
///
/// Messages are append-only: once created they are never updated or deleted.
/// Within a conversation, messages are totally ordered by timestamp, and that
/// order is the only order ever presented to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Message content.
    pub content: String,
    /// Message role.
    pub role: MessageRole,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Free-form metadata.
    pub metadata: HashMap<String, JsonValue>,
}

impl Message {
    /// Creates a new message with a fresh identifier and current timestamp.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            content: content.into(),
            role,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content)
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::System, content)
    }

    /// Sets a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
