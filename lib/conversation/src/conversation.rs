//! Conversation state and lifecycle.
//!
//! A conversation is a durable thread of messages between one user and the
//! assistant. It carries a free-form state bag for cross-turn scratch data
//! such as in-progress service-request parameters.

use crate::message::Message;
use careline_core::{ConversationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A conversation between a user and the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// The user who owns this conversation.
    pub user_id: UserId,
    /// Conversation title.
    pub title: String,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// When the conversation was last active. Invariant: `updated_at >= created_at`.
    pub updated_at: DateTime<Utc>,
    /// When the conversation was completed, if ever.
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-form cross-turn state.
    pub state: HashMap<String, JsonValue>,
    /// Messages in this conversation, ordered by timestamp.
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Creates a new conversation for a user.
    #[must_use]
    pub fn new(id: ConversationId, user_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            title: title.into(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            state: HashMap::new(),
            messages: Vec::new(),
        }
    }

    /// Adds a message and refreshes the update timestamp.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Refreshes the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Marks the conversation as completed.
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Returns true if the conversation has been completed.
    ///
    /// Whether a completed conversation should reject further turns is a
    /// caller policy; the core does not enforce it.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the last message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns a state bag entry.
    #[must_use]
    pub fn state_value(&self, key: &str) -> Option<&JsonValue> {
        self.state.get(key)
    }

    /// Sets a state bag entry and refreshes the update timestamp.
    pub fn set_state(&mut self, key: impl Into<String>, value: JsonValue) {
        self.state.insert(key.into(), value);
        self.updated_at = Utc::now();
    }
}
