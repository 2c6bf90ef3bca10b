//! PostgreSQL repositories for conversations and messages.

use async_trait::async_trait;
use careline_conversation::{
    Conversation, ConversationStore, Message, MessageRole, MessageStore, StoreError,
};
use careline_core::{ConversationId, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;

/// Converts a free-form bag to its JSONB representation.
fn bag_to_json(bag: &HashMap<String, JsonValue>) -> JsonValue {
    JsonValue::Object(bag.clone().into_iter().collect())
}

/// Converts a JSONB value back to a bag; non-object values yield an empty bag.
fn json_to_bag(value: JsonValue) -> HashMap<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

fn role_from_str(s: &str) -> MessageRole {
    match s {
        "system" => MessageRole::System,
        "user" => MessageRole::User,
        "assistant" => MessageRole::Assistant,
        "tool" => MessageRole::Tool,
        _ => MessageRole::User,
    }
}

/// Row type for conversation queries.
#[derive(FromRow)]
struct ConversationRow {
    id: String,
    user_id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    state: JsonValue,
}

impl ConversationRow {
    fn into_conversation(self, messages: Vec<Message>) -> Conversation {
        Conversation {
            id: ConversationId::new(self.id),
            user_id: UserId::new(self.user_id),
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            state: json_to_bag(self.state),
            messages,
        }
    }
}

/// Row type for message queries.
#[derive(FromRow)]
struct MessageRow {
    id: String,
    conversation_id: String,
    content: String,
    role: String,
    timestamp: DateTime<Utc>,
    metadata: JsonValue,
}

impl MessageRow {
    fn try_into_message(self) -> Result<Message, StoreError> {
        let id = MessageId::from_str(&self.id)
            .map_err(|e| StoreError::read(format!("invalid message id '{}': {}", self.id, e)))?;

        Ok(Message {
            id,
            conversation_id: ConversationId::new(self.conversation_id),
            content: self.content,
            role: role_from_str(&self.role),
            timestamp: self.timestamp,
            metadata: json_to_bag(self.metadata),
        })
    }
}

/// Repository for conversation records.
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn find(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, created_at, updated_at, completed_at, state
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::read(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let message_rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, content, role, timestamp, metadata
            FROM messages
            WHERE conversation_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(e.to_string()))?;

        let messages = message_rows
            .into_iter()
            .map(MessageRow::try_into_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(row.into_conversation(messages)))
    }

    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations
                (id, user_id, title, created_at, updated_at, completed_at, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conversation.id.as_str())
        .bind(conversation.user_id.as_str())
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .bind(conversation.completed_at)
        .bind(bag_to_json(&conversation.state))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(e.to_string()))?;

        Ok(())
    }

    async fn touch(&self, id: &ConversationId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(e.to_string()))?;

        Ok(())
    }
}

/// Repository for the append-only message log.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages
                (id, conversation_id, content, role, timestamp, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.as_str())
        .bind(&message.content)
        .bind(message.role.as_str())
        .bind(message.timestamp)
        .bind(bag_to_json(&message.metadata))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(e.to_string()))?;

        Ok(())
    }

    async fn recent(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, content, role, timestamp, metadata
            FROM messages
            WHERE conversation_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(conversation_id.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(e.to_string()))?;

        // Selected newest-first; present oldest-to-newest.
        let mut messages = rows
            .into_iter()
            .map(MessageRow::try_into_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}
