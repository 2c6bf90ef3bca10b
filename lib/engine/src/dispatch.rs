//! Turn dispatch.
//!
//! One turn = one request-response cycle: general reply, independent intent
//! classification, optional service-specific reply, then persistence.
//! Completion failures are absorbed into fixed apology texts so the user
//! always gets some reply; storage faults propagate.
//!
//! Concurrent turns against the same conversation id are not serialized:
//! both may read the same history and interleave their appended messages.
//! The stores only guarantee single-row insert atomicity.

use crate::classify::{GENERAL_INQUIRY, IntentClassifier};
use crate::context::ContextWindowBuilder;
use crate::error::EngineError;
use crate::registry::ConversationRegistry;
use careline_ai::{ChatMessage, CompletionClient, SamplingConfig};
use careline_conversation::{Conversation, ConversationStore, Message, MessageStore};
use careline_core::{ConversationId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Reply when the completion provider is disabled or unconfigured.
pub const SERVICE_UNAVAILABLE_REPLY: &str = "I'm sorry, but the AI service is currently \
     unavailable. Please try again later or contact support if the issue persists.";

/// Reply when a completion call fails mid-turn.
pub const PROCESSING_ERROR_REPLY: &str = "I'm sorry, but I encountered an error while \
     processing your message. Please try again later.";

/// The outcome of a handled turn.
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// The final reply text. Never empty.
    pub message: String,
    /// When the turn finished.
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates a conversation turn end to end.
#[derive(Clone)]
pub struct ResponseDispatcher {
    registry: ConversationRegistry,
    window: ContextWindowBuilder,
    classifier: IntentClassifier,
    client: CompletionClient,
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
}

impl ResponseDispatcher {
    /// Creates a dispatcher over the given stores and completion client.
    #[must_use]
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        client: CompletionClient,
    ) -> Self {
        Self {
            registry: ConversationRegistry::new(conversations.clone()),
            window: ContextWindowBuilder::new(messages.clone()),
            classifier: IntentClassifier::new(client.clone()),
            client,
            conversations,
            messages,
        }
    }

    /// Starts a new conversation for a user and persists it.
    ///
    /// # Errors
    ///
    /// Returns a validation fault for a blank user id, or a storage fault
    /// if the insert fails.
    pub async fn start_conversation(&self, user_id: &UserId) -> Result<Conversation, EngineError> {
        if user_id.is_blank() {
            return Err(EngineError::Validation { field: "user id" });
        }

        let title = format!("Conversation {}", Utc::now().format("%Y-%m-%d"));
        let conversation = Conversation::new(ConversationId::generate(), user_id.clone(), title);
        self.conversations.insert(&conversation).await?;

        tracing::info!(conversation_id = %conversation.id, "Started conversation");
        Ok(conversation)
    }

    /// Handles one user turn and returns the final reply.
    ///
    /// Inputs are validated before any I/O. When the completion provider is
    /// unconfigured, the static unavailability reply is returned without
    /// touching the store. Otherwise the turn runs: general reply (apology
    /// on failure), classification of the raw message, an optional
    /// service-specific reply appended after a blank line, then persistence
    /// of the user message and the final reply.
    ///
    /// # Errors
    ///
    /// Returns a validation fault for blank inputs, or a storage fault if
    /// persistence fails. Completion failures never surface here.
    pub async fn handle_turn(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
        message: &str,
    ) -> Result<TurnReply, EngineError> {
        if conversation_id.is_blank() {
            return Err(EngineError::Validation { field: "conversation id" });
        }
        if user_id.is_blank() {
            return Err(EngineError::Validation { field: "user id" });
        }
        if message.trim().is_empty() {
            return Err(EngineError::Validation { field: "message" });
        }

        if !self.client.is_enabled() {
            tracing::warn!("Completion provider disabled; returning static reply");
            return Ok(TurnReply {
                message: SERVICE_UNAVAILABLE_REPLY.to_string(),
                timestamp: Utc::now(),
            });
        }

        self.registry.get_or_create(conversation_id, user_id).await?;

        let window = self.window.build(conversation_id, message).await?;
        let sampling = SamplingConfig::new()
            .with_max_tokens(1000)
            .with_temperature(0.7)
            .with_nucleus_sampling_factor(0.95);
        let general_reply = match self.client.complete(&window, &sampling).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(conversation_id = %conversation_id, error = %e,
                    "General completion failed");
                PROCESSING_ERROR_REPLY.to_string()
            }
        };

        // Classification looks at the raw message, not the built window.
        let category = self.classifier.classify(message).await;
        let reply = if category == GENERAL_INQUIRY {
            general_reply
        } else {
            match self.service_reply(&category, message).await {
                Ok(specific) => format!("{general_reply}\n\n{specific}"),
                Err(e) => {
                    tracing::warn!(category = %category, error = %e,
                        "Service-specific completion failed");
                    general_reply
                }
            }
        };

        self.messages
            .append(&Message::user(conversation_id.clone(), message))
            .await?;
        self.messages
            .append(&Message::assistant(conversation_id.clone(), reply.clone()))
            .await?;
        self.conversations.touch(conversation_id, Utc::now()).await?;

        tracing::info!(conversation_id = %conversation_id, category = %category,
            "Processed message");
        Ok(TurnReply {
            message: reply,
            timestamp: Utc::now(),
        })
    }

    /// Issues the service-specific completion for a classified category.
    async fn service_reply(
        &self,
        category: &str,
        user_message: &str,
    ) -> Result<String, careline_ai::CompletionError> {
        let instruction = format!(
            "You are an AI that helps with social services. The user has requested help \
             with: {category}. Please provide a helpful and empathetic response based on \
             the user's needs."
        );
        let request = summarize_request(category, &[("userMessage", user_message)]);
        let messages = [ChatMessage::system(instruction), ChatMessage::user(request)];
        let sampling = SamplingConfig::new().with_max_tokens(500).with_temperature(0.5);

        self.client.complete(&messages, &sampling).await
    }
}

/// Formats the user turn of a service-specific call: the requested service
/// plus any supplied parameters.
fn summarize_request(category: &str, parameters: &[(&str, &str)]) -> String {
    let details = parameters
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("I need help with: {category}. Additional details: {details}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use careline_ai::CompletionError;
    use careline_conversation::{MemoryStore, MessageRole};

    fn dispatcher_with(
        store: Arc<MemoryStore>,
        backend: Arc<ScriptedBackend>,
    ) -> ResponseDispatcher {
        ResponseDispatcher::new(
            store.clone(),
            store,
            CompletionClient::with_backend(backend),
        )
    }

    #[test]
    fn summarize_request_joins_parameters() {
        let summary = summarize_request(
            "housing support",
            &[("userMessage", "I need help paying rent")],
        );
        assert_eq!(
            summary,
            "I need help with: housing support. Additional details: userMessage: I need help paying rent"
        );
    }

    #[tokio::test]
    async fn turn_with_service_routing_concatenates_replies() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::replying([
            "Here is some general guidance.",
            "housing support, utility bill help",
            "Here is housing-specific guidance.",
        ]));
        let dispatcher = dispatcher_with(store.clone(), backend.clone());

        let reply = dispatcher
            .handle_turn(
                &ConversationId::from("C1"),
                &UserId::from("U1"),
                "I need help paying rent",
            )
            .await
            .expect("turn");

        assert_eq!(
            reply.message,
            "Here is some general guidance.\n\nHere is housing-specific guidance."
        );
        assert_eq!(backend.calls(), 3);

        // User message and final reply persisted, conversation created.
        let conversation = store
            .find(&ConversationId::from("C1"))
            .await
            .expect("find")
            .expect("conversation");
        assert_eq!(conversation.message_count(), 2);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
        assert_eq!(conversation.messages[0].content, "I need help paying rent");
        assert_eq!(conversation.messages[1].role, MessageRole::Assistant);
        assert_eq!(conversation.messages[1].content, reply.message);
    }

    #[tokio::test]
    async fn general_inquiry_skips_second_completion() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::replying([
            "General guidance.",
            "GeneralInquiry",
        ]));
        let dispatcher = dispatcher_with(store, backend.clone());

        let reply = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from("U1"), "hello")
            .await
            .expect("turn");

        assert_eq!(reply.message, "General guidance.");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn unconfigured_provider_returns_static_reply_without_persisting() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = ResponseDispatcher::new(
            store.clone(),
            store.clone(),
            CompletionClient::disabled(),
        );

        let reply = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from("U1"), "hello")
            .await
            .expect("turn");

        assert_eq!(reply.message, SERVICE_UNAVAILABLE_REPLY);
        assert_eq!(store.message_count(), 0);
        assert!(
            store
                .find(&ConversationId::from("C1"))
                .await
                .expect("find")
                .is_none()
        );
    }

    #[tokio::test]
    async fn failing_provider_yields_apology_and_persists_turn() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::failing());
        let dispatcher = dispatcher_with(store.clone(), backend);

        let reply = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from("U1"), "hello")
            .await
            .expect("turn");

        // General call fails -> apology; classification fails -> general inquiry.
        assert_eq!(reply.message, PROCESSING_ERROR_REPLY);
        assert!(!reply.message.is_empty());
        assert_eq!(store.message_count(), 2);
    }

    #[tokio::test]
    async fn service_call_failure_keeps_general_reply() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::with_responses([
            Ok("General guidance.".to_string()),
            Ok("housing support".to_string()),
            Err(CompletionError::Unavailable {
                status: Some(503),
                reason: "overloaded".to_string(),
            }),
        ]));
        let dispatcher = dispatcher_with(store, backend.clone());

        let reply = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from("U1"), "rent help")
            .await
            .expect("turn");

        assert_eq!(reply.message, "General guidance.");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn blank_message_rejected_before_any_call() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::replying(["unused"]));
        let dispatcher = dispatcher_with(store.clone(), backend.clone());

        let err = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from("U1"), "   ")
            .await
            .expect_err("validation");

        assert_eq!(err, EngineError::Validation { field: "message" });
        assert_eq!(backend.calls(), 0);
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn blank_ids_rejected() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::replying(["unused"]));
        let dispatcher = dispatcher_with(store, backend);

        let err = dispatcher
            .handle_turn(&ConversationId::from(""), &UserId::from("U1"), "hi")
            .await
            .expect_err("validation");
        assert_eq!(err, EngineError::Validation { field: "conversation id" });

        let err = dispatcher
            .handle_turn(&ConversationId::from("C1"), &UserId::from(" "), "hi")
            .await
            .expect_err("validation");
        assert_eq!(err, EngineError::Validation { field: "user id" });
    }

    #[tokio::test]
    async fn turns_accumulate_history_for_context() {
        let store = Arc::new(MemoryStore::new());
        let backend = Arc::new(ScriptedBackend::replying([
            "First reply.",
            "GeneralInquiry",
            "Second reply.",
            "GeneralInquiry",
        ]));
        let dispatcher = dispatcher_with(store.clone(), backend);
        let id = ConversationId::from("C1");
        let user = UserId::from("U1");

        dispatcher.handle_turn(&id, &user, "first").await.expect("turn 1");
        dispatcher.handle_turn(&id, &user, "second").await.expect("turn 2");

        let conversation = store.find(&id).await.expect("find").expect("conversation");
        assert_eq!(conversation.message_count(), 4);
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[tokio::test]
    async fn start_conversation_persists_with_dated_title() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = ResponseDispatcher::new(
            store.clone(),
            store.clone(),
            CompletionClient::disabled(),
        );

        let conversation = dispatcher
            .start_conversation(&UserId::from("U1"))
            .await
            .expect("start");

        assert!(conversation.title.starts_with("Conversation "));
        assert!(
            store
                .find(&conversation.id)
                .await
                .expect("find")
                .is_some()
        );
    }

    #[tokio::test]
    async fn start_conversation_rejects_blank_user() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = ResponseDispatcher::new(
            store.clone(),
            store,
            CompletionClient::disabled(),
        );

        let err = dispatcher
            .start_conversation(&UserId::from("  "))
            .await
            .expect_err("validation");
        assert_eq!(err, EngineError::Validation { field: "user id" });
    }
}
