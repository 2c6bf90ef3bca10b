//! Intent classification.
//!
//! A secondary, single-turn completion call labels the user's raw message
//! with a social-service category. Classification is best-effort: it must
//! never block or fail the primary conversational reply, so every failure
//! path collapses to `GENERAL_INQUIRY`: treat as ordinary chat, with no
//! specialized routing.

use careline_ai::{ChatMessage, CompletionClient, SamplingConfig};

/// Fallback category: ordinary chat, no specialized handling.
pub const GENERAL_INQUIRY: &str = "GeneralInquiry";

/// Instruction for the classification call.
const CLASSIFY_INSTRUCTION: &str = "You are an AI that helps identify social services based on \
     user needs. Analyze the following message and recommend up to 3 relevant social service \
     categories. Return only the service names as a comma-separated list. \
     Example: 'food assistance, housing support, utility bill help'";

/// Classifies raw user messages into service categories.
#[derive(Clone)]
pub struct IntentClassifier {
    client: CompletionClient,
}

impl IntentClassifier {
    /// Creates a classifier over the given completion client.
    #[must_use]
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Returns the primary service category for a message.
    ///
    /// Sends a single-turn request (no conversation history) and takes the
    /// first non-empty entry of the comma-separated response. Returns
    /// `GENERAL_INQUIRY` when the client is disabled, the call fails, or
    /// the response yields no usable entry.
    pub async fn classify(&self, user_message: &str) -> String {
        if !self.client.is_enabled() {
            tracing::warn!("Completion client disabled; classifying as general inquiry");
            return GENERAL_INQUIRY.to_string();
        }

        let messages = [
            ChatMessage::system(CLASSIFY_INSTRUCTION),
            ChatMessage::user(user_message),
        ];
        let sampling = SamplingConfig::new().with_max_tokens(150).with_temperature(0.3);

        match self.client.complete(&messages, &sampling).await {
            Ok(response) => {
                let category =
                    primary_category(&response).unwrap_or_else(|| GENERAL_INQUIRY.to_string());
                tracing::debug!(category = %category, "Classified message");
                category
            }
            Err(e) => {
                tracing::warn!(error = %e, "Classification call failed");
                GENERAL_INQUIRY.to_string()
            }
        }
    }
}

/// Extracts the first non-empty comma-separated entry.
fn primary_category(response: &str) -> Option<String> {
    response
        .split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .map(ToString::to_string)
}
