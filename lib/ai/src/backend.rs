//! Completion backend abstraction.
//!
//! Provides the interface to a chat-completion provider: role-tagged
//! messages in, a single completion string out.

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The role of a chat message sent to the model.
///
/// These are wire roles: the data model's Tool role has no counterpart here
/// because tool history is never forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System/instruction message.
    System,
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
}

impl ChatRole {
    /// Returns the lowercase wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: ChatRole,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters for a completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Hard cap on generated length.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: Option<f32>,
    /// Nucleus sampling cumulative-probability cutoff (0.0 - 1.0).
    pub nucleus_sampling_factor: Option<f32>,
    /// Deployment/model identifier override for this call.
    pub deployment: Option<String>,
}

impl SamplingConfig {
    /// Creates an empty sampling configuration (provider defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling factor.
    #[must_use]
    pub fn with_nucleus_sampling_factor(mut self, factor: f32) -> Self {
        self.nucleus_sampling_factor = Some(factor);
        self
    }

    /// Sets the deployment identifier.
    #[must_use]
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }
}

/// Trait for completion backends.
///
/// Implementations must be stateless and safe for concurrent use. A call is
/// attempted exactly once; retry policy, if any, belongs to the caller.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Requests a single completion for the given messages.
    ///
    /// # Errors
    ///
    /// Returns a `CompletionError` when the provider is unreachable,
    /// misconfigured, or returns an error.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingConfig,
    ) -> Result<String, CompletionError>;

    /// Returns the default model name.
    fn model(&self) -> &str;
}
