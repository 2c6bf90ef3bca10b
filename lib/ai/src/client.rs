//! Completion client and configuration.
//!
//! The client is constructed once at startup from explicit configuration and
//! passed by value into the components that need it, never accessed as a
//! process-wide singleton. When the provider is disabled or missing
//! credentials, the client still constructs: every call then fails with
//! `CompletionError::Disabled` and callers degrade gracefully.

use crate::backend::{ChatMessage, CompletionBackend, SamplingConfig};
use crate::error::CompletionError;
use crate::openai::OpenAiBackend;
use serde::Deserialize;
use std::sync::Arc;

/// Default model when none is configured.
const DEFAULT_MODEL: &str = "gpt-4";

/// Completion provider configuration, bound once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Whether the provider is enabled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key for the provider.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the chat-completions endpoint.
    #[serde(default)]
    pub endpoint: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Deployment identifier, when it differs from the model name.
    #[serde(default)]
    pub deployment: Option<String>,
    /// Optional organization identifier.
    #[serde(default)]
    pub organization: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: String::new(),
            endpoint: String::new(),
            model: default_model(),
            deployment: None,
            organization: None,
        }
    }
}

impl CompletionConfig {
    /// Returns true if the provider is enabled and fully configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty() && !self.endpoint.is_empty()
    }

    /// Returns the deployment identifier, falling back to the model name.
    #[must_use]
    pub fn deployment_name(&self) -> &str {
        self.deployment.as_deref().unwrap_or(&self.model)
    }
}

/// A handle on the completion provider.
///
/// Stateless and cheap to clone; safe for concurrent use.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl CompletionClient {
    /// Creates a client from startup configuration.
    ///
    /// A disabled or incomplete configuration yields a disabled client
    /// rather than an error: the service degrades to static responses
    /// instead of failing startup.
    #[must_use]
    pub fn from_config(config: &CompletionConfig) -> Self {
        if !config.is_configured() {
            tracing::warn!("Completion provider is disabled or not properly configured");
            return Self::disabled();
        }

        let backend = OpenAiBackend::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.deployment_name(),
        );
        Self {
            backend: Some(Arc::new(backend)),
        }
    }

    /// Creates a disabled client; every call returns `CompletionError::Disabled`.
    #[must_use]
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Creates a client over an arbitrary backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Returns true if a backend is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Requests a single completion. One attempt, no retries.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Disabled` when no backend is configured,
    /// or the backend's error when the call fails.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingConfig,
    ) -> Result<String, CompletionError> {
        match &self.backend {
            Some(backend) => backend.complete(messages, sampling).await,
            None => Err(CompletionError::Disabled),
        }
    }
}
