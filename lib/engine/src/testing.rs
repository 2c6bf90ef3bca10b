//! Test doubles for engine tests.

use async_trait::async_trait;
use careline_ai::{ChatMessage, CompletionBackend, CompletionError, SamplingConfig};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A completion backend that replays a scripted response queue.
///
/// Responses are popped in FIFO order; an exhausted queue yields an
/// `Unavailable` error, so `ScriptedBackend::default()` doubles as an
/// always-failing provider.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn with_responses(
        responses: impl IntoIterator<Item = Result<String, CompletionError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn replying(texts: impl IntoIterator<Item = &'static str>) -> Self {
        Self::with_responses(texts.into_iter().map(|t| Ok(t.to_string())))
    }

    pub(crate) fn failing() -> Self {
        Self::default()
    }

    /// Number of completion calls received so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _sampling: &SamplingConfig,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::Unavailable {
                    status: None,
                    reason: "script exhausted".to_string(),
                })
            })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
