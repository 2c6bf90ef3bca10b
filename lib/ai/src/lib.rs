//! Chat-completion primitives for the careline platform.
//!
//! This crate provides the boundary to the language-model provider:
//!
//! - **Backend**: Role-tagged chat messages, sampling configuration, and the
//!   `CompletionBackend` trait
//! - **OpenAI backend**: A reqwest implementation of an OpenAI-compatible
//!   chat-completions endpoint
//! - **Client**: The enabled/disabled `CompletionClient` wrapper constructed
//!   once at startup from `CompletionConfig`
//!
//! One call contract, no internal retries: given an ordered list of
//! role-tagged messages and sampling parameters, return a single completion
//! string or fail.

pub mod backend;
pub mod client;
pub mod error;
pub mod openai;

pub use backend::{ChatMessage, ChatRole, CompletionBackend, SamplingConfig};
pub use client::{CompletionClient, CompletionConfig};
pub use error::CompletionError;
pub use openai::OpenAiBackend;
