//! Conversation orchestration engine for the careline platform.
//!
//! This crate ties the conversation store and the completion client into the
//! per-turn control flow:
//!
//! - **Registry**: Lazy get-or-create of conversation records
//! - **Context**: Bounded context-window assembly for completion calls
//! - **Classify**: Best-effort intent classification into service categories
//! - **Dispatch**: The turn handler: general reply, optional
//!   service-specific reply, persistence
//!
//! Every turn is an independent request-response cycle; there is no
//! dialogue state machine beyond the conversation's timestamps and state bag.

pub mod classify;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{GENERAL_INQUIRY, IntentClassifier};
pub use context::{ContextWindowBuilder, HISTORY_LIMIT, MAX_WINDOW, PERSONA_INSTRUCTION};
pub use dispatch::{ResponseDispatcher, TurnReply};
pub use error::EngineError;
pub use registry::ConversationRegistry;
