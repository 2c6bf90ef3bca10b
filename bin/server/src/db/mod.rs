//! Database repositories for the careline platform.
//!
//! This module provides PostgreSQL-backed implementations of the
//! conversation and message storage traits.

pub mod conversation;

pub use conversation::{ConversationRepository, MessageRepository};
