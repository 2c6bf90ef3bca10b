//! Conversation data model and storage for the careline platform.
//!
//! This crate provides:
//!
//! - **Data model**: Users, conversations, messages, and service requests
//! - **Storage traits**: Async persistence seams for conversations and messages
//! - **Memory store**: An in-process store for tests and local development

pub mod conversation;
pub mod error;
pub mod memory;
pub mod message;
pub mod service_request;
pub mod store;
pub mod user;

pub use conversation::Conversation;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use message::{Message, MessageRole};
pub use service_request::{RequestStatus, ServiceRequest};
pub use store::{ConversationStore, MessageStore};
pub use user::User;
