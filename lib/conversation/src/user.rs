//! User reference type.

use careline_core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user of the platform.
///
/// Users are owned by the surrounding system; the conversation core only
/// reads them and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user last logged in.
    pub last_login: Option<DateTime<Utc>>,
    /// Free-form string metadata.
    pub metadata: HashMap<String, String>,
}

impl User {
    /// Creates a new user record.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
            last_login: None,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_creation() {
        let user = User::new(UserId::from("U1"), "Alice", "alice@example.com");
        assert_eq!(user.name, "Alice");
        assert!(user.last_login.is_none());
        assert!(user.metadata.is_empty());
    }

    #[test]
    fn user_serde_roundtrip() {
        let user = User::new(UserId::from("U1"), "Alice", "alice@example.com");
        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user.id, parsed.id);
        assert_eq!(user.email, parsed.email);
    }
}
