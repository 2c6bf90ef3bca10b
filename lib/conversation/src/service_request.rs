//! Service request entity.
//!
//! Service requests are modeled here for the data layer, but their status
//! transitions are owned by a future workflow component; the conversation
//! core never drives them.

use careline_core::{ServiceRequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// The status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, not yet picked up.
    Pending,
    /// Being worked.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with error.
    Failed,
    /// Blocked on additional information from the user.
    AwaitingInformation,
}

impl RequestStatus {
    /// Returns the lowercase storage name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::AwaitingInformation => "awaiting_information",
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A request for a specific social service on behalf of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Unique request identifier.
    pub id: ServiceRequestId,
    /// The user the request belongs to.
    pub user_id: UserId,
    /// The requested service category (e.g. "housing support").
    pub service_type: String,
    /// Free-form request parameters.
    pub parameters: HashMap<String, JsonValue>,
    /// Current status.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the request reached a terminal state, if ever.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Creates a new pending request.
    #[must_use]
    pub fn new(user_id: UserId, service_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceRequestId::new(),
            user_id,
            service_type: service_type.into(),
            parameters: HashMap::new(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Sets a request parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_pending() {
        let request = ServiceRequest::new(UserId::from("U1"), "housing support");
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.service_type, "housing support");
        assert!(request.completed_at.is_none());
    }

    #[test]
    fn request_with_parameters() {
        let request = ServiceRequest::new(UserId::from("U1"), "utility bill help")
            .with_parameter("userMessage", serde_json::json!("I need help paying rent"));
        assert_eq!(request.parameters.len(), 1);
    }

    #[test]
    fn status_storage_names() {
        assert_eq!(RequestStatus::Pending.as_str(), "pending");
        assert_eq!(RequestStatus::AwaitingInformation.as_str(), "awaiting_information");
    }

    #[test]
    fn request_serde_roundtrip() {
        let request = ServiceRequest::new(UserId::from("U1"), "food assistance");
        let json = serde_json::to_string(&request).expect("serialize");
        let parsed: ServiceRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(request.id, parsed.id);
        assert_eq!(request.status, parsed.status);
    }
}
