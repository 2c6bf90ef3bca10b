//! Error types for the engine crate.
//!
//! Two categories surface from a turn: validation faults (rejected before
//! any I/O) and storage faults (propagated from the store). Completion
//! failures never appear here; they are absorbed into fallback replies at
//! the dispatcher and classifier boundaries.

use careline_conversation::StoreError;
use std::fmt;

/// Errors from engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required input was missing or blank.
    Validation { field: &'static str },
    /// A storage operation failed.
    Storage { source: StoreError },
}

impl EngineError {
    /// Returns true for validation faults (client errors).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field } => write!(f, "{field} is required"),
            Self::Storage { source } => write!(f, "storage fault: {source}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation { .. } => None,
            Self::Storage { source } => Some(source),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(source: StoreError) -> Self {
        Self::Storage { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_field() {
        let err = EngineError::Validation { field: "user id" };
        assert_eq!(err.to_string(), "user id is required");
        assert!(err.is_validation());
    }

    #[test]
    fn storage_error_wraps_source() {
        let err = EngineError::from(StoreError::write("disk full"));
        assert!(!err.is_validation());
        assert!(err.to_string().contains("disk full"));
    }
}
