//! Error types for the conversation crate.
//!
//! Storage faults are the only error category this crate produces. They are
//! not locally recoverable: callers propagate them, adding layer-appropriate
//! context via rootcause as they go.

use std::fmt;

/// Errors from conversation and message storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A read query failed.
    ReadFailed { reason: String },
    /// A write failed.
    WriteFailed { reason: String },
}

impl StoreError {
    /// Wraps a read failure.
    #[must_use]
    pub fn read(reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            reason: reason.into(),
        }
    }

    /// Wraps a write failure.
    #[must_use]
    pub fn write(reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { reason } => write!(f, "store read failed: {reason}"),
            Self::WriteFailed { reason } => write!(f, "store write failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}
