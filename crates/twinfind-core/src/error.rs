//! Error types for detection.

use thiserror::Error;

use crate::record::RecordId;

/// Errors that can occur while running detection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectError {
    /// No records were supplied.
    #[error("No file records to analyze")]
    EmptyInput,

    /// A record is missing required fields.
    #[error("Malformed file record: {id}")]
    MalformedRecord { id: RecordId },

    /// The engine itself failed (not a single strategy).
    #[error("Detection failed: {reason}")]
    Engine { reason: String },

    /// The worker could not be constructed or stopped answering.
    #[error("Worker dispatch failed: {reason}")]
    Dispatch { reason: String },
}

impl DetectError {
    /// Create an engine error.
    pub fn engine(reason: impl Into<String>) -> Self {
        Self::Engine {
            reason: reason.into(),
        }
    }

    /// Create a dispatch error.
    pub fn dispatch(reason: impl Into<String>) -> Self {
        Self::Dispatch {
            reason: reason.into(),
        }
    }

    /// Whether this error should be answered with an empty result rather than
    /// surfaced to the caller.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::MalformedRecord { .. })
    }
}

/// Invalid configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// The configuration source could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    Parse { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        assert!(DetectError::EmptyInput.is_input_error());
        assert!(
            DetectError::MalformedRecord {
                id: RecordId::new("x")
            }
            .is_input_error()
        );
        assert!(!DetectError::engine("boom").is_input_error());
    }

    #[test]
    fn test_error_messages() {
        let err = DetectError::dispatch("thread spawn failed");
        assert!(err.to_string().contains("thread spawn failed"));
    }
}
