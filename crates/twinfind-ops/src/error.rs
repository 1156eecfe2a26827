//! Errors from collaborators outside the detection engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use twinfind_core::RecordId;

/// A listing or deletion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum OperationError {
    /// One record could not be deleted.
    #[error("Failed to delete {id}: {message}")]
    Delete { id: RecordId, message: String },

    /// A listing could not be read.
    #[error("Failed to list {}: {message}", path.display())]
    Listing { path: PathBuf, message: String },
}

impl OperationError {
    /// Create a deletion error.
    pub fn delete(id: RecordId, message: impl Into<String>) -> Self {
        Self::Delete {
            id,
            message: message.into(),
        }
    }

    /// Create a listing error.
    pub fn listing(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Listing {
            path: path.into(),
            message: message.into(),
        }
    }
}
