//! Progress reporting types for deletion.

use twinfind_core::RecordId;

use crate::OperationError;

/// Progress of an ongoing deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionProgress {
    /// Items attempted so far.
    pub current: usize,
    /// Total items to delete.
    pub total: usize,
    /// Description of the current step.
    pub message: String,
    /// Items deleted successfully.
    pub deleted: usize,
    /// Items that failed.
    pub failed: usize,
    /// Bytes freed by successful deletions.
    pub bytes_freed: u64,
    /// The record being deleted next, if any.
    pub current_id: Option<RecordId>,
}

impl DeletionProgress {
    /// Create a progress tracker for `total` items.
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            message: String::new(),
            deleted: 0,
            failed: 0,
            bytes_freed: 0,
            current_id: None,
        }
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Result of a finished deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionComplete {
    /// Items deleted successfully.
    pub deleted: usize,
    /// Items that failed.
    pub failed: usize,
    /// Bytes freed.
    pub bytes_freed: u64,
    /// One error per failed item.
    pub errors: Vec<OperationError>,
}

impl DeletionComplete {
    /// Check if every deletion succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a human-readable summary of the deletion.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("Deleted {} items", self.deleted)
        } else {
            format!("Deleted {} items, {} failed", self.deleted, self.failed)
        }
    }
}
