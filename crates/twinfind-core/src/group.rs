//! Duplicate groups and progress events.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::method::DetectionMethod;
use crate::record::{FileRecord, RecordId};

/// A set of records deemed duplicates under one detection method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    /// Method that produced this group.
    pub method: DetectionMethod,

    /// Member records in discovery order.
    pub members: Vec<Arc<FileRecord>>,

    /// Sum of member sizes.
    pub total_size: u64,
}

impl DuplicateGroup {
    /// Create a group, deriving its total size.
    pub fn new(method: DetectionMethod, members: Vec<Arc<FileRecord>>) -> Self {
        let total_size = members.iter().map(|m| m.size).sum();
        Self {
            method,
            members,
            total_size,
        }
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// If keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Member ids in group order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    /// Check the group invariants: two or more members, all candidates.
    pub fn is_valid(&self) -> bool {
        self.members.len() >= 2 && self.members.iter().all(|m| m.is_candidate())
    }
}

/// A progress notification emitted while a scan runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Units of work completed.
    pub current: usize,
    /// Total units of work.
    pub total: usize,
    /// Description of the current step.
    pub message: String,
}

impl ProgressEvent {
    /// Create a new progress event.
    pub fn new(current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
        }
    }

    /// Completion as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record(id: u64, size: u64) -> Arc<FileRecord> {
        Arc::new(FileRecord::file(
            id,
            format!("f{id}"),
            size,
            DateTime::from_timestamp(0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_total_size_is_derived() {
        let group = DuplicateGroup::new(DetectionMethod::Size, vec![record(1, 10), record(2, 11)]);
        assert_eq!(group.total_size, 21);
        assert_eq!(group.count(), 2);
        assert_eq!(group.deletable_count(), 1);
        assert!(group.is_valid());
    }

    #[test]
    fn test_single_member_group_is_invalid() {
        let group = DuplicateGroup::new(DetectionMethod::Exact, vec![record(1, 10)]);
        assert!(!group.is_valid());
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(ProgressEvent::new(1, 4, "x").percentage(), 25.0);
        assert_eq!(ProgressEvent::new(0, 0, "x").percentage(), 0.0);
    }
}
