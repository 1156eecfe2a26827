//! Aggregate statistics over a detection result.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use twinfind_core::{DetectionMethod, DuplicateGroup};

/// Totals for a list of duplicate groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    /// Number of groups.
    pub group_count: usize,
    /// Group count per method, in first-seen order.
    pub groups_by_method: IndexMap<DetectionMethod, usize>,
    /// Distinct records that appear in at least one group.
    pub distinct_records: usize,
    /// Sum of group sizes. A record in several groups counts once per group.
    pub total_bytes: u64,
}

impl DetectionSummary {
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        let mut groups_by_method: IndexMap<DetectionMethod, usize> = IndexMap::new();
        let mut seen = HashSet::new();
        let mut total_bytes = 0;

        for group in groups {
            *groups_by_method.entry(group.method).or_default() += 1;
            seen.extend(group.members.iter().map(|m| &m.id));
            total_bytes += group.total_size;
        }

        Self {
            group_count: groups.len(),
            groups_by_method,
            distinct_records: seen.len(),
            total_bytes,
        }
    }

    /// Whether no duplicates were found.
    pub fn is_empty(&self) -> bool {
        self.group_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::sync::Arc;
    use twinfind_core::FileRecord;

    #[test]
    fn test_counts_shared_records_once() {
        let stamp = DateTime::from_timestamp(0, 0).unwrap();
        let a = Arc::new(FileRecord::file(1u64, "a", 10, stamp));
        let b = Arc::new(FileRecord::file(2u64, "a", 10, stamp));
        let c = Arc::new(FileRecord::file(3u64, "c", 10, stamp));

        let groups = vec![
            DuplicateGroup::new(DetectionMethod::Exact, vec![a.clone(), b.clone()]),
            DuplicateGroup::new(DetectionMethod::Size, vec![a, b, c]),
        ];
        let summary = DetectionSummary::from_groups(&groups);

        assert_eq!(summary.group_count, 2);
        assert_eq!(summary.distinct_records, 3);
        assert_eq!(summary.total_bytes, 50);
        assert_eq!(summary.groups_by_method[&DetectionMethod::Size], 1);
    }

    #[test]
    fn test_empty() {
        assert!(DetectionSummary::from_groups(&[]).is_empty());
    }
}
