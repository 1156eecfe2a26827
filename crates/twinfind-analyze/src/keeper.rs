//! Choosing which member of each group to keep.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use twinfind_core::{DetectionMethod, DuplicateGroup, FileRecord, RecordId};

/// Which member of a group survives.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum KeepPolicy {
    /// Keep the most recently modified file.
    #[default]
    Newest,
    /// Keep the least recently modified file.
    Oldest,
    /// Keep the largest file.
    Largest,
    /// Keep the smallest file.
    Smallest,
}

impl KeepPolicy {
    /// Ordering that puts the preferred keeper first.
    pub fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        match self {
            Self::Newest => b.last_modified.cmp(&a.last_modified),
            Self::Oldest => a.last_modified.cmp(&b.last_modified),
            Self::Largest => b.size.cmp(&a.size),
            Self::Smallest => a.size.cmp(&b.size),
        }
    }
}

/// The keeper and deletion candidates for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSelection {
    pub method: DetectionMethod,
    pub keeper: Arc<FileRecord>,
    pub candidates: Vec<Arc<FileRecord>>,
}

impl GroupSelection {
    /// Apply `policy` to `group`.
    ///
    /// Members are stably sorted, so ties keep their original group order.
    /// Returns `None` for an empty group.
    pub fn from_group(group: &DuplicateGroup, policy: KeepPolicy) -> Option<Self> {
        let mut members = group.members.clone();
        members.sort_by(|a, b| policy.compare(a, b));

        let mut members = members.into_iter();
        let keeper = members.next()?;
        Some(Self {
            method: group.method,
            keeper,
            candidates: members.collect(),
        })
    }

    /// Bytes freed by deleting every candidate in this group.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }
}

/// Keeper choices for a whole detection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionPlan {
    pub policy: KeepPolicy,
    pub selections: Vec<GroupSelection>,
}

impl SelectionPlan {
    /// Records to delete, each listed once.
    ///
    /// A record may appear in groups from several methods. It is never
    /// listed if it was chosen as the keeper of any group.
    pub fn deletion_candidates(&self) -> Vec<Arc<FileRecord>> {
        let keepers: HashSet<&RecordId> = self.selections.iter().map(|s| &s.keeper.id).collect();

        let mut unique: IndexMap<&RecordId, &Arc<FileRecord>> = IndexMap::new();
        for candidate in self.selections.iter().flat_map(|s| &s.candidates) {
            if !keepers.contains(&candidate.id) {
                unique.entry(&candidate.id).or_insert(candidate);
            }
        }
        unique.into_values().map(Arc::clone).collect()
    }

    /// Ids of [`deletion_candidates`](Self::deletion_candidates).
    pub fn deletion_ids(&self) -> Vec<RecordId> {
        self.deletion_candidates()
            .into_iter()
            .map(|c| c.id.clone())
            .collect()
    }

    /// Bytes freed by deleting every deletion candidate once.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.deletion_candidates().iter().map(|c| c.size).sum()
    }
}

/// Pick a keeper in every group.
pub fn select_keepers(groups: &[DuplicateGroup], policy: KeepPolicy) -> SelectionPlan {
    SelectionPlan {
        policy,
        selections: groups
            .iter()
            .filter_map(|g| GroupSelection::from_group(g, policy))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn file(id: u64, size: u64, ts: i64) -> Arc<FileRecord> {
        Arc::new(FileRecord::file(
            id,
            format!("f{id}"),
            size,
            DateTime::from_timestamp(ts, 0).unwrap(),
        ))
    }

    fn ids(records: &[Arc<FileRecord>]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_newest_of_three() {
        let group = DuplicateGroup::new(
            DetectionMethod::Exact,
            vec![file(1, 10, 100), file(2, 10, 300), file(3, 10, 200)],
        );
        let selection = GroupSelection::from_group(&group, KeepPolicy::Newest).unwrap();

        assert_eq!(selection.keeper.id.as_str(), "2");
        assert_eq!(ids(&selection.candidates), vec!["3", "1"]);
    }

    #[test]
    fn test_each_policy() {
        let group = DuplicateGroup::new(
            DetectionMethod::Size,
            vec![file(1, 50, 100), file(2, 10, 300), file(3, 90, 200)],
        );
        let keeper = |policy| {
            GroupSelection::from_group(&group, policy)
                .unwrap()
                .keeper
                .id
                .clone()
        };

        assert_eq!(keeper(KeepPolicy::Oldest).as_str(), "1");
        assert_eq!(keeper(KeepPolicy::Largest).as_str(), "3");
        assert_eq!(keeper(KeepPolicy::Smallest).as_str(), "2");
    }

    #[test]
    fn test_ties_keep_group_order() {
        let group = DuplicateGroup::new(
            DetectionMethod::Exact,
            vec![file(7, 10, 100), file(3, 10, 100), file(5, 10, 100)],
        );
        let selection = GroupSelection::from_group(&group, KeepPolicy::Newest).unwrap();

        assert_eq!(selection.keeper.id.as_str(), "7");
        assert_eq!(ids(&selection.candidates), vec!["3", "5"]);
    }

    #[test]
    fn test_plan_never_deletes_a_keeper() {
        let a = file(1, 100, 300);
        let b = file(2, 100, 200);
        let c = file(3, 101, 100);
        let exact = DuplicateGroup::new(DetectionMethod::Exact, vec![a.clone(), b.clone()]);
        let size = DuplicateGroup::new(DetectionMethod::Size, vec![a, b, c]);

        let plan = select_keepers(&[exact, size], KeepPolicy::Newest);

        assert_eq!(plan.deletion_ids(), vec![RecordId::new("2"), RecordId::new("3")]);
        assert_eq!(plan.reclaimable_bytes(), 201);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("largest".parse::<KeepPolicy>().unwrap(), KeepPolicy::Largest);
        assert_eq!(KeepPolicy::Smallest.to_string(), "smallest");
    }
}
