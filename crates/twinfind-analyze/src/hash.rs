//! Matching on content hashes supplied by the source system.

use std::sync::Arc;

use indexmap::IndexMap;

use twinfind_core::{DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::strategy::{BoxFuture, Strategy, StrategyResult, check_cancelled};

/// Groups records with identical content hashes.
///
/// Records without a hash are skipped; they never form a group.
#[derive(Debug, Clone)]
pub struct HashMatch {
    yield_interval: usize,
}

impl HashMatch {
    /// Create the strategy, yielding every `yield_interval` records.
    pub fn new(yield_interval: usize) -> Self {
        Self {
            yield_interval: yield_interval.max(1),
        }
    }
}

impl Strategy for HashMatch {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Hash
    }

    fn detect<'a>(
        &'a self,
        files: &'a [Arc<FileRecord>],
        ctx: &'a ScanContext,
    ) -> BoxFuture<'a, StrategyResult> {
        Box::pin(async move {
            let mut by_hash: IndexMap<&str, Vec<Arc<FileRecord>>> = IndexMap::new();

            for (i, file) in files.iter().enumerate() {
                if i % self.yield_interval == 0 {
                    check_cancelled(ctx)?;
                    if i > 0 {
                        tokio::task::yield_now().await;
                    }
                }
                if let Some(hash) = file.hash() {
                    by_hash.entry(hash).or_default().push(Arc::clone(file));
                }
            }
            check_cancelled(ctx)?;

            Ok(by_hash
                .into_values()
                .filter(|members| members.len() > 1)
                .map(|members| DuplicateGroup::new(DetectionMethod::Hash, members))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn file(id: u64, name: &str, hash: Option<&str>) -> Arc<FileRecord> {
        let record = FileRecord::file(id, name, 10, DateTime::from_timestamp(0, 0).unwrap());
        Arc::new(match hash {
            Some(h) => record.with_hash(h),
            None => record,
        })
    }

    #[tokio::test]
    async fn test_groups_equal_hashes_across_names() {
        let files = vec![
            file(1, "a.jpg", Some("h1")),
            file(2, "holiday.jpg", Some("h1")),
            file(3, "c.jpg", Some("h2")),
        ];
        let groups = HashMatch::new(5000)
            .detect(&files, &ScanContext::new())
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count(), 2);
        assert_eq!(groups[0].method, DetectionMethod::Hash);
    }

    #[tokio::test]
    async fn test_records_without_hash_never_group() {
        let files = vec![
            file(1, "a.jpg", None),
            file(2, "a.jpg", None),
            file(3, "a.jpg", Some("")),
            file(4, "b.jpg", Some("h9")),
        ];
        let groups = HashMatch::new(5000)
            .detect(&files, &ScanContext::new())
            .await
            .unwrap();

        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_yields_across_intervals() {
        let files: Vec<_> = (0..25).map(|i| file(i, "x", Some("same"))).collect();
        let groups = HashMatch::new(4)
            .detect(&files, &ScanContext::new())
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count(), 25);
    }
}
