//! Exact matching on `(name, size)`.

use std::sync::Arc;

use indexmap::IndexMap;

use twinfind_core::{DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::strategy::{BoxFuture, Strategy, StrategyResult, check_cancelled};

/// Groups records with identical name and size.
#[derive(Debug, Clone)]
pub struct ExactMatch {
    yield_interval: usize,
}

impl ExactMatch {
    /// Create the strategy, yielding every `yield_interval` records.
    pub fn new(yield_interval: usize) -> Self {
        Self {
            yield_interval: yield_interval.max(1),
        }
    }
}

impl Strategy for ExactMatch {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Exact
    }

    fn detect<'a>(
        &'a self,
        files: &'a [Arc<FileRecord>],
        ctx: &'a ScanContext,
    ) -> BoxFuture<'a, StrategyResult> {
        Box::pin(async move {
            let mut by_key: IndexMap<(&str, u64), Vec<Arc<FileRecord>>> = IndexMap::new();

            for (i, file) in files.iter().enumerate() {
                if i % self.yield_interval == 0 {
                    check_cancelled(ctx)?;
                    if i > 0 {
                        tokio::task::yield_now().await;
                    }
                }
                by_key
                    .entry((file.name.as_str(), file.size))
                    .or_default()
                    .push(Arc::clone(file));
            }
            check_cancelled(ctx)?;

            Ok(by_key
                .into_values()
                .filter(|members| members.len() > 1)
                .map(|members| DuplicateGroup::new(DetectionMethod::Exact, members))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use twinfind_core::RecordId;

    fn file(id: u64, name: &str, size: u64) -> Arc<FileRecord> {
        Arc::new(FileRecord::file(id, name, size, DateTime::from_timestamp(0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_groups_identical_name_and_size() {
        let files = vec![
            file(1, "a.jpg", 1000),
            file(2, "a.jpg", 1000),
            file(3, "b.jpg", 1000),
            file(4, "a.jpg", 999),
        ];
        let groups = ExactMatch::new(5000)
            .detect(&files, &ScanContext::new())
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids(), vec![RecordId::from(1u64), RecordId::from(2u64)]);
        assert_eq!(groups[0].total_size, 2000);
    }

    #[tokio::test]
    async fn test_discovery_order() {
        let files = vec![
            file(1, "z.txt", 1),
            file(2, "a.txt", 1),
            file(3, "a.txt", 1),
            file(4, "z.txt", 1),
        ];
        let groups = ExactMatch::new(5000)
            .detect(&files, &ScanContext::new())
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members[0].name, "z.txt");
        assert_eq!(groups[1].members[0].name, "a.txt");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let groups = ExactMatch::new(5000)
            .detect(&[], &ScanContext::new())
            .await
            .unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ctx = ScanContext::new();
        ctx.cancel();
        let files = vec![file(1, "a", 1), file(2, "a", 1)];

        let result = ExactMatch::new(5000).detect(&files, &ctx).await;
        assert_eq!(result, Err(crate::StrategyError::Cancelled));
    }
}
