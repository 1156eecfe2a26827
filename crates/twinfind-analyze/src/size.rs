//! Size matching within a relative tolerance.
//!
//! Records are partitioned into logarithmic buckets so that only files of
//! comparable magnitude are ever compared:
//!
//! ```text
//! bucket = floor(log10(size) * 10)
//! ```
//!
//! Inside a bucket, records are sorted by size and swept greedily: the
//! smallest unprocessed record seeds a group and absorbs every later record
//! with `(max - min) / min <= tolerance`. Absorbed records are not considered
//! again, so each record lands in at most one size group.

use std::sync::Arc;

use indexmap::IndexMap;

use twinfind_core::{DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::strategy::{BoxFuture, Strategy, StrategyResult, check_cancelled};

/// Groups records whose sizes are within a relative tolerance.
#[derive(Debug, Clone)]
pub struct SizeMatch {
    tolerance: f64,
}

impl SizeMatch {
    /// Create the strategy with a relative tolerance (0.01 = 1%).
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Logarithmic bucket for a non-zero size.
    pub fn bucket(size: u64) -> i64 {
        ((size as f64).log10() * 10.0).floor() as i64
    }

    /// Relative difference measured against the smaller size.
    pub fn relative_difference(a: u64, b: u64) -> f64 {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        (max - min) as f64 / min as f64
    }

    fn sweep(&self, mut bucket: Vec<Arc<FileRecord>>) -> Vec<DuplicateGroup> {
        bucket.sort_by_key(|f| f.size);

        let mut processed = vec![false; bucket.len()];
        let mut groups = Vec::new();

        for i in 0..bucket.len() {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let seed = &bucket[i];
            let mut members = vec![Arc::clone(seed)];

            for j in (i + 1)..bucket.len() {
                if processed[j] {
                    continue;
                }
                // Sorted ascending, so once one record is out of range all
                // later ones are too.
                if Self::relative_difference(seed.size, bucket[j].size) > self.tolerance {
                    break;
                }
                processed[j] = true;
                members.push(Arc::clone(&bucket[j]));
            }

            if members.len() > 1 {
                groups.push(DuplicateGroup::new(DetectionMethod::Size, members));
            }
        }

        groups
    }
}

impl Strategy for SizeMatch {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Size
    }

    fn detect<'a>(
        &'a self,
        files: &'a [Arc<FileRecord>],
        ctx: &'a ScanContext,
    ) -> BoxFuture<'a, StrategyResult> {
        Box::pin(async move {
            check_cancelled(ctx)?;

            let mut buckets: IndexMap<i64, Vec<Arc<FileRecord>>> = IndexMap::new();
            for file in files.iter().filter(|f| f.size > 0) {
                buckets
                    .entry(Self::bucket(file.size))
                    .or_default()
                    .push(Arc::clone(file));
            }

            let mut groups = Vec::new();
            for (_, bucket) in buckets {
                check_cancelled(ctx)?;
                groups.extend(self.sweep(bucket));
                tokio::task::yield_now().await;
            }
            check_cancelled(ctx)?;

            Ok(groups)
        })
    }
}
