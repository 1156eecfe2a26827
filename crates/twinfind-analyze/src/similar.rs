//! Fuzzy file-name matching.
//!
//! Names are first normalized with [`comparable_name`], then indexed by
//! extension and by length. For each seed, only the smaller of its two index
//! buckets is searched. A cheap pre-check discards unpromising pairs before
//! the full metric runs.
//!
//! Clustering is greedy single-linkage against the seed: a candidate joins if
//! it is similar to the seed, not to every other member. Two members of one
//! group are therefore not guaranteed to be similar to each other.

use std::collections::HashMap;
use std::sync::Arc;

use twinfind_core::{DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::similarity::{comparable_name, name_similarity, passes_precheck};
use crate::strategy::{BoxFuture, Strategy, StrategyError, StrategyResult, check_cancelled};

/// Groups records with fuzzy-similar names.
#[derive(Debug, Clone)]
pub struct NameSimilarity {
    threshold: f64,
    chunk_size: usize,
    edit_distance_max_len: usize,
}

impl NameSimilarity {
    /// Create the strategy.
    pub fn new(threshold: f64, chunk_size: usize, edit_distance_max_len: usize) -> Self {
        Self {
            threshold,
            chunk_size,
            edit_distance_max_len,
        }
    }

    /// Create the strategy from a detection config.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.similarity_threshold,
            config.chunk_size,
            config.edit_distance_max_len,
        )
    }
}

/// Normalized names plus the extension and length indices over them.
struct NameIndex {
    names: Vec<String>,
    extensions: Vec<String>,
    lengths: Vec<usize>,
    by_extension: HashMap<String, Vec<usize>>,
    by_length: HashMap<usize, Vec<usize>>,
}

impl NameIndex {
    fn build(files: &[Arc<FileRecord>]) -> Self {
        let names: Vec<String> = files.iter().map(|f| comparable_name(&f.name)).collect();
        let extensions: Vec<String> = files.iter().map(|f| f.extension()).collect();
        let lengths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();

        let mut by_extension: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_length: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..files.len() {
            by_extension.entry(extensions[i].clone()).or_default().push(i);
            by_length.entry(lengths[i]).or_default().push(i);
        }

        Self {
            names,
            extensions,
            lengths,
            by_extension,
            by_length,
        }
    }

    /// The smaller of the seed's extension and length buckets.
    fn candidates(&self, seed: usize) -> &[usize] {
        let by_ext = self
            .by_extension
            .get(&self.extensions[seed])
            .map(Vec::as_slice)
            .unwrap_or_default();
        let by_len = self
            .by_length
            .get(&self.lengths[seed])
            .map(Vec::as_slice)
            .unwrap_or_default();

        if by_ext.len() <= by_len.len() {
            by_ext
        } else {
            by_len
        }
    }
}

impl Strategy for NameSimilarity {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Similar
    }

    fn detect<'a>(
        &'a self,
        files: &'a [Arc<FileRecord>],
        ctx: &'a ScanContext,
    ) -> BoxFuture<'a, StrategyResult> {
        Box::pin(async move {
            if self.chunk_size == 0 {
                return Err(StrategyError::Failed {
                    method: DetectionMethod::Similar,
                    reason: "chunk size must be greater than zero".to_string(),
                });
            }
            check_cancelled(ctx)?;

            let total = files.len();
            let index = NameIndex::build(files);
            let mut processed = vec![false; total];
            let mut groups = Vec::new();
            let chunk_count = total.div_ceil(self.chunk_size);

            for (chunk_no, chunk_start) in (0..total).step_by(self.chunk_size).enumerate() {
                check_cancelled(ctx)?;
                let chunk_end = (chunk_start + self.chunk_size).min(total);

                for seed in chunk_start..chunk_end {
                    if processed[seed] {
                        continue;
                    }
                    processed[seed] = true;

                    let seed_name = &index.names[seed];
                    let mut members = vec![Arc::clone(&files[seed])];

                    for &candidate in index.candidates(seed) {
                        if candidate == seed || processed[candidate] {
                            continue;
                        }
                        let candidate_name = &index.names[candidate];
                        if !passes_precheck(seed_name, candidate_name) {
                            continue;
                        }
                        let similarity =
                            name_similarity(seed_name, candidate_name, self.edit_distance_max_len);
                        if similarity >= self.threshold {
                            processed[candidate] = true;
                            members.push(Arc::clone(&files[candidate]));
                        }
                    }

                    if members.len() > 1 {
                        groups.push(DuplicateGroup::new(DetectionMethod::Similar, members));
                    }
                }

                ctx.report(
                    chunk_end,
                    total,
                    format!(
                        "{}: chunk {}/{}",
                        DetectionMethod::Similar.label(),
                        chunk_no + 1,
                        chunk_count
                    ),
                );
                tokio::task::yield_now().await;
            }
            check_cancelled(ctx)?;

            Ok(groups)
        })
    }
}
