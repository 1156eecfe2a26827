//! Strategy orchestration.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use twinfind_core::{DetectError, DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::strategy::{Strategy, StrategyError, strategy_for};

/// Ordered, de-duplicated list of detection methods to run.
///
/// An empty selection always resolves to [`DetectionMethod::DEFAULTS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DetectionMethod>", into = "Vec<DetectionMethod>")]
pub struct MethodSelection {
    methods: Vec<DetectionMethod>,
}

impl MethodSelection {
    /// Select `methods` in the given order, dropping repeats.
    pub fn new(methods: impl IntoIterator<Item = DetectionMethod>) -> Self {
        let mut selected = Vec::new();
        for method in methods {
            if !selected.contains(&method) {
                selected.push(method);
            }
        }
        if selected.is_empty() {
            selected.extend(DetectionMethod::DEFAULTS);
        }
        Self { methods: selected }
    }

    /// Parse method names, skipping (and logging) unknown ones.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let methods = names.iter().filter_map(|name| {
            let name = name.as_ref().trim();
            match name.parse::<DetectionMethod>() {
                Ok(method) => Some(method),
                Err(_) => {
                    tracing::warn!(method = name, "Unknown detection method, skipping");
                    None
                }
            }
        });
        Self::new(methods)
    }

    /// Methods in run order.
    pub fn methods(&self) -> &[DetectionMethod] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Default for MethodSelection {
    fn default() -> Self {
        Self::new(DetectionMethod::DEFAULTS)
    }
}

impl From<Vec<DetectionMethod>> for MethodSelection {
    fn from(methods: Vec<DetectionMethod>) -> Self {
        Self::new(methods)
    }
}

impl From<MethodSelection> for Vec<DetectionMethod> {
    fn from(selection: MethodSelection) -> Self {
        selection.methods
    }
}

impl fmt::Display for MethodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{method}")?;
        }
        Ok(())
    }
}

/// Wrap owned records for sharing between strategies and groups.
pub fn share(records: Vec<FileRecord>) -> Vec<Arc<FileRecord>> {
    records.into_iter().map(Arc::new).collect()
}

/// Runs the selected strategies over a record list and merges their output.
///
/// The detector holds no per-scan state. Cancellation and progress live in
/// the [`ScanContext`] passed to each call, so one detector can serve any
/// number of concurrent scans.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectionConfig,
}

impl Detector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Find duplicate groups.
    ///
    /// Input errors (an empty list) are logged and answered with an empty
    /// result. A cancelled scan also returns an empty result.
    pub async fn detect(
        &self,
        files: &[Arc<FileRecord>],
        methods: &MethodSelection,
        ctx: &ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        match self.run(files, methods, ctx).await {
            Err(err) if err.is_input_error() => {
                tracing::warn!(error = %err, "Skipping detection");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Find duplicate groups among owned records.
    pub async fn detect_records(
        &self,
        records: Vec<FileRecord>,
        methods: &MethodSelection,
        ctx: &ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        self.detect(&share(records), methods, ctx).await
    }

    /// Like [`detect`](Self::detect), but input errors are returned.
    pub async fn run(
        &self,
        files: &[Arc<FileRecord>],
        methods: &MethodSelection,
        ctx: &ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        let strategies: Vec<Box<dyn Strategy>> = methods
            .methods()
            .iter()
            .map(|&method| strategy_for(method, &self.config))
            .collect();
        self.run_strategies(&strategies, files, ctx).await
    }

    /// Run an explicit set of strategies.
    ///
    /// Strategies are polled concurrently on the current task. A strategy
    /// that fails or panics contributes nothing; the others are unaffected.
    /// Groups are returned in strategy order.
    pub async fn run_strategies(
        &self,
        strategies: &[Box<dyn Strategy>],
        files: &[Arc<FileRecord>],
        ctx: &ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        let candidates = candidates(files)?;
        let progress = MethodProgress::new(ctx, strategies.len());
        let started = Instant::now();

        let runs = strategies
            .iter()
            .map(|strategy| run_one(strategy.as_ref(), &candidates, &progress));
        let per_method = join_all(runs).await;

        if ctx.is_cancelled() {
            tracing::debug!("Detection cancelled, discarding results");
            return Ok(Vec::new());
        }

        let groups: Vec<DuplicateGroup> = per_method.into_iter().flatten().collect();
        tracing::debug!(
            records = candidates.len(),
            groups = groups.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Detection finished"
        );
        Ok(groups)
    }
}

/// Drop containers and malformed records.
fn candidates(files: &[Arc<FileRecord>]) -> Result<Vec<Arc<FileRecord>>, DetectError> {
    if files.is_empty() {
        return Err(DetectError::EmptyInput);
    }

    let mut kept = Vec::with_capacity(files.len());
    for file in files {
        if !file.is_well_formed() {
            let err = DetectError::MalformedRecord {
                id: file.id.clone(),
            };
            tracing::warn!(error = %err, "Ignoring record");
            continue;
        }
        if !file.is_container {
            kept.push(Arc::clone(file));
        }
    }
    Ok(kept)
}

/// Progress on a single scale: methods finished out of methods requested.
///
/// Strategies run concurrently and finish in any order, so events carry the
/// running count of finished methods rather than a method index. Events a
/// strategy reports on its own scale keep their message but are re-scaled.
#[derive(Clone)]
struct MethodProgress {
    ctx: ScanContext,
    finished: Arc<AtomicUsize>,
    total: usize,
}

impl MethodProgress {
    fn new(ctx: &ScanContext, total: usize) -> Self {
        Self {
            ctx: ctx.clone(),
            finished: Arc::new(AtomicUsize::new(0)),
            total,
        }
    }

    fn report(&self, message: impl Into<String>) {
        self.ctx
            .report(self.finished.load(Ordering::SeqCst), self.total, message);
    }

    fn finish(&self, message: impl Into<String>) {
        let finished = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
        self.ctx.report(finished, self.total, message);
    }

    /// Context for one strategy. Shares the scan's cancellation token.
    fn strategy_context(&self) -> ScanContext {
        let progress = self.clone();
        self.ctx
            .clone()
            .with_callback(move |event| progress.report(event.message))
    }
}

async fn run_one(
    strategy: &dyn Strategy,
    files: &[Arc<FileRecord>],
    progress: &MethodProgress,
) -> Vec<DuplicateGroup> {
    let method = strategy.method();
    let started = Instant::now();
    let ctx = progress.strategy_context();
    progress.report(format!("{}: started", method.label()));

    let outcome = AssertUnwindSafe(strategy.detect(files, &ctx))
        .catch_unwind()
        .await;

    let groups = match outcome {
        Ok(Ok(groups)) => groups,
        Ok(Err(StrategyError::Cancelled)) => {
            tracing::debug!(%method, "Strategy cancelled");
            Vec::new()
        }
        Ok(Err(err)) => {
            tracing::warn!(%method, error = %err, "Strategy failed");
            Vec::new()
        }
        Err(panic) => {
            tracing::warn!(%method, reason = %panic_message(&*panic), "Strategy panicked");
            Vec::new()
        }
    };

    let groups: Vec<DuplicateGroup> = groups
        .into_iter()
        .map(|group| DuplicateGroup::new(method, group.members))
        .filter(|group| {
            let valid = group.is_valid();
            if !valid {
                tracing::debug!(%method, members = group.count(), "Dropping invalid group");
            }
            valid
        })
        .collect();

    tracing::debug!(
        %method,
        groups = groups.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Strategy finished"
    );
    progress.finish(format!("{}: done", method.label()));

    groups
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
