//! Detection strategy trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use twinfind_core::{DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord};

use crate::context::ScanContext;
use crate::exact::ExactMatch;
use crate::hash::HashMatch;
use crate::similar::NameSimilarity;
use crate::size::SizeMatch;

/// Type alias for boxed futures returned by strategies.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result type for strategies.
pub type StrategyResult = Result<Vec<DuplicateGroup>, StrategyError>;

/// Why a strategy produced no groups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// The scan was cancelled; partial work was discarded.
    #[error("Detection cancelled")]
    Cancelled,

    /// The strategy could not run.
    #[error("{method} detection failed: {reason}")]
    Failed {
        method: DetectionMethod,
        reason: String,
    },
}

/// One independent duplicate-detection heuristic.
///
/// Strategies are stateless apart from their configuration. They poll the
/// context's cancellation token only at their own loop boundaries and yield
/// to the scheduler there, never in the middle of a comparison.
pub trait Strategy: Send + Sync {
    /// The method tag stamped on every group this strategy emits.
    fn method(&self) -> DetectionMethod;

    /// Find duplicate groups among `files`.
    ///
    /// `files` contains only candidate (non-container, well-formed) records.
    fn detect<'a>(
        &'a self,
        files: &'a [Arc<FileRecord>],
        ctx: &'a ScanContext,
    ) -> BoxFuture<'a, StrategyResult>;
}

/// Build the strategy for `method`.
pub fn strategy_for(method: DetectionMethod, config: &DetectionConfig) -> Box<dyn Strategy> {
    match method {
        DetectionMethod::Exact => Box::new(ExactMatch::new(config.yield_interval)),
        DetectionMethod::Size => Box::new(SizeMatch::new(config.size_tolerance)),
        DetectionMethod::Similar => Box::new(NameSimilarity::from_config(config)),
        DetectionMethod::Hash => Box::new(HashMatch::new(config.yield_interval)),
    }
}

/// Return `Err(Cancelled)` if the scan was cancelled.
pub(crate) fn check_cancelled(ctx: &ScanContext) -> Result<(), StrategyError> {
    if ctx.is_cancelled() {
        Err(StrategyError::Cancelled)
    } else {
        Ok(())
    }
}
