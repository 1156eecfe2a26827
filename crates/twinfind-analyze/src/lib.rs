//! Duplicate detection for twinfind.
//!
//! This crate contains the detection engine. It is pure: it never touches
//! the file system or the network, and works only on the records handed
//! to it.
//!
//! - **Strategies** - exact, size, similar-name, and content-hash matching
//! - **Detector** - runs the selected strategies concurrently and merges
//!   their groups
//! - **Keepers** - picks the surviving member of each group
//!
//! # Example
//!
//! ```rust,ignore
//! use twinfind_analyze::{Detector, MethodSelection, ScanContext, share};
//!
//! let files = share(records);
//! let (ctx, mut progress) = ScanContext::with_channel();
//!
//! let groups = Detector::new()
//!     .detect(&files, &MethodSelection::from_names(&["exact", "size"]), &ctx)
//!     .await?;
//!
//! for group in &groups {
//!     println!("{}: {} files", group.method, group.count());
//! }
//! ```
//!
//! # Cancellation
//!
//! Every call takes its own [`ScanContext`]. Cancelling its token makes the
//! running strategies stop at their next loop boundary, and the detector
//! then returns an empty list rather than an error.

mod context;
mod detector;
mod exact;
mod hash;
mod keeper;
mod similar;
pub mod similarity;
mod size;
mod strategy;
mod summary;

pub use context::{CallbackSink, NoProgress, ProgressSink, ScanContext};
pub use detector::{Detector, MethodSelection, share};
pub use exact::ExactMatch;
pub use hash::HashMatch;
pub use keeper::{GroupSelection, KeepPolicy, SelectionPlan, select_keepers};
pub use similar::NameSimilarity;
pub use size::SizeMatch;
pub use strategy::{BoxFuture, Strategy, StrategyError, StrategyResult, strategy_for};
pub use summary::DetectionSummary;

// Re-export core types
pub use twinfind_core::{
    DetectError, DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord, ProgressEvent,
    RecordId,
};
