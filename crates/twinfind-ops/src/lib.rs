//! Execution contexts and collaborators for twinfind.
//!
//! This crate runs the detection engine from `twinfind-analyze` either on
//! the calling task or on a dedicated worker thread, and provides the
//! listing and deletion collaborators around it. Long-running work reports
//! progress through channels, like the deletion pipeline does.

mod deletion;
mod dispatcher;
mod error;
mod listing;
mod progress;
mod protocol;
mod worker;

pub use deletion::{
    DeletionProvider, DeletionResult, DryRunProvider, deletion_targets, start_deletion,
};
pub use dispatcher::{DetectionEvent, DetectionHandle, Dispatcher, Execution, start_detection};
pub use error::OperationError;
pub use listing::{FileListing, JsonListing};
pub use progress::{DeletionComplete, DeletionProgress};
pub use protocol::{WorkerRequest, WorkerResponse};
pub use worker::{WORKER_THREAD_NAME, Worker};

/// Default channel buffer size for deletion progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;

/// Default channel buffer size for detection events.
pub const DETECTION_CHANNEL_SIZE: usize = 100;
