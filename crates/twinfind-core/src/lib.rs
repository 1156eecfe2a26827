//! Core types and configuration for twinfind.
//!
//! This crate provides the vocabulary shared by the detection engine and its
//! callers: file records, duplicate groups, method names, progress events,
//! and configuration.

mod config;
mod error;
mod group;
mod method;
mod record;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_EDIT_DISTANCE_MAX_LEN, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_SIZE_TOLERANCE, DEFAULT_WORKER_THRESHOLD, DEFAULT_YIELD_INTERVAL, DetectionConfig,
    DetectionConfigBuilder,
};
pub use error::{ConfigError, DetectError};
pub use group::{DuplicateGroup, ProgressEvent};
pub use method::DetectionMethod;
pub use record::{FileRecord, RecordId};
