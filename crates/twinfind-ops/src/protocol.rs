//! Messages exchanged with the detection worker.
//!
//! The JSON form is tagged by `type`:
//!
//! ```text
//! -> {"type":"detect_duplicates","files":[...],"methods":["exact","size"]}
//! <- {"type":"progress","current":1,"total":3,"message":"..."}   (zero or more)
//! <- {"type":"complete","groups":[...]}  or  {"type":"error","reason":"..."}
//! ```
//!
//! A `{"type":"cancel"}` request may be sent at any point before the terminal
//! response.
//!
//! Records travel as `Arc<FileRecord>`. They are immutable, so the caller can
//! keep its handle for an inline fallback without copying the list.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use twinfind_analyze::MethodSelection;
use twinfind_core::{DuplicateGroup, FileRecord, ProgressEvent};

/// Caller to worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Run detection over `files`.
    DetectDuplicates {
        files: Vec<Arc<FileRecord>>,
        #[serde(default)]
        methods: MethodSelection,
    },
    /// Stop the running detection. Its result will be empty.
    Cancel,
}

/// Worker to caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    Complete {
        groups: Vec<DuplicateGroup>,
    },
    Error {
        reason: String,
    },
}

impl WorkerResponse {
    /// Whether this is the last message for a request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

impl From<ProgressEvent> for WorkerResponse {
    fn from(event: ProgressEvent) -> Self {
        Self::Progress {
            current: event.current,
            total: event.total,
            message: event.message,
        }
    }
}
