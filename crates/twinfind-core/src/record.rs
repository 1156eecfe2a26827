//! File record types supplied by a listing provider.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Stable identifier for a record, assigned by the source system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub CompactString);

impl RecordId {
    /// Create a new RecordId.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(CompactString::from(id.to_string()))
    }
}

/// Metadata describing one remote file.
///
/// Records are immutable once handed to the engine; groups share them
/// through `Arc` instead of copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique identifier.
    pub id: RecordId,

    /// File name (not a full path).
    pub name: CompactString,

    /// Size in bytes.
    pub size: u64,

    /// Last modification time.
    pub last_modified: DateTime<Utc>,

    /// Content hash, present only when the source system supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<CompactString>,

    /// Folder-like entry. Containers never take part in detection.
    #[serde(default)]
    pub is_container: bool,
}

impl FileRecord {
    /// Create a regular file record.
    pub fn file(
        id: impl Into<RecordId>,
        name: impl Into<CompactString>,
        size: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size,
            last_modified,
            content_hash: None,
            is_container: false,
        }
    }

    /// Create a container (folder) record.
    pub fn container(
        id: impl Into<RecordId>,
        name: impl Into<CompactString>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: 0,
            last_modified,
            content_hash: None,
            is_container: true,
        }
    }

    /// Attach a content hash.
    pub fn with_hash(mut self, hash: impl Into<CompactString>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    /// Content hash, ignoring empty strings.
    pub fn hash(&self) -> Option<&str> {
        self.content_hash.as_deref().filter(|h| !h.is_empty())
    }

    /// Check the fields every strategy relies on.
    pub fn is_well_formed(&self) -> bool {
        !self.id.as_str().is_empty() && !self.name.is_empty()
    }

    /// Whether this record may take part in duplicate detection.
    pub fn is_candidate(&self) -> bool {
        !self.is_container && self.is_well_formed()
    }

    /// Lower-cased text after the last `.`, or empty when there is none.
    pub fn extension(&self) -> String {
        match self.name.rfind('.') {
            Some(idx) if idx + 1 < self.name.len() => self.name[idx + 1..].to_lowercase(),
            _ => String::new(),
        }
    }
}
