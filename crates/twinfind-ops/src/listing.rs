//! Sources of file records.

use std::fs;
use std::path::{Path, PathBuf};

use twinfind_analyze::BoxFuture;
use twinfind_core::FileRecord;

use crate::OperationError;

/// Something that can list the records under a folder.
///
/// Implementations are responsible for recursing into sub-folders; the
/// engine only ever sees the flat result.
pub trait FileListing: Send + Sync {
    fn list<'a>(&'a self, folder: &'a str) -> BoxFuture<'a, Result<Vec<FileRecord>, OperationError>>;
}

/// Listing backed by JSON files on disk.
///
/// A folder resolves to `root/folder`. A file there must hold a JSON array of
/// records. A directory there is walked recursively and every `*.json` file
/// in it is read, in path order.
#[derive(Debug, Clone)]
pub struct JsonListing {
    root: PathBuf,
}

impl JsonListing {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileListing for JsonListing {
    fn list<'a>(&'a self, folder: &'a str) -> BoxFuture<'a, Result<Vec<FileRecord>, OperationError>> {
        let path = self.root.join(folder);
        Box::pin(async move {
            // Perform file I/O in a blocking task to not block the async runtime
            let task_path = path.clone();
            tokio::task::spawn_blocking(move || read_records(&task_path))
                .await
                .map_err(|e| OperationError::listing(path, e.to_string()))?
        })
    }
}

fn read_records(path: &Path) -> Result<Vec<FileRecord>, OperationError> {
    let metadata =
        fs::metadata(path).map_err(|e| OperationError::listing(path, e.to_string()))?;

    if !metadata.is_dir() {
        return read_file(path);
    }

    let mut files = Vec::new();
    collect_json_files(path, &mut files)?;
    files.sort();

    let mut records = Vec::new();
    for file in &files {
        records.extend(read_file(file)?);
    }
    tracing::debug!(
        path = %path.display(),
        files = files.len(),
        records = records.len(),
        "Read listing directory"
    );
    Ok(records)
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), OperationError> {
    let entries = fs::read_dir(dir).map_err(|e| OperationError::listing(dir, e.to_string()))?;

    for entry in entries {
        let entry = entry.map_err(|e| OperationError::listing(dir, e.to_string()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| OperationError::listing(&path, e.to_string()))?;

        if file_type.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<FileRecord>, OperationError> {
    let contents =
        fs::read_to_string(path).map_err(|e| OperationError::listing(path, e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| OperationError::listing(path, e.to_string()))
}
