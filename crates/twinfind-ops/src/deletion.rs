//! Deleting deletion candidates through an external provider.

use std::sync::Arc;

use tokio::sync::mpsc;

use twinfind_analyze::{BoxFuture, SelectionPlan};
use twinfind_core::RecordId;

use crate::progress::{DeletionComplete, DeletionProgress};
use crate::{OPERATION_CHANNEL_SIZE, OperationError};

/// Something that can delete a record by id.
pub trait DeletionProvider: Send + Sync {
    fn delete<'a>(&'a self, id: &'a RecordId) -> BoxFuture<'a, Result<(), OperationError>>;
}

/// Provider that deletes nothing and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunProvider;

impl DeletionProvider for DryRunProvider {
    fn delete<'a>(&'a self, id: &'a RecordId) -> BoxFuture<'a, Result<(), OperationError>> {
        Box::pin(async move {
            tracing::info!(%id, "Would delete");
            Ok(())
        })
    }
}

/// Result sent through the channel during deletion.
#[derive(Debug, Clone)]
pub enum DeletionResult {
    /// Progress update.
    Progress(DeletionProgress),
    /// The deletion finished.
    Complete(DeletionComplete),
}

/// `(id, size)` pairs for every deletion candidate in `plan`.
pub fn deletion_targets(plan: &SelectionPlan) -> Vec<(RecordId, u64)> {
    plan.deletion_candidates()
        .into_iter()
        .map(|c| (c.id.clone(), c.size))
        .collect()
}

/// Start background deletion.
///
/// Takes a list of `(id, size)` pairs and returns a receiver for progress
/// updates, ending with exactly one [`DeletionResult::Complete`]. Items are
/// deleted one at a time; a failure does not stop the rest.
pub fn start_deletion(
    provider: Arc<dyn DeletionProvider>,
    items: Vec<(RecordId, u64)>,
) -> mpsc::Receiver<DeletionResult> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::spawn(async move {
        let mut progress = DeletionProgress::new(items.len());
        let mut errors = Vec::new();

        for (i, (id, size)) in items.iter().enumerate() {
            progress.current = i;
            progress.current_id = Some(id.clone());
            progress.message = format!("Deleting {id}");
            let _ = tx.send(DeletionResult::Progress(progress.clone())).await;

            match provider.delete(id).await {
                Ok(()) => {
                    progress.deleted += 1;
                    progress.bytes_freed += size;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Deletion failed");
                    progress.failed += 1;
                    errors.push(err);
                }
            }
        }

        progress.current = progress.total;
        progress.current_id = None;
        progress.message = "Deletion finished".to_string();
        let _ = tx.send(DeletionResult::Progress(progress.clone())).await;

        let _ = tx
            .send(DeletionResult::Complete(DeletionComplete {
                deleted: progress.deleted,
                failed: progress.failed,
                bytes_freed: progress.bytes_freed,
                errors,
            }))
            .await;
    });

    rx
}
