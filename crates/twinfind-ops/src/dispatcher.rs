//! Choosing where detection runs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use twinfind_analyze::{Detector, MethodSelection, ProgressSink, ScanContext, share};
use twinfind_core::{DetectError, DetectionConfig, DuplicateGroup, FileRecord, ProgressEvent};

use crate::DETECTION_CHANNEL_SIZE;
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::worker::Worker;

/// Where a detection run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// On the calling task.
    Inline,
    /// On a dedicated worker thread.
    Worker,
}

/// Runs detection inline or on a worker, depending on input size.
///
/// Both paths drive the same [`Detector`], so they return the same groups.
/// If the worker cannot be started, reports an error, or exits without a
/// result, the run is repeated inline.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    detector: Detector,
    force_inline: bool,
}

impl Dispatcher {
    /// Create a dispatcher with custom configuration.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            detector: Detector::with_config(config),
            force_inline: false,
        }
    }

    /// Never use a worker.
    pub fn inline_only(mut self) -> Self {
        self.force_inline = true;
        self
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Execution context for a dataset of `len` records.
    pub fn execution_for(&self, len: usize) -> Execution {
        if !self.force_inline && self.detector.config().wants_worker(len) {
            Execution::Worker
        } else {
            Execution::Inline
        }
    }

    /// Find duplicate groups.
    pub async fn detect(
        &self,
        files: Vec<FileRecord>,
        methods: MethodSelection,
        ctx: ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        if ctx.is_cancelled() {
            return Ok(Vec::new());
        }

        let execution = self.execution_for(files.len());
        tracing::debug!(records = files.len(), ?execution, %methods, "Dispatching detection");
        let records = share(files);

        if execution == Execution::Worker {
            match self.detect_in_worker(records.clone(), methods.clone(), &ctx).await {
                Ok(groups) => return Ok(groups),
                Err(err) => {
                    tracing::warn!(error = %err, "Worker detection failed, running inline");
                }
            }
        }

        self.detector.detect(&records, &methods, &ctx).await
    }

    async fn detect_in_worker(
        &self,
        files: Vec<Arc<FileRecord>>,
        methods: MethodSelection,
        ctx: &ScanContext,
    ) -> Result<Vec<DuplicateGroup>, DetectError> {
        let mut worker = Worker::spawn(self.detector.config().clone())?;
        worker.send(WorkerRequest::DetectDuplicates { files, methods })?;

        let cancel = ctx.cancel_token().clone();
        let mut cancel_sent = false;

        loop {
            tokio::select! {
                response = worker.recv() => match response {
                    Some(WorkerResponse::Progress { current, total, message }) => {
                        ctx.report(current, total, message);
                    }
                    Some(WorkerResponse::Complete { groups }) => {
                        // Same rule as inline: a scan cancelled before it
                        // finished yields nothing.
                        if ctx.is_cancelled() {
                            return Ok(Vec::new());
                        }
                        return Ok(groups);
                    }
                    Some(WorkerResponse::Error { reason }) => return Err(DetectError::engine(reason)),
                    None => {
                        return Err(DetectError::dispatch("worker exited without a result"));
                    }
                },
                _ = cancel.cancelled(), if !cancel_sent => {
                    cancel_sent = true;
                    // A worker that already exited shows up as `None` above.
                    let _ = worker.send(WorkerRequest::Cancel);
                }
            }
        }
    }
}

/// Event sent by [`start_detection`].
#[derive(Debug)]
pub enum DetectionEvent {
    Progress(ProgressEvent),
    Complete(Vec<DuplicateGroup>),
    Failed(DetectError),
}

/// Cancels a detection started with [`start_detection`].
#[derive(Debug, Clone)]
pub struct DetectionHandle {
    cancel: CancellationToken,
}

impl DetectionHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Progress forwarding for [`start_detection`]. Drops events when the
/// channel is full rather than blocking the scan.
struct EventSink(mpsc::Sender<DetectionEvent>);

impl ProgressSink for EventSink {
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.0.try_send(DetectionEvent::Progress(event));
    }
}

/// Start detection in the background.
///
/// The receiver yields zero or more [`DetectionEvent::Progress`] events,
/// then exactly one `Complete` or `Failed`.
pub fn start_detection(
    dispatcher: Dispatcher,
    files: Vec<FileRecord>,
    methods: MethodSelection,
) -> (DetectionHandle, mpsc::Receiver<DetectionEvent>) {
    let (tx, rx) = mpsc::channel(DETECTION_CHANNEL_SIZE);
    let cancel = CancellationToken::new();
    let ctx = ScanContext::new()
        .with_cancel(cancel.clone())
        .with_progress(EventSink(tx.clone()));

    tokio::spawn(async move {
        let event = match dispatcher.detect(files, methods, ctx).await {
            Ok(groups) => DetectionEvent::Complete(groups),
            Err(err) => DetectionEvent::Failed(err),
        };
        let _ = tx.send(event).await;
    });

    (DetectionHandle { cancel }, rx)
}
