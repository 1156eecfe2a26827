//! Detection on a dedicated thread.
//!
//! The worker owns a current-thread tokio runtime on its own OS thread and
//! talks to its caller only through [`WorkerRequest`] and [`WorkerResponse`]
//! messages. Records arrive as immutable `Arc`s; no other state is shared.

use std::thread;

use tokio::sync::mpsc;

use twinfind_analyze::{Detector, ProgressSink, ScanContext};
use twinfind_core::{DetectError, DetectionConfig, ProgressEvent};

use crate::protocol::{WorkerRequest, WorkerResponse};

/// Name given to worker threads.
pub const WORKER_THREAD_NAME: &str = "twinfind-worker";

/// Forwards progress events as [`WorkerResponse::Progress`] messages.
struct ResponseSink(mpsc::UnboundedSender<WorkerResponse>);

impl ProgressSink for ResponseSink {
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.0.send(event.into());
    }
}

/// Caller-side handle to a running worker.
///
/// Dropping the handle closes the request channel, which cancels any
/// running detection and lets the thread exit.
#[derive(Debug)]
pub struct Worker {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    responses: mpsc::UnboundedReceiver<WorkerResponse>,
}

impl Worker {
    /// Start a worker thread.
    pub fn spawn(config: DetectionConfig) -> Result<Self, DetectError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DetectError::dispatch(format!("failed to build worker runtime: {e}")))?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let detector = Detector::with_config(config);

        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(serve(detector, request_rx, response_tx)))
            .map_err(|e| DetectError::dispatch(format!("failed to spawn worker thread: {e}")))?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
        })
    }

    /// Send a request to the worker.
    pub fn send(&self, request: WorkerRequest) -> Result<(), DetectError> {
        self.requests
            .send(request)
            .map_err(|_| DetectError::dispatch("worker is no longer running"))
    }

    /// Receive the next response, or `None` once the worker has exited.
    pub async fn recv(&mut self) -> Option<WorkerResponse> {
        self.responses.recv().await
    }
}

/// Worker message loop. Runs until the request channel closes.
async fn serve(
    detector: Detector,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    responses: mpsc::UnboundedSender<WorkerResponse>,
) {
    while let Some(request) = requests.recv().await {
        let WorkerRequest::DetectDuplicates { files, methods } = request else {
            // Nothing is running.
            continue;
        };

        let ctx = ScanContext::new().with_progress(ResponseSink(responses.clone()));
        let cancel = ctx.cancel_token().clone();

        let run = detector.detect(&files, &methods, &ctx);
        tokio::pin!(run);

        let mut open = true;
        let result = loop {
            tokio::select! {
                result = &mut run => break result,
                message = requests.recv(), if open => match message {
                    Some(WorkerRequest::Cancel) => cancel.cancel(),
                    Some(WorkerRequest::DetectDuplicates { .. }) => {
                        tracing::warn!("Worker busy, ignoring detection request");
                    }
                    None => {
                        open = false;
                        cancel.cancel();
                    }
                },
            }
        };

        let response = match result {
            Ok(groups) => WorkerResponse::Complete { groups },
            Err(err) => WorkerResponse::Error {
                reason: err.to_string(),
            },
        };
        if responses.send(response).is_err() || !open {
            break;
        }
    }
}
