//! Per-invocation scan context: cancellation and progress reporting.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use twinfind_core::ProgressEvent;

/// Receiver of progress events.
///
/// Events are pushed one way with no backpressure; implementations must not
/// block.
pub trait ProgressSink: Send + Sync {
    /// Deliver one progress event.
    fn on_progress(&self, event: ProgressEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn on_progress(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event);
    }
}

/// Sink backed by a closure.
pub struct CallbackSink<F>(pub F);

impl<F> ProgressSink for CallbackSink<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        (self.0)(event);
    }
}

/// State owned by a single detection run.
///
/// Each scan gets its own context, so concurrent scans never share a
/// cancellation flag or a progress channel.
#[derive(Clone)]
pub struct ScanContext {
    cancel: CancellationToken,
    progress: Arc<dyn ProgressSink>,
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("progress", &"<sink>")
            .finish()
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanContext {
    /// Create a context with a fresh token and no progress reporting.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress: Arc::new(NoProgress),
        }
    }

    /// Use an existing cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send progress events to `sink`.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(sink);
        self
    }

    /// Send progress events to a closure.
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.with_progress(CallbackSink(callback))
    }

    /// Create a context paired with a channel receiving its progress events.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new().with_progress(tx), rx)
    }

    /// The cancellation token for this scan.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Emit a progress event.
    pub fn report(&self, current: usize, total: usize, message: impl Into<String>) {
        self.progress
            .on_progress(ProgressEvent::new(current, total, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = ScanContext::new();
        let clone = ctx.clone();

        assert!(!clone.is_cancelled());
        ctx.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_separate_contexts_are_independent() {
        let a = ScanContext::new();
        let b = ScanContext::new();
        a.cancel();
        assert!(!b.is_cancelled());
    }

    #[test]
    fn test_channel_sink() {
        let (ctx, mut rx) = ScanContext::with_channel();
        ctx.report(1, 2, "half");

        let event = rx.try_recv().unwrap();
        assert_eq!(event, ProgressEvent::new(1, 2, "half"));
    }

    #[test]
    fn test_callback_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let ctx = ScanContext::new().with_callback(move |e| sink.lock().unwrap().push(e.current));

        ctx.report(3, 10, "x");
        ctx.report(4, 10, "y");

        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_report_after_receiver_dropped() {
        let (ctx, rx) = ScanContext::with_channel();
        drop(rx);
        ctx.report(1, 1, "nobody listening");
    }
}
