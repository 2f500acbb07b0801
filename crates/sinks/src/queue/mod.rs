//! Serialized write queue
//!
//! Any number of producers submit events; a single worker applies them to
//! the file one at a time, in the order they were accepted.
//!
//! # Architecture
//!
//! ```text
//! [submit()] --WriteTask--> [unbounded channel] --> [worker] --> [FileHandleManager]
//!     |                                                |
//!     +---------- WriteCompletion <---- oneshot -------+
//! ```
//!
//! `submit` never blocks on I/O: it pushes onto the channel and returns a
//! [`WriteCompletion`] that resolves once the event is flushed or its
//! failure has been reported. The worker runs on tokio's blocking pool and
//! owns the file handle outright, so file I/O is never concurrent.
//!
//! Per event the worker:
//!
//! 1. appends every line, each stamped as it is written, opening or
//!    reopening the handle first when needed
//! 2. flushes
//! 3. re-reads the live size from disk and rotates when the policy says so
//!
//! A failure at any step goes to [`Diagnostics`] and the next event still
//! runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::common::{SinkError, SinkMetrics};
use crate::event::LogEvent;
use crate::file_handle::{AppendStats, FileHandleManager, HandleMode};
use crate::rotation::{RotationPolicy, execute_plan};
use crate::util::Diagnostics;

/// How a submitted event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every line reached the file and was flushed
    Flushed,
    /// The write failed; the failure went to the diagnostic channel
    Failed,
    /// The queue had already shut down; nothing was written
    Closed,
}

impl WriteOutcome {
    pub fn is_flushed(&self) -> bool {
        matches!(self, Self::Flushed)
    }
}

/// Resolves when a submitted event has been processed
///
/// Dropping it is fine: the event is still written.
#[derive(Debug)]
#[must_use = "await the completion or drop it explicitly for fire-and-forget writes"]
pub struct WriteCompletion {
    receiver: Option<oneshot::Receiver<WriteOutcome>>,
}

impl WriteCompletion {
    fn pending(receiver: oneshot::Receiver<WriteOutcome>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    fn closed() -> Self {
        Self { receiver: None }
    }
}

impl Future for WriteCompletion {
    type Output = WriteOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().receiver.as_mut() {
            None => Poll::Ready(WriteOutcome::Closed),
            // Sender dropped without answering: the worker died mid-event
            Some(rx) => Pin::new(rx)
                .poll(cx)
                .map(|r| r.unwrap_or(WriteOutcome::Failed)),
        }
    }
}

/// One event plus its completion signal, owned by the queue until answered
struct WriteTask {
    event: LogEvent,
    done: oneshot::Sender<WriteOutcome>,
}

/// FIFO queue with a single writer
pub struct WriteQueue {
    /// Entry point for producers; `None` once shut down
    sender: Mutex<Option<mpsc::UnboundedSender<WriteTask>>>,

    /// Worker handle, taken by the first `shutdown`
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,

    metrics: Arc<SinkMetrics>,
}

impl WriteQueue {
    /// Spawn the worker and return the producer side
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        files: FileHandleManager,
        policy: RotationPolicy,
        diagnostics: Arc<dyn Diagnostics>,
        metrics: Arc<SinkMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let worker = QueueWorker {
            files,
            policy,
            diagnostics,
            metrics: Arc::clone(&metrics),
        };
        let handle = tokio::task::spawn_blocking(move || worker.run(receiver));

        Self {
            sender: Mutex::new(Some(sender)),
            worker: tokio::sync::Mutex::new(Some(handle)),
            metrics,
        }
    }

    /// Queue an event behind everything accepted before it
    ///
    /// Never blocks on I/O. After shutdown the completion resolves to
    /// [`WriteOutcome::Closed`] immediately.
    pub fn submit(&self, event: LogEvent) -> WriteCompletion {
        let (done, receiver) = oneshot::channel();
        let task = WriteTask { event, done };

        // Held across the send so acceptance order is channel order
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.metrics.record_rejected();
            return WriteCompletion::closed();
        };

        match sender.send(task) {
            Ok(()) => {
                self.metrics.record_received();
                WriteCompletion::pending(receiver)
            }
            Err(_) => {
                self.metrics.record_rejected();
                WriteCompletion::closed()
            }
        }
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stop accepting events, drain the queue and release the file
    ///
    /// Safe to call more than once; later calls wait for the first drain to
    /// finish and then return without touching the file.
    pub async fn shutdown(&self) {
        let mut worker = self.worker.lock().await;

        // Dropping the last sender ends the worker loop once it is drained
        drop(self.sender.lock().take());

        if let Some(handle) = worker.take()
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "write queue worker terminated abnormally");
        }
    }
}

/// State owned by the worker thread
struct QueueWorker {
    files: FileHandleManager,
    policy: RotationPolicy,
    diagnostics: Arc<dyn Diagnostics>,
    metrics: Arc<SinkMetrics>,
}

impl QueueWorker {
    fn run(mut self, mut receiver: mpsc::UnboundedReceiver<WriteTask>) {
        tracing::debug!(path = %self.files.path().display(), "write queue started");

        while let Some(task) = receiver.blocking_recv() {
            let outcome = self.apply(&task.event);
            // Producer may have dropped its completion
            let _ = task.done.send(outcome);
        }

        if let Err(e) = self.files.close() {
            self.report(&e);
        }

        tracing::debug!(path = %self.files.path().display(), "write queue drained");
    }

    fn apply(&mut self, event: &LogEvent) -> WriteOutcome {
        let outcome = match self.write_event(event) {
            Ok(stats) => {
                self.metrics.record_written(stats.lines, stats.bytes);
                WriteOutcome::Flushed
            }
            Err(e) => {
                self.metrics.record_write_error();
                self.report(&e);
                WriteOutcome::Failed
            }
        };

        self.rotate_if_needed();
        outcome
    }

    fn write_event(&mut self, event: &LogEvent) -> Result<AppendStats, SinkError> {
        // append_lines opens or reopens the handle itself
        let stats = self.files.append_lines(event.lines())?;
        self.files.flush()?;
        Ok(stats)
    }

    /// Rotate when the size on disk has reached the threshold
    ///
    /// The size is read from the filesystem every time so external
    /// truncation or rotation is picked up.
    fn rotate_if_needed(&mut self) {
        if !self.policy.is_enabled() {
            return;
        }

        let size = match self.files.current_size() {
            Ok(size) => size,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        if !self.policy.should_rotate(size) {
            return;
        }

        // The handle goes away even if its final flush fails
        if let Err(e) = self.files.close() {
            self.report(&e);
        }

        let plan = self.policy.plan(self.files.path());
        match execute_plan(&plan) {
            Ok(()) => {
                self.metrics.record_rotation();
                tracing::info!(
                    path = %self.files.path().display(),
                    size,
                    backups = self.policy.backup_count,
                    "log file rotated"
                );
            }
            Err(e) => {
                self.metrics.record_rotation_error();
                self.report(&e);
            }
        }

        if self.files.mode() == HandleMode::Persistent
            && let Err(e) = self.files.ensure_open()
        {
            self.report(&e);
        }
    }

    fn report(&self, failure: &SinkError) {
        self.diagnostics.report(failure);
    }
}
