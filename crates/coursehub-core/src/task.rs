//! Cancellable handle for background loops.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle returned by every `start()` that spawns a periodic loop.
///
/// The loop receives the paired `watch::Receiver<bool>` and must exit once
/// it observes `true`. Dropping the handle without calling [`stop`] also
/// signals cancellation, but does not wait for the loop to finish.
///
/// [`stop`]: TaskHandle::stop
#[derive(Debug)]
pub struct TaskHandle {
    /// Name used in log lines.
    name: &'static str,
    /// Cancellation signal.
    cancel: watch::Sender<bool>,
    /// The spawned loop.
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Create the cancellation pair for a loop about to be spawned.
    pub fn channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    /// Wrap an already spawned loop.
    pub fn new(name: &'static str, cancel: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self {
            name,
            cancel,
            task: Some(task),
        }
    }

    /// Whether the loop has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }

    /// Signal cancellation and wait for the loop to exit.
    pub async fn stop(mut self) {
        let _ = self.cancel.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(task = self.name, "Background task panicked: {}", e);
            }
        }
        tracing::debug!(task = self.name, "Background task stopped");
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
    }
}
