use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A delayed task that can be cancelled until it fires
///
/// Dropping the handle does not cancel the task; call [`ScheduledTask::cancel`].
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
    delay: Duration,
}

impl ScheduledTask {
    /// Runs `task` once after `delay`
    pub fn spawn<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        Self { handle, delay }
    }

    pub fn cancel(self) {
        self.handle.abort();
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Scheduled task cancelled");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
