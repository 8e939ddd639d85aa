use std::future::Future;
use std::time::Duration;

use futures::future::{abortable, AbortHandle};
use tokio::sync::Mutex;

/// A single-shot timer, that runs a task once its delay has elapsed.
///
/// Only the delay can be cancelled: once the task runs, it runs to completion.
/// Tasks must therefore check whether they are still relevant when they run.
///
/// Every arming is tagged with the race generation it belongs to.
/// A pending delay is never replaced by one of an older generation.
#[derive(Default)]
pub struct Timer {
    pending: Mutex<Option<(u64, AbortHandle)>>,
}

impl Timer {
    /// Arm the timer, disarming any previously armed task of the same
    /// or an older generation.
    ///
    /// Returns `false` and drops the task if a newer generation is pending.
    pub async fn arm<F>(&self, generation: u64, delay: Duration, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some((pending_generation, _)) = pending.as_ref() {
            if *pending_generation > generation {
                return false;
            }
        }

        let (delay, handle) = abortable(tokio::time::delay_for(delay));
        if let Some((_, prev)) = pending.replace((generation, handle)) {
            prev.abort();
        }
        let _ = tokio::spawn(async move {
            if delay.await.is_ok() {
                task.await;
            }
        });
        true
    }

    /// Disarm the timer. Returns `true` if a task was armed.
    pub async fn disarm(&self) -> bool {
        match self.pending.lock().await.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}
