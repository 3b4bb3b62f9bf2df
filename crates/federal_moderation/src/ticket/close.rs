use crate::ids::ChannelId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Pending ticket retirements, at most one per channel.
///
/// Each scheduled retirement is a spawned task that sleeps for the close
/// delay and then runs. Handles are kept so a retirement can be cancelled;
/// the task removes its own entry when it finishes.
#[derive(Debug, Clone, Default)]
pub struct CloseScheduler {
    pending: Arc<Mutex<HashMap<ChannelId, JoinHandle<()>>>>,
}

impl CloseScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` unless a retirement is already pending for
    /// `channel`. Returns whether a new retirement was scheduled.
    pub fn schedule<F>(&self, channel: ChannelId, delay: Duration, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock();
        if pending.get(&channel).is_some_and(|h| !h.is_finished()) {
            debug!(%channel, "Retirement already pending");
            return false;
        }
        let registry = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            registry.lock().remove(&channel);
        });
        pending.insert(channel, handle);
        debug!(%channel, delay_secs = delay.as_secs(), "Retirement scheduled");
        true
    }

    /// Abort a pending retirement. Returns whether one was pending.
    pub fn cancel(&self, channel: ChannelId) -> bool {
        match self.pending.lock().remove(&channel) {
            Some(handle) => {
                handle.abort();
                debug!(%channel, "Retirement cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a retirement is pending for `channel`.
    pub fn is_pending(&self, channel: ChannelId) -> bool {
        self.pending
            .lock()
            .get(&channel)
            .is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_after_delay() {
        let scheduler = CloseScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let channel = ChannelId::from(1);

        for _ in 0..2 {
            let runs = Arc::clone(&runs);
            scheduler.schedule(channel, Duration::from_secs(10), async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(scheduler.is_pending(channel));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending(channel));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let scheduler = CloseScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let channel = ChannelId::from(2);
        let counter = Arc::clone(&runs);
        scheduler.schedule(channel, Duration::from_secs(10), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(scheduler.cancel(channel));
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
