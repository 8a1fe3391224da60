//! Trailing debounce for background saves.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::lock;

/// Runs a job once calls stop arriving for a quiet interval.
///
/// Scheduling again before the interval elapses cancels the pending timer.
/// Once the timer fires the job is spawned on its own, so a later
/// reschedule or [`cancel`](Self::cancel) never aborts a job in flight.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// (Re)start the quiet interval, running `job` when it elapses.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(job());
        });

        if let Some(previous) = lock(&self.pending).replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending timer. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match lock(&self.pending).take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }

    /// Whether a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            debouncer.schedule(counting_job(&fired));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_job(&fired));
        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_each_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_job(&fired));
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.schedule(counting_job(&fired));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
