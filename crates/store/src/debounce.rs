//! Reusable trailing-edge debouncer.
//!
//! Each `call` schedules the work after the quiet period and cancels any
//! previously scheduled work. Dropping the debouncer aborts whatever is
//! still pending, so a torn-down form never fires a stale save.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Schedules a single pending task on a trailing edge.
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

    /// Schedule `work` to run after the quiet period, replacing any task
    /// scheduled by an earlier call that has not fired yet.
    pub fn call<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Drop any pending task without running it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
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

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = {
            let count = Arc::clone(&count);
            move || count.load(Ordering::SeqCst)
        };
        (count, read)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_quiet_period() {
        let (count, read) = counter();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.call({
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_calls_coalesce_to_one() {
        let (count, read) = counter();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        for _ in 0..5 {
            debouncer.call({
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_each_fire() {
        let (count, read) = counter();
        let debouncer = Debouncer::new(Duration::from_millis(100));

        for _ in 0..3 {
            debouncer.call({
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            });
            tokio::time::sleep(Duration::from_millis(200)).await;
        }

        assert_eq!(read(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_work() {
        let (count, read) = counter();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.call({
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(read(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_pending_work() {
        let (count, read) = counter();
        {
            let debouncer = Debouncer::new(Duration::from_millis(500));
            debouncer.call({
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(read(), 0);
    }
}
