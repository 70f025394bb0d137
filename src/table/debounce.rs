//! Trailing-edge debounce timer for search input.
//!
//! Each call to [`Debouncer::schedule`] cancels the pending timer and starts a
//! new one. When the quiet period elapses the callback receives the generation
//! it was scheduled with; the owner compares it against
//! [`Debouncer::generation`] so that a timer which fired just before being
//! replaced is ignored.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Default quiet period before a search query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A cancellable trailing-edge timer.
#[derive(Debug)]
pub struct Debouncer {
    /// Quiet period before firing.
    delay: Duration,
    /// Generation of the most recently scheduled timer.
    generation: u64,
    /// The pending timer task, if any.
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// The configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Generation of the most recently scheduled timer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel any pending timer and schedule `on_settle` after the quiet period.
    ///
    /// Must be called from within a tokio runtime. Returns the generation of
    /// the new timer.
    pub fn schedule<F>(&mut self, on_settle: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        trace!(generation, ?delay, "Scheduling debounced call");

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_settle(generation);
        }));

        generation
    }

    /// Accept a fired timer if it is the latest one.
    ///
    /// Returns `false` for timers that were superseded after firing.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            trace!(generation, latest = self.generation, "Ignoring superseded timer");
            return false;
        }
        self.pending = None;
        true
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
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
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_quiet_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::default();

        let tx1 = tx.clone();
        debouncer.schedule(move |g| {
            let _ = tx1.send(g);
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let tx2 = tx.clone();
        debouncer.schedule(move |g| {
            let _ = tx2.send(g);
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let tx3 = tx.clone();
        let last = debouncer.schedule(move |g| {
            let _ = tx3.send(g);
        });

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, last);
        assert!(debouncer.settle(fired));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_full_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(move |g| {
            let _ = tx.send(g);
        });

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        {
            let mut debouncer = Debouncer::default();
            debouncer.schedule(move |g| {
                let _ = tx.send(g);
            });
            assert!(debouncer.is_pending());
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        // Sender was dropped with the aborted task, nothing was sent.
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_settle_rejects_superseded_generation() {
        let mut debouncer = Debouncer::default();
        debouncer.generation = 3;
        assert!(!debouncer.settle(2));
        assert!(debouncer.settle(3));
    }
}
