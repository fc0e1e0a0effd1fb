//! Singular timers.
//!
//! The controller keeps one pending timer per purpose (auto-advance, notice
//! expiry, control hiding). Scheduling always cancels the prior pending
//! timer of the same slot, so stale callbacks from an earlier state can
//! never fire.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// At most one pending delayed task.
#[derive(Default)]
pub struct TimerSlot {
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, cancelling any previously scheduled task
    /// in this slot.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Cancel the pending task, if any. Cancelling an empty or already-fired
    /// slot is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn rescheduling_cancels_the_prior_timer() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::new();

        for _ in 0..3 {
            let fired = fired.clone();
            slot.schedule(Duration::from_millis(100), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::advance(Duration::from_millis(50)).await;
        }
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut slot = TimerSlot::new();
        {
            let fired = fired.clone();
            slot.schedule(Duration::from_millis(10), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        slot.cancel();
        assert!(!slot.is_pending());

        tokio::time::advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
