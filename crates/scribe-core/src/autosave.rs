//! Debounced autosave.
//!
//! A single slot holds the pending timer. Scheduling aborts whatever is in the
//! slot and starts a new timer, so at most one is ever pending.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::session::{SaveOutcome, SkipReason};

/// Something that can be saved by the scheduler.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save(&self) -> Result<SaveOutcome>;
}

pub struct AutosaveScheduler {
    delay: Duration,
    target: Arc<dyn SaveTarget>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AutosaveScheduler {
    pub fn new(target: Arc<dyn SaveTarget>, delay: Duration) -> Self {
        Self {
            delay,
            target,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the idle timer. Must be called from within a tokio runtime.
    pub fn schedule(&self) {
        let target = self.target.clone();
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The save runs on its own task: aborting the timer must never
            // interrupt a write that has already started.
            tokio::spawn(async move {
                match target.save().await {
                    Ok(outcome) => tracing::debug!("[Autosave] {:?}", outcome),
                    Err(e) => tracing::warn!("[Autosave] Save failed, will retry on next edit: {}", e),
                }
            });
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Drops the pending timer. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Saves right away, cancelling the pending timer.
    ///
    /// If another save is still writing, the timer is armed again so the
    /// latest text gets another attempt after the delay.
    pub async fn flush(&self) -> Result<SaveOutcome> {
        self.cancel();
        let outcome = self.target.save().await;
        if matches!(outcome, Ok(SaveOutcome::Skipped(SkipReason::InFlight))) {
            tracing::debug!("[Autosave] Save in flight, rescheduling");
            self.schedule();
        }
        outcome
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        saves: AtomicUsize,
        busy: AtomicBool,
    }

    #[async_trait]
    impl SaveTarget for CountingTarget {
        async fn save(&self) -> Result<SaveOutcome> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.busy.load(Ordering::SeqCst) {
                return Ok(SaveOutcome::Skipped(SkipReason::InFlight));
            }
            Ok(SaveOutcome::Saved)
        }
    }

    fn scheduler() -> (AutosaveScheduler, Arc<CountingTarget>) {
        let target = Arc::new(CountingTarget::default());
        let scheduler = AutosaveScheduler::new(target.clone(), Duration::from_millis(800));
        (scheduler, target)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_fires_after_delay() {
        let (scheduler, target) = scheduler();
        scheduler.schedule();

        tokio::time::sleep(Duration::from_millis(799)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_coalesce() {
        let (scheduler, target) = scheduler();
        for _ in 0..5 {
            scheduler.schedule();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(target.saves.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_cancels_pending_timer() {
        let (scheduler, target) = scheduler();
        scheduler.schedule();

        scheduler.flush().await.unwrap();
        assert_eq!(target.saves.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_during_outstanding_save_keeps_timer() {
        let (scheduler, target) = scheduler();
        target.busy.store(true, Ordering::SeqCst);
        scheduler.schedule();

        assert_eq!(
            scheduler.flush().await.unwrap(),
            SaveOutcome::Skipped(SkipReason::InFlight)
        );
        assert!(scheduler.is_pending());

        target.busy.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(801)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 2);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (scheduler, target) = scheduler();
        assert!(!scheduler.cancel());

        scheduler.schedule();
        assert!(scheduler.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(target.saves.load(Ordering::SeqCst), 0);
    }
}
