//! Self-rescheduling sync tasks: one timer per feed, rearmed at the start
//! of every run, shared by scheduled and manual triggers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use sheetfeed_core::Feed;

use crate::error::SyncError;
use crate::round::SyncRound;

/// How a sync round was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fired by the task's own timer.
    Scheduled,
    /// Requested out of band (HTTP route, the sync-once command).
    Manual,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Scheduled => f.write_str("scheduled"),
            TriggerKind::Manual => f.write_str("manual"),
        }
    }
}

/// One feed's periodic synchronization. Owns the feed's round and the
/// single pending-timer slot; built once at boot and kept for the life of
/// the process.
pub struct SyncTask {
    period: Duration,
    round: Box<dyn SyncRound>,
    /// At most one live timer at any instant.
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SyncTask {
    pub fn new(period: Duration, round: Box<dyn SyncRound>) -> Arc<Self> {
        Arc::new(Self {
            period,
            round,
            pending: Mutex::new(None),
        })
    }

    pub fn feed(&self) -> Feed {
        self.round.feed()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether a timer is armed for the next automatic run.
    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .unwrap()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Run one round now and restart the automatic cadence from this
    /// instant.
    ///
    /// Scheduled and manual invocations share this path. The task rearms
    /// before running, so a failed round still gets its next attempt and a
    /// manual trigger pushes the pending timer out by a full period. The
    /// round's outcome goes both to the log and to the caller.
    pub async fn trigger(self: Arc<Self>, kind: TriggerKind) -> Result<(), SyncError> {
        Self::rearm(&self);
        let result = self.round.run().await;
        match &result {
            Ok(()) => info!(feed = %self.feed(), trigger = %kind, "sync succeeded"),
            Err(error) => {
                warn!(feed = %self.feed(), trigger = %kind, error = %error, "sync failed")
            }
        }
        result
    }

    /// Cancel any pending timer and arm a fresh one, `period` from now.
    ///
    /// The timer task does nothing but sleep; the next round runs in a
    /// separately spawned task, so aborting a stale timer can never cancel
    /// an in-flight round.
    fn rearm(task: &Arc<Self>) {
        let timer = Arc::clone(task);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timer.period).await;
            let _ = tokio::spawn(timer.trigger(TriggerKind::Scheduled));
        });
        if let Some(stale) = task.pending.lock().unwrap().replace(handle) {
            stale.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use sheetfeed_core::Feed;

    use super::{SyncTask, TriggerKind};
    use crate::error::SyncError;
    use crate::round::SyncRound;

    struct CountingRound {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingRound {
        fn task(period: Duration) -> (Arc<SyncTask>, Arc<AtomicUsize>) {
            Self::task_with(period, false)
        }

        fn task_with(period: Duration, fail: bool) -> (Arc<SyncTask>, Arc<AtomicUsize>) {
            let runs = Arc::new(AtomicUsize::new(0));
            let round = CountingRound { runs: Arc::clone(&runs), fail };
            (SyncTask::new(period, Box::new(round)), runs)
        }
    }

    #[async_trait]
    impl SyncRound for CountingRound {
        fn feed(&self) -> Feed {
            Feed::Announce
        }

        async fn run(&self) -> Result<(), SyncError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SyncError::Canceled)
            } else {
                Ok(())
            }
        }
    }

    /// Let spawned timer and round tasks reach their next await point.
    /// Timer deadlines are taken when the sleep is first polled, so every
    /// trigger is followed by a settle before the clock advances.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    const PERIOD: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn trigger_runs_the_round_and_arms_the_timer() {
        let (task, runs) = CountingRound::task(PERIOD);
        assert!(!task.is_armed());

        Arc::clone(&task).trigger(TriggerKind::Manual).await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(task.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_one_period_later_and_rearms() {
        let (task, runs) = CountingRound::task(PERIOD);
        Arc::clone(&task).trigger(TriggerKind::Manual).await.unwrap();
        settle().await;

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2, "scheduled run after one period");

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 3, "cadence continues unattended");
    }

    #[tokio::test(start_paused = true)]
    async fn manual_trigger_replaces_the_pending_timer() {
        let (task, runs) = CountingRound::task(PERIOD);
        Arc::clone(&task).trigger(TriggerKind::Manual).await.unwrap();
        settle().await;

        // Fifty seconds in, trigger manually: the cadence restarts.
        tokio::time::advance(PERIOD - Duration::from_secs(10)).await;
        settle().await;
        Arc::clone(&task).trigger(TriggerKind::Manual).await.unwrap();
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        // The original timer's deadline passes without a run.
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2, "replaced timer must not fire");

        // One full period after the manual trigger, the new timer fires.
        tokio::time::advance(PERIOD - Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_round_still_rearms() {
        let (task, runs) = CountingRound::task_with(PERIOD, true);
        let result = Arc::clone(&task).trigger(TriggerKind::Manual).await;
        assert!(result.is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(task.is_armed(), "failure must not stop the cadence");
        settle().await;

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2, "next attempt still happens");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_triggers_leave_a_single_pending_timer() {
        let (task, runs) = CountingRound::task(PERIOD);
        for _ in 0..5 {
            Arc::clone(&task).trigger(TriggerKind::Manual).await.unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 5);
        settle().await;

        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(
            runs.load(Ordering::SeqCst),
            6,
            "only the most recent timer may fire"
        );
    }

    #[test]
    fn trigger_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&TriggerKind::Scheduled).unwrap(), r#""scheduled""#);
        assert_eq!(serde_json::to_string(&TriggerKind::Manual).unwrap(), r#""manual""#);
    }
}
