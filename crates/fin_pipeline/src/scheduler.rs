use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use fin_core::config::ScheduleConfig;
use fin_core::{CycleOutcome, CycleRun};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::runner::{panic_message, PipelineRunner};

/// Fires once a day at a fixed local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// First firing strictly after `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();
        // Today and tomorrow always cover the next firing; the third day absorbs DST gaps.
        for _ in 0..3 {
            let mut local = date.and_time(self.at);
            for _ in 0..24 {
                if let Some(candidate) = tz.from_local_datetime(&local).earliest() {
                    if candidate > *now {
                        return candidate;
                    }
                    break;
                }
                // Inside a DST gap the wall-clock time does not exist; try an hour later.
                local += chrono::Duration::hours(1);
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        now.clone() + chrono::Duration::days(1)
    }

    pub fn until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        (self.next_after(now) - now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl From<ScheduleConfig> for DailyTrigger {
    fn from(config: ScheduleConfig) -> Self {
        Self::new(config.at)
    }
}

/// Marks a cycle in flight; released on drop.
struct CycleGuard {
    busy: Arc<AtomicBool>,
}

impl CycleGuard {
    fn acquire(busy: &Arc<AtomicBool>) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy: busy.clone() })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// A panic outside per-article enrichment (in the feed, say) ends this cycle only.
async fn isolated_cycle(runner: &PipelineRunner) -> CycleOutcome {
    let started_at = Utc::now();
    match AssertUnwindSafe(runner.run_cycle()).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            error!(reason = panic_message(panic.as_ref()), "Ingestion cycle aborted");
            CycleOutcome::empty(started_at)
        }
    }
}

async fn guarded_cycle(runner: &PipelineRunner, busy: &Arc<AtomicBool>) -> CycleRun {
    match CycleGuard::acquire(busy) {
        Some(_guard) => CycleRun::Completed(isolated_cycle(runner).await),
        None => {
            info!("⏭️ A cycle is already in progress, skipping this trigger");
            CycleRun::Skipped
        }
    }
}

/// Owns the daily timer and makes sure at most one cycle runs at a time.
pub struct Scheduler {
    runner: Arc<PipelineRunner>,
    trigger: DailyTrigger,
    busy: Arc<AtomicBool>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(runner: Arc<PipelineRunner>, trigger: DailyTrigger) -> Self {
        Self {
            runner,
            trigger,
            busy: Arc::new(AtomicBool::new(false)),
            timer: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn next_run(&self) -> DateTime<Local> {
        self.trigger.next_after(&Local::now())
    }

    /// Starts the timer task: one cycle right away, then one per daily firing.
    /// Returns false if the timer was already running.
    pub fn start(&self) -> bool {
        let mut timer = match self.timer.lock() {
            Ok(timer) => timer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("Scheduler already started");
            return false;
        }

        let runner = self.runner.clone();
        let busy = self.busy.clone();
        let trigger = self.trigger;
        *timer = Some(tokio::spawn(async move {
            info!("🚀 Running startup cycle");
            guarded_cycle(&runner, &busy).await;

            loop {
                let now = Local::now();
                let wait = trigger.until_next(&now);
                info!(next_run = %trigger.next_after(&now), "⏰ Waiting for next scheduled cycle");
                tokio::time::sleep(wait).await;

                info!("Running scheduled cycle");
                guarded_cycle(&runner, &busy).await;
            }
        }));
        info!(at = %self.trigger.at(), "Scheduler started");
        true
    }

    /// Manual trigger: runs a cycle now unless one is already in flight.
    pub async fn trigger(&self) -> CycleRun {
        guarded_cycle(&self.runner, &self.busy).await
    }

    /// Like `trigger`, but the cycle runs in the background. `None` if one is already in flight.
    pub fn spawn_cycle(&self) -> Option<JoinHandle<CycleOutcome>> {
        let guard = CycleGuard::acquire(&self.busy)?;
        let runner = self.runner.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            isolated_cycle(&runner).await
        }))
    }

    pub fn shutdown(&self) {
        let handle = match self.timer.lock() {
            Ok(mut timer) => timer.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("Scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
