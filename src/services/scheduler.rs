use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::models::message::SubjectId;
use crate::services::cursor::DedupCursor;
use crate::services::fetcher::NotificationFetcher;
use crate::services::presenter::NotificationPresenter;
use crate::services::surface::NotificationSurface;

/// Everything one poll cycle needs. Shared between the timer task and the
/// cycles it spawns.
pub struct CycleRunner {
    fetcher: Arc<dyn NotificationFetcher>,
    surface: Arc<dyn NotificationSurface>,
    presenter: NotificationPresenter,
    // Held for the whole cycle; doubles as the cycle-in-progress guard.
    cursor: Mutex<DedupCursor>,
}

impl CycleRunner {
    pub fn new(
        fetcher: Arc<dyn NotificationFetcher>,
        surface: Arc<dyn NotificationSurface>,
        presenter: NotificationPresenter,
        cursor: DedupCursor,
    ) -> Self {
        Self {
            fetcher,
            surface,
            presenter,
            cursor: Mutex::new(cursor),
        }
    }

    pub async fn last_check(&self) -> DateTime<Utc> {
        self.cursor.lock().await.last_check()
    }

    /// Poll, filter, present, then advance the cursor. The cursor advances
    /// even when the poll fails. Returns how many share requests were shown.
    /// Waits for any cycle already in progress.
    pub async fn run_cycle(&self, subject: &SubjectId) -> usize {
        let mut cursor = self.cursor.lock().await;
        self.cycle(&mut cursor, subject).await
    }

    /// Like [`run_cycle`](Self::run_cycle), but returns `None` without
    /// polling when another cycle still holds the cursor.
    pub async fn try_run_cycle(&self, subject: &SubjectId) -> Option<usize> {
        let Ok(mut cursor) = self.cursor.try_lock() else {
            log::debug!("Previous cycle still running, skipping poll for {}", subject);
            return None;
        };
        Some(self.cycle(&mut cursor, subject).await)
    }

    async fn cycle(&self, cursor: &mut DedupCursor, subject: &SubjectId) -> usize {
        let presented = match self.fetcher.fetch(subject).await {
            Ok(events) => {
                let fresh = cursor.select_new(events);
                for request in &fresh {
                    self.presenter.present(self.surface.as_ref(), request);
                }
                fresh.len()
            }
            Err(e) => {
                log::warn!("Notification poll for {} failed: {}", subject, e);
                0
            }
        };

        cursor.advance_to(Utc::now());
        if presented > 0 {
            log::info!("Presented {} share request(s) for {}", presented, subject);
        }
        presented
    }
}

pub enum SchedulerState {
    Idle,
    Active {
        subject: SubjectId,
        timer: JoinHandle<()>,
    },
}

/// Owns the repeating poll timer. At most one timer exists at any time.
pub struct BackgroundScheduler {
    runner: Arc<CycleRunner>,
    interval: Duration,
    state: SchedulerState,
}

impl BackgroundScheduler {
    pub fn new(runner: Arc<CycleRunner>, interval: Duration) -> Self {
        Self {
            runner,
            interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SchedulerState::Active { .. })
    }

    pub fn subject(&self) -> Option<&SubjectId> {
        match &self.state {
            SchedulerState::Active { subject, .. } => Some(subject),
            SchedulerState::Idle => None,
        }
    }

    /// Start watching `subject`: one immediate cycle, then one per interval.
    ///
    /// Re-setting the current subject is a no-op. A different subject
    /// replaces the running timer. `None` leaves any running timer alone;
    /// only [`stop`](Self::stop) ends a watch.
    pub fn set_subject(&mut self, subject: Option<SubjectId>) {
        let Some(subject) = subject else {
            log::debug!("Ignoring empty subject");
            return;
        };

        if let SchedulerState::Active { subject: current, .. } = &self.state {
            if *current == subject {
                log::debug!("Already watching {}", subject);
                return;
            }
            log::info!("Switching background check from {} to {}", current, subject);
            self.stop();
        }

        self.spawn_cycle(subject.clone());
        let timer = self.arm_timer(subject.clone());
        log::info!(
            "Background check started for {} every {:?}",
            subject,
            self.interval
        );
        self.state = SchedulerState::Active { subject, timer };
    }

    /// Cancel the timer. A cycle already polling runs to completion; no tick
    /// is left waiting behind it.
    pub fn stop(&mut self) {
        if let SchedulerState::Active { subject, timer } =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            timer.abort();
            log::info!("Background check stopped for {}", subject);
        }
    }

    fn spawn_cycle(&self, subject: SubjectId) {
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            runner.try_run_cycle(&subject).await;
        });
    }

    fn arm_timer(&self, subject: SubjectId) -> JoinHandle<()> {
        let runner = Arc::clone(&self.runner);
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                // Ticks never queue: a tick that lands on a running cycle
                // is dropped.
                let runner = Arc::clone(&runner);
                let subject = subject.clone();
                tokio::spawn(async move {
                    runner.try_run_cycle(&subject).await;
                });
            }
        })
    }
}

impl Drop for BackgroundScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
