//! Per-second elapsed refresh and periodic reconciliation.
//!
//! Both timers run in one background task that exists only between
//! [`ActiveTicketTimers::start`] and [`ActiveTicketTimers::stop`]. Starting
//! twice is an error, never a second pair of timers.

use std::sync::Arc;
use std::time::Duration;

use chamados_core::ActiveTicketTracker;
use chamados_domain::TrackingConfig;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub elapsed_interval: Duration,
    pub reconcile_interval: Duration,
    /// Timeout for awaiting the timer task on stop.
    pub join_timeout: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::from(&TrackingConfig::default())
    }
}

impl From<&TrackingConfig> for TimerConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            elapsed_interval: Duration::from_millis(config.elapsed_refresh_ms.max(1)),
            reconcile_interval: Duration::from_secs(config.reconcile_interval_seconds.max(1)),
            join_timeout: Duration::from_secs(5),
        }
    }
}

pub struct ActiveTicketTimers {
    tracker: Arc<ActiveTicketTracker>,
    config: TimerConfig,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ActiveTicketTimers {
    pub fn new(tracker: Arc<ActiveTicketTracker>, config: TimerConfig) -> Self {
        Self { tracker, config, cancellation: CancellationToken::new(), handle: None }
    }

    /// Spawn the timer task.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if the task is alive.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // New token so the timers can be restarted after a stop.
        self.cancellation = CancellationToken::new();

        let tracker = Arc::clone(&self.tracker);
        let config = self.config.clone();
        let cancel = self.cancellation.clone();
        self.handle = Some(tokio::spawn(async move {
            Self::run(tracker, config, cancel).await;
        }));

        info!("Active ticket timers started");
        Ok(())
    }

    /// Cancel the timer task and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NotRunning` if no task is alive.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            self.handle = None;
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(handle) = self.handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!("Active ticket timers stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    async fn run(
        tracker: Arc<ActiveTicketTracker>,
        config: TimerConfig,
        cancel: CancellationToken,
    ) {
        let mut elapsed = tokio::time::interval(config.elapsed_interval);
        elapsed.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut reconcile = tokio::time::interval(config.reconcile_interval);
        reconcile.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Timer loop cancelled");
                    break;
                }
                _ = elapsed.tick() => {
                    let times = tracker.refresh_elapsed();
                    trace!(tickets = times.len(), "Elapsed refreshed");
                }
                _ = reconcile.tick() => {
                    tracker.reconcile();
                }
            }
        }
    }
}

impl Drop for ActiveTicketTimers {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
