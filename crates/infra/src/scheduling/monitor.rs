//! Supervisor for active-ticket tracking.
//!
//! Owns the background task that:
//! - refetches the ticket list on an interval (a failed fetch keeps the
//!   previous snapshot);
//! - re-runs reconciliation when another context writes the ledger key;
//! - starts [`ActiveTicketTimers`] when the active set becomes non-empty and
//!   stops them when it empties.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chamados_core::{ActiveTicketTracker, TicketLifecycle};
use chamados_domain::constants::ACTIVE_TICKETS_STORAGE_KEY;
use chamados_domain::TrackingConfig;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::timers::{ActiveTicketTimers, TimerConfig};
use crate::scheduling::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub refresh_interval: Duration,
    pub timers: TimerConfig,
    /// Timeout for awaiting the supervisor task on stop.
    pub join_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from(&TrackingConfig::default())
    }
}

impl From<&TrackingConfig> for MonitorConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            refresh_interval: Duration::from_secs(config.server_refresh_seconds.max(1)),
            timers: TimerConfig::from(config),
            join_timeout: Duration::from_secs(10),
        }
    }
}

pub struct ActiveTicketMonitor {
    lifecycle: Arc<TicketLifecycle>,
    config: MonitorConfig,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
    timers_running: Arc<AtomicBool>,
}

impl ActiveTicketMonitor {
    pub fn new(lifecycle: Arc<TicketLifecycle>, config: MonitorConfig) -> Self {
        Self {
            lifecycle,
            config,
            cancellation: CancellationToken::new(),
            handle: None,
            timers_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the supervisor task.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if the task is alive.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let lifecycle = Arc::clone(&self.lifecycle);
        let config = self.config.clone();
        let cancel = self.cancellation.clone();
        let timers_running = Arc::clone(&self.timers_running);
        self.handle = Some(tokio::spawn(async move {
            Self::supervise(lifecycle, config, cancel, timers_running).await;
        }));

        info!("Active ticket monitor started");
        Ok(())
    }

    /// Stop the supervisor (and its timers) and wait for it to exit.
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

        info!("Active ticket monitor stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Whether the elapsed and reconcile timers are currently scheduled.
    /// They only run while at least one ticket is active.
    pub fn timers_running(&self) -> bool {
        self.timers_running.load(Ordering::SeqCst)
    }

    async fn supervise(
        lifecycle: Arc<TicketLifecycle>,
        config: MonitorConfig,
        cancel: CancellationToken,
        timers_running: Arc<AtomicBool>,
    ) {
        let tracker = Arc::clone(lifecycle.tracker());
        let store = Arc::clone(tracker.ledger().store());
        let own_origin = store.origin();
        let mut storage_events = store.subscribe();
        let mut active = tracker.subscribe_active();
        let mut timers = ActiveTicketTimers::new(Arc::clone(&tracker), config.timers.clone());

        // Persisted entries show up immediately, before the first fetch.
        tracker.reconcile();
        sync_timers(&tracker, &mut timers, &timers_running).await;

        // The first tick fires at once and performs the initial fetch.
        let mut refresh = tokio::time::interval(config.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Monitor loop cancelled");
                    break;
                }
                _ = refresh.tick() => {
                    match lifecycle.refresh().await {
                        Ok(count) => debug!(count, "Ticket snapshot refreshed"),
                        Err(err) => {
                            warn!(error = %err, "Ticket refresh failed; keeping previous snapshot");
                        }
                    }
                }
                changed = active.changed() => {
                    if changed.is_err() {
                        error!("Active ticket channel closed");
                        break;
                    }
                    sync_timers(&tracker, &mut timers, &timers_running).await;
                }
                event = storage_events.recv() => match event {
                    Ok(event)
                        if event.key == ACTIVE_TICKETS_STORAGE_KEY && event.origin != own_origin =>
                    {
                        debug!(origin = event.origin, "Ledger changed in another context");
                        tracker.reconcile();
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Storage events lagged; reconciling");
                        tracker.reconcile();
                    }
                    Err(RecvError::Closed) => {
                        error!("Storage event channel closed");
                        break;
                    }
                },
            }
        }

        if timers.is_running() {
            if let Err(err) = timers.stop().await {
                warn!(error = %err, "Failed to stop timers");
            }
        }
        timers_running.store(false, Ordering::SeqCst);
    }
}

impl Drop for ActiveTicketMonitor {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn sync_timers(
    tracker: &ActiveTicketTracker,
    timers: &mut ActiveTicketTimers,
    running: &AtomicBool,
) {
    let has_active = !tracker.active().is_empty();
    if has_active && !timers.is_running() {
        if let Err(err) = timers.start() {
            warn!(error = %err, "Failed to start timers");
        }
    } else if !has_active && timers.is_running() {
        if let Err(err) = timers.stop().await {
            warn!(error = %err, "Failed to stop timers");
        }
    }
    running.store(timers.is_running(), Ordering::SeqCst);
}
