//! Application context - dependency injection container

use std::sync::Arc;

use chamados_core::{
    ActiveTicketBanner, ActiveTicketTracker, Clock, KeyValueStore, Notifier, SystemClock,
    TicketApi, TicketLifecycle,
};
use chamados_domain::{ChamadosError, Config, Result, StorageConfig};
use chamados_infra::{
    ActiveTicketMonitor, FileKeyValueStore, MemoryKeyValueStore, MonitorConfig, SchedulerError,
    TicketApiClient, TracingNotifier,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub tracker: Arc<ActiveTicketTracker>,
    pub lifecycle: Arc<TicketLifecycle>,
    pub notifier: Arc<TracingNotifier>,

    monitor: Mutex<ActiveTicketMonitor>,
}

impl AppContext {
    /// Create a new application context with default configuration
    pub fn new() -> Result<Self> {
        Self::new_with_config(Config::default())
    }

    /// Create a new application context talking to the configured backend
    pub fn new_with_config(config: Config) -> Result<Self> {
        let api = TicketApiClient::from_config(&config.api)?;
        info!(base_url = api.base_url(), "Ticket backend configured");
        Self::new_with_api(config, Arc::new(api))
    }

    /// Create a context around an existing [`TicketApi`]
    ///
    /// Tests use this to substitute the backend.
    pub fn new_with_api(config: Config, api: Arc<dyn TicketApi>) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let tracker = Arc::new(ActiveTicketTracker::new(Arc::clone(&store), Arc::clone(&clock)));
        let notifier = Arc::new(TracingNotifier::new());
        let lifecycle = Arc::new(TicketLifecycle::new(
            api,
            Arc::clone(&tracker),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        ));
        let monitor = ActiveTicketMonitor::new(
            Arc::clone(&lifecycle),
            MonitorConfig::from(&config.tracking),
        );

        Ok(Self {
            config,
            store,
            clock,
            tracker,
            lifecycle,
            notifier,
            monitor: Mutex::new(monitor),
        })
    }

    /// Banner controller bound to this context's lifecycle and clock
    pub fn banner(&self) -> ActiveTicketBanner {
        ActiveTicketBanner::new(Arc::clone(&self.lifecycle), Arc::clone(&self.clock))
    }

    /// Start background tracking (server refresh, timers, cross-context
    /// reconciliation).
    ///
    /// # Errors
    /// Fails if tracking is already running.
    pub async fn start(&self) -> Result<()> {
        self.monitor.lock().await.start().map_err(ChamadosError::from)
    }

    pub async fn is_tracking(&self) -> bool {
        self.monitor.lock().await.is_running()
    }

    /// Stop background tracking and wait for its tasks to exit.
    ///
    /// Calling this when tracking never started is not an error.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        match self.monitor.lock().await.stop().await {
            Ok(()) => Ok(()),
            Err(SchedulerError::NotRunning) => {
                debug!("Tracking was not running");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// File-backed store when a path is configured, in-memory otherwise
fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            info!(path, "Using file-backed store");
            Ok(Arc::new(FileKeyValueStore::open(path)?))
        }
        None => {
            info!("No storage path configured; active tickets will not survive a restart");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}
