//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Persisted active-ticket ledger
pub const ACTIVE_TICKETS_STORAGE_KEY: &str = "active_tickets_startedAt";

// Refresh periods for the active-ticket timers
pub const ELAPSED_REFRESH_INTERVAL_MS: u64 = 1_000;
pub const RECONCILE_INTERVAL_SECS: u64 = 5;
pub const SERVER_REFRESH_INTERVAL_SECS: u64 = 30;

// Elapsed time
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const MAX_DRIFT_CORRECTED_SECONDS: i64 = 86_400;

// Billing
pub const EXTRA_HOURS_GRACE_SECONDS: u64 = 60;
pub const DEFAULT_SERVICE_NAME: &str = "Serviço Prestado";
pub const ADDITIONAL_SERVICE_PREFIX: &str = "Additional service";
pub const RECEIPT_MILEAGE_LABEL: &str = "Deslocamento";
pub const RECEIPT_EXTRA_COST_LABEL: &str = "Custo adicional";

// Cancellation
pub const DEFAULT_CANCELLATION_REASON: &str = "Cancelado pelo usuário";

// Placeholder shown while the ticket list has not loaded yet
pub const LOADING_PLACEHOLDER: &str = "Carregando...";
