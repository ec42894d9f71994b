//! # Chamados Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client and the ticket backend adapter
//! - Key-value store adapters (in-memory, JSON file)
//! - Background schedulers for active-ticket tracking
//! - Configuration loading and error conversions
//!
//! ## Architecture
//! - Implements traits defined in `chamados-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod notifications;
pub mod scheduling;
pub mod storage;

// Re-export commonly used items
pub use api::{TicketApiClient, TicketApiClientConfig};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use notifications::TracingNotifier;
pub use scheduling::{
    ActiveTicketMonitor, ActiveTicketTimers, MonitorConfig, SchedulerError, SchedulerResult,
    TimerConfig,
};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
