//! Background tasks for active-ticket tracking
//!
//! - [`ActiveTicketTimers`]: elapsed refresh and periodic reconciliation,
//!   alive only while tickets are active
//! - [`ActiveTicketMonitor`]: server refresh, cross-context ledger changes,
//!   and the timers' lifecycle
//!
//! Both follow the same runtime rules: explicit start/stop, join handles for
//! spawned tasks, cancellation tokens, and timeouts on join.

pub mod error;
pub mod monitor;
pub mod timers;

pub use error::{SchedulerError, SchedulerResult};
pub use monitor::{ActiveTicketMonitor, MonitorConfig};
pub use timers::{ActiveTicketTimers, TimerConfig};
