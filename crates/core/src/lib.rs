//! # Chamados Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Active-ticket reconciliation and elapsed-time tracking
//! - The completion pricing engine and the form state built on it
//! - Ticket lifecycle use cases (check-in, complete, cancel, delete)
//! - Port interfaces (traits) for the backend, the key-value store and
//!   notifications
//!
//! ## Architecture Principles
//! - Only depends on `chamados-domain`
//! - No HTTP, filesystem or timer code
//! - All external dependencies via traits

pub mod billing;
pub mod clock;
pub mod tickets;
pub mod tracking;

pub use billing::{CompletionCalculator, CompletionForm};
pub use clock::{Clock, ManualClock, SystemClock};
pub use tickets::ports::{Notifier, TicketApi};
pub use tickets::{ActiveTicketBanner, TicketLifecycle};
pub use tracking::ports::{KeyValueStore, StorageEvent};
pub use tracking::{ActiveTicketLedger, ActiveTicketTracker};
