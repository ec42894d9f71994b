//! Active-ticket tracking: persisted ledger, reconciliation and elapsed time

pub mod elapsed;
pub mod ledger;
pub mod ports;
pub mod reconcile;
pub mod tracker;

pub use elapsed::{compute_elapsed_seconds, correct_timezone_drift};
pub use ledger::ActiveTicketLedger;
pub use reconcile::{determine_active_tickets, Reconciliation};
pub use tracker::{ActiveTicketTracker, EndedTicket, TicketEnding};
