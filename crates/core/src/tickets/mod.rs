//! Ticket lifecycle: check-in, completion, cancellation and deletion, plus the
//! banner controller that drives them for active tickets.

pub mod banner;
pub mod lifecycle;
pub mod ports;

pub use banner::{ActiveTicketBanner, BannerDialog, BannerTicket, MountHandle};
pub use lifecycle::{DeletionReport, Outcome, TicketLifecycle};
