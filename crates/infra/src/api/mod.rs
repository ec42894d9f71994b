//! Ticket backend client

pub mod client;

pub use client::{TicketApiClient, TicketApiClientConfig};
