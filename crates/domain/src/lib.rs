//! # Chamados Domain
//!
//! Business domain types and models for Chamados.
//!
//! This crate contains:
//! - Ticket, client and billing data types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (storage key, refresh periods, billing grace period)
//!
//! ## Architecture
//! - No dependencies on other Chamados crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::currency::{format_brl, parse_currency, parse_decimal_value};
pub use utils::time::{format_elapsed, parse_timestamp};
