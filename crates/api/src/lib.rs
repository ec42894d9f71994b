//! # Chamados App
//!
//! Application layer - context wiring and the headless entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Logging setup
//! - Main entry point
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::*;
