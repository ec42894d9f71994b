//! Shared test helpers for `chamados-core` integration tests.
//!
//! In-memory stand-ins for the storage, backend and notification ports, plus
//! ticket fixtures, so tests can focus on behaviour instead of wiring.

#![allow(dead_code)]

pub mod api;
pub mod fixtures;
pub mod notifier;
pub mod store;
