//! HTTP client with timeouts and retries for idempotent requests

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
