//! Configuration loading
//!
//! Loads the application configuration from an optional file and
//! `CHAMADOS_*` environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
