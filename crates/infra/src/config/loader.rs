//! Configuration loader
//!
//! Builds the application configuration from an optional file plus
//! environment overrides.
//!
//! ## Loading Strategy
//! 1. Probe for a config file; use built-in defaults when none exists
//! 2. Overlay any `CHAMADOS_*` environment variables that are set
//! 3. Supports JSON and TOML formats; missing sections keep their defaults
//!
//! ## Environment Variables
//! - `CHAMADOS_API_BASE_URL`: Backend base URL including the `/api` prefix
//! - `CHAMADOS_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `CHAMADOS_API_TOKEN`: Bearer token for the backend
//! - `CHAMADOS_STORAGE_PATH`: JSON file backing the key-value store
//! - `CHAMADOS_ELAPSED_REFRESH_MS`: Elapsed refresh period in milliseconds
//! - `CHAMADOS_RECONCILE_INTERVAL_SECS`: Reconciliation period in seconds
//! - `CHAMADOS_SERVER_REFRESH_SECS`: Ticket list refetch period in seconds
//! - `CHAMADOS_LOG_LEVEL`: Default log level when `RUST_LOG` is unset
//! - `CHAMADOS_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./chamados.{toml,json}` then `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chamados_domain::{ChamadosError, Config, Result};

use crate::errors::InfraError;

const FILE_NAMES: [&str; 4] = ["chamados.toml", "chamados.json", "config.toml", "config.json"];

/// Load configuration: probed file (or defaults) with environment overrides
///
/// # Errors
/// Returns `ChamadosError::Config` if a probed file cannot be parsed or an
/// environment variable holds an invalid value.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from defaults and environment variables only
///
/// # Errors
/// Returns `ChamadosError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `ChamadosError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ChamadosError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ChamadosError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ChamadosError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ChamadosError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ChamadosError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Overlay set `CHAMADOS_*` variables onto `config`
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(url) = env_string("CHAMADOS_API_BASE_URL") {
        config.api.base_url = url;
    }
    if let Some(timeout) = env_parse("CHAMADOS_API_TIMEOUT_SECS")? {
        config.api.timeout_seconds = timeout;
    }
    if let Some(token) = env_string("CHAMADOS_API_TOKEN") {
        config.api.token = Some(token);
    }
    if let Some(path) = env_string("CHAMADOS_STORAGE_PATH") {
        config.storage.path = Some(path);
    }
    if let Some(ms) = env_parse("CHAMADOS_ELAPSED_REFRESH_MS")? {
        config.tracking.elapsed_refresh_ms = ms;
    }
    if let Some(secs) = env_parse("CHAMADOS_RECONCILE_INTERVAL_SECS")? {
        config.tracking.reconcile_interval_seconds = secs;
    }
    if let Some(secs) = env_parse("CHAMADOS_SERVER_REFRESH_SECS")? {
        config.tracking.server_refresh_seconds = secs;
    }
    if let Some(level) = env_string("CHAMADOS_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("CHAMADOS_LOG_JSON", config.logging.json);

    Ok(())
}

/// Non-blank environment variable, trimmed
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `ChamadosError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ChamadosError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
