//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Chamados
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ChamadosError {
    /// Transport failure: the backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The ticket (or resource) no longer exists on the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backend answered with a non-success status and (usually) a `message`.
    #[error("Backend rejected request ({status}): {message}")]
    BackendRejection { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Local validation failures. These block submission before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ValidationError {
    #[error(
        "Não foi possível determinar o valor base do chamado. Verifique se o chamado possui \
         serviço ou valor definido."
    )]
    MissingBaseValue,

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl ChamadosError {
    /// Whether the error means the ticket is already gone server-side.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the backend rejection cites `field` (case-insensitive).
    ///
    /// Older backend schemas reject unknown completion fields by name.
    pub fn mentions_field(&self, field: &str) -> bool {
        match self {
            Self::BackendRejection { message, .. } => {
                message.to_lowercase().contains(&field.to_lowercase())
            }
            _ => false,
        }
    }

    /// Text suitable for a user-facing notice.
    ///
    /// Backend-provided messages and validation messages are shown verbatim;
    /// everything else falls back to `generic`.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            Self::BackendRejection { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            Self::Validation(err) => err.to_string(),
            _ => generic.to_string(),
        }
    }
}

/// Result type alias for Chamados operations
pub type Result<T> = std::result::Result<T, ChamadosError>;
