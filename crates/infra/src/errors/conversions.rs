//! Conversions from external infrastructure errors into domain errors.

use chamados_domain::ChamadosError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ChamadosError);

impl From<InfraError> for ChamadosError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ChamadosError> for InfraError {
    fn from(value: ChamadosError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoChamadosError {
    fn into_chamados(self) -> ChamadosError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ChamadosError */
/* -------------------------------------------------------------------------- */

impl IntoChamadosError for HttpError {
    fn into_chamados(self) -> ChamadosError {
        if self.is_timeout() {
            return ChamadosError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ChamadosError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => ChamadosError::NotFound(message),
                400..=499 => ChamadosError::BackendRejection { status: code, message },
                _ => ChamadosError::Network(message),
            };
        }

        if self.is_decode() {
            return ChamadosError::Internal(format!("failed to decode response body: {self}"));
        }

        ChamadosError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_chamados())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error / std::io::Error → ChamadosError (storage) */
/* -------------------------------------------------------------------------- */

impl IntoChamadosError for JsonError {
    fn into_chamados(self) -> ChamadosError {
        ChamadosError::Storage(format!("invalid JSON at line {}: {self}", self.line()))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_chamados())
    }
}

impl IntoChamadosError for IoError {
    fn into_chamados(self) -> ChamadosError {
        ChamadosError::Storage(format!("{:?}: {self}", self.kind()))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_chamados())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → ChamadosError (config) */
/* -------------------------------------------------------------------------- */

impl IntoChamadosError for TomlError {
    fn into_chamados(self) -> ChamadosError {
        ChamadosError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_chamados())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
