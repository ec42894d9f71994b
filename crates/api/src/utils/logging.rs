use chamados_domain::{ChamadosError, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a
/// subscriber was already installed (tests, embedding hosts).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    if config.json {
        tracing_subscriber::registry().with(filter).with(fmt::layer().json()).try_init().is_ok()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init().is_ok()
    }
}

/// Convert a `ChamadosError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &ChamadosError) -> &'static str {
    match error {
        ChamadosError::Network(_) => "network",
        ChamadosError::NotFound(_) => "not_found",
        ChamadosError::Validation(_) => "validation",
        ChamadosError::BackendRejection { .. } => "backend_rejection",
        ChamadosError::Storage(_) => "storage",
        ChamadosError::Config(_) => "config",
        ChamadosError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use chamados_domain::ValidationError;

    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&ChamadosError::NotFound("t1".into())), "not_found");
        assert_eq!(
            error_label(&ChamadosError::Validation(ValidationError::MissingBaseValue)),
            "validation"
        );
        assert_eq!(
            error_label(&ChamadosError::BackendRejection { status: 500, message: String::new() }),
            "backend_rejection"
        );
    }

    #[test]
    fn second_init_is_reported_not_fatal() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
