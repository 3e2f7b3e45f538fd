use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::export::ExportError;
use crate::workflows::subsidy::SubsidyServiceError;

/// Failure that ends a CLI command or the server process.
///
/// HTTP handlers never return this type; request-level failures map to status codes in the
/// subsidy router.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("subsidy workflow error: {0}")]
    Subsidy(#[from] SubsidyServiceError),
}
