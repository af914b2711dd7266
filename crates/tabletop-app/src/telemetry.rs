//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::AppError;

/// Installs the global tracing subscriber. `RUST_LOG` selects the filter,
/// defaulting to `info`.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if a global subscriber is already set.
pub fn init(format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| AppError::Telemetry(e.to_string()))
}
