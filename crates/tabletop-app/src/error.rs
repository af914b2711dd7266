//! Tabletop — application error types.

use std::path::PathBuf;

use tabletop_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the application host.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The settings file could not be read or written.
    #[error("settings file {}: {source}", path.display())]
    Settings {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file does not hold valid settings JSON.
    #[error("settings file {} is malformed: {source}", path.display())]
    SettingsFormat {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// A domain or store operation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
