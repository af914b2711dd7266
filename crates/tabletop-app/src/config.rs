//! Configuration read from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Environment variable naming the SQLite database.
pub const DATABASE_URL_VAR: &str = "TABLETOP_DATABASE_URL";
/// Environment variable naming the settings file.
pub const SETTINGS_PATH_VAR: &str = "TABLETOP_SETTINGS_PATH";
/// Environment variable selecting the log output format.
pub const LOG_FORMAT_VAR: &str = "TABLETOP_LOG_FORMAT";

const DEFAULT_DATABASE_URL: &str = "sqlite://tabletop.db?mode=rwc";
const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// How log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(AppError::Config(format!(
                "{LOG_FORMAT_VAR} must be `pretty` or `json`, got `{other}`"
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite connection URL.
    pub database_url: String,
    /// Where user settings are persisted.
    pub settings_path: PathBuf,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_format = match read(LOG_FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database_url: read(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            settings_path: read(SETTINGS_PATH_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from),
            log_format,
        })
    }
}
