//! User settings: loaded once at startup, written back on every change.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::AppError;

/// Process-wide user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Collapse the sidebar when the pointer leaves it.
    pub sidebar_auto_hide: bool,
    /// Look for a newer release at startup.
    pub check_for_updates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sidebar_auto_hide: false,
            check_for_updates: true,
        }
    }
}

/// Settings backed by a JSON file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: Mutex<Settings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Settings` if the file exists but cannot be read,
    /// `AppError::SettingsFormat` if it is not valid settings JSON.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let settings = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text).map_err(|source| AppError::SettingsFormat {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file, using defaults");
                Settings::default()
            }
            Err(source) => return Err(AppError::Settings { path, source }),
        };

        Ok(Self {
            path,
            current: Mutex::new(settings),
        })
    }

    /// The file the settings are saved to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current settings.
    pub async fn get(&self) -> Settings {
        *self.current.lock().await
    }

    /// Applies `change` and saves the result. The in-memory settings only
    /// change once the file has been written.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Settings` if the file cannot be written.
    pub async fn update(&self, change: impl FnOnce(&mut Settings)) -> Result<Settings, AppError> {
        let mut current = self.current.lock().await;
        let mut next = *current;
        change(&mut next);

        self.save(&next).await?;
        *current = next;
        Ok(next)
    }

    async fn save(&self, settings: &Settings) -> Result<(), AppError> {
        let io_error = |source| AppError::Settings {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let text = serde_json::to_string_pretty(settings).map_err(|source| {
            AppError::SettingsFormat {
                path: self.path.clone(),
                source,
            }
        })?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(io_error)?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
