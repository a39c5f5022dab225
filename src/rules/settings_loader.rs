//! Persistence layer for the rule settings.
//!
//! This module provides the [`SettingsLoader`] for keeping the rule settings
//! between restarts. Settings are serialized to JSON and stored in a file.

use std::collections::HashMap;

use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::ConfigReadError;

/// Serialized shape of the rule settings.
///
/// ```json
/// {"keyword": "Boss", "sources": {"whatsapp": false}, "locked": true}
/// ```
///
/// Every field is optional on disk and falls back to the defaults: empty
/// keyword, every source enabled, unlocked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    /// Keyword searched in notification titles.
    #[serde(default)]
    pub keyword: String,
    /// Enable flag per source category id. Absent ids are enabled.
    #[serde(default)]
    pub sources: HashMap<String, bool>,
    /// Whether the keyword is locked against edits.
    #[serde(default)]
    pub locked: bool,
}

/// Handles loading and persisting the rule settings to disk.
///
/// Loading reports why the settings could not be read so the caller can
/// decide to fall back to defaults. Persisting never fails loudly: errors are
/// logged and the in-memory settings remain authoritative.
#[derive(Clone)]
pub struct SettingsLoader {
    /// Path to the JSON file where settings are stored.
    path: String,
}

impl SettingsLoader {
    pub fn new(path: String) -> Self {
        SettingsLoader { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Loads the settings from disk.
    ///
    /// # Errors
    ///
    /// - [`ConfigReadError::Io`] if the file cannot be read (including when it
    ///   does not exist yet)
    /// - [`ConfigReadError::Corrupt`] if the file content is not valid settings JSON
    pub async fn load(&self) -> Result<StoredSettings, ConfigReadError> {
        let serialized = fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigReadError::Io {
                path: self.path.clone(),
                source,
            })?;

        let settings =
            serde_json::from_str(&serialized).map_err(|source| ConfigReadError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        info!("loaded persisted settings {}", serialized);

        Ok(settings)
    }

    /// Persists the settings to disk.
    ///
    /// The JSON is written to a sibling temporary file which then replaces the
    /// settings file, so a crash mid-write never leaves a truncated file behind.
    pub async fn persist(&self, settings: &StoredSettings) {
        let serialized = match serde_json::to_string(settings) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("failed to serialize settings: {}", e);
                return;
            }
        };

        let tmp_path = format!("{}.tmp", self.path);
        if let Err(e) = fs::write(&tmp_path, &serialized).await {
            error!("failed to write settings to {}: {}", tmp_path, e);
            return;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            error!("failed to persist settings to {}: {}", self.path, e);
            return;
        }

        info!("persisted settings");
    }
}
