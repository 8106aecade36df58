use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::backend::{GeminiConfig, DEFAULT_MODEL, GOOGLE_API_BASE};
use crate::editor::reconstruct::{DEFAULT_MAX_STEPS, DEFAULT_SETTLE_DELAY_MS};
use crate::editor::ReconstructConfig;
use crate::host::CredentialStore;

const ENABLE_LOGS: bool = true;
const LOG_SCOPE: &str = "settings";

use crate::log_warn;

/// Overrides the stored key when set to a non-blank value.
pub const API_KEY_ENV: &str = "CODEASSIST_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub settle_delay_ms: u64,
    pub max_scroll_steps: usize,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base: GOOGLE_API_BASE.into(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            max_scroll_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl AssistSettings {
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
        }
    }

    /// Settings may shorten a sweep but never lengthen it past the
    /// default step count or settle delay.
    pub fn reconstruct(&self) -> ReconstructConfig {
        ReconstructConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms.min(DEFAULT_SETTLE_DELAY_MS)),
            max_steps: self.max_scroll_steps.clamp(1, DEFAULT_MAX_STEPS),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AssistSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("ignoring unreadable settings {}: {err}", path.display());
                AssistSettings::default()
            })
        } else {
            AssistSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> AssistSettings {
        self.read().clone()
    }

    /// Stored key, with the environment override applied.
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        self.read().api_key.clone()
    }

    pub fn set_api_key(&self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            bail!("Please enter a valid API key.");
        }
        let mut guard = self.write();
        guard.api_key = Some(key.to_string());
        self.persist(&guard)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AssistSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AssistSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, data: &AssistSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl CredentialStore for SettingsStore {
    fn get_credential(&self) -> Option<String> {
        self.api_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.snapshot(), AssistSettings::default());
        assert_eq!(store.snapshot().reconstruct().max_steps, 40);
        assert_eq!(
            store.snapshot().reconstruct().settle_delay,
            Duration::from_millis(80)
        );
    }

    #[test]
    fn sweep_settings_cannot_exceed_defaults() {
        let greedy = AssistSettings {
            max_scroll_steps: 500,
            settle_delay_ms: 1000,
            ..AssistSettings::default()
        };
        let config = greedy.reconstruct();
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.settle_delay, Duration::from_millis(DEFAULT_SETTLE_DELAY_MS));

        let quick = AssistSettings {
            max_scroll_steps: 0,
            settle_delay_ms: 10,
            ..AssistSettings::default()
        };
        let config = quick.reconstruct();
        assert_eq!(config.max_steps, 1);
        assert_eq!(config.settle_delay, Duration::from_millis(10));
    }

    // The only test touching the process environment.
    #[test]
    fn env_key_overrides_stored_key_unless_blank() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        store.set_api_key("stored").unwrap();

        std::env::set_var(API_KEY_ENV, "from-env");
        assert_eq!(store.get_credential().as_deref(), Some("from-env"));

        std::env::set_var(API_KEY_ENV, "  ");
        assert_eq!(store.get_credential().as_deref(), Some("stored"));

        std::env::remove_var(API_KEY_ENV);
        assert_eq!(store.get_credential().as_deref(), Some("stored"));
    }

    #[test]
    fn key_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        SettingsStore::new(path.clone())
            .unwrap()
            .set_api_key("abc123")
            .unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.snapshot().api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let err = store.set_api_key("   ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid API key.");
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_or_partial_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        assert_eq!(
            SettingsStore::new(corrupt).unwrap().snapshot(),
            AssistSettings::default()
        );

        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{ "model": "gemini-pro" }"#).unwrap();
        let settings = SettingsStore::new(partial).unwrap().snapshot();
        assert_eq!(settings.model, "gemini-pro");
        assert_eq!(settings.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }
}
