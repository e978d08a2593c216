//! Tabula Settings
//!
//! Where the record endpoints live and how long the controller waits between
//! feedback steps. Settings are read from `<config dir>/tabula/settings.json`;
//! a missing file means defaults.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod settings_file;

pub use settings_file::*;

/// Environment variable that overrides [`ControllerSettings::base_url`]
pub const BASE_URL_ENV: &str = "TABULA_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Server root the resource paths are joined onto
    pub base_url: String,
    /// Resource segment of the endpoint paths (`/{resource}/insert`, ...)
    pub resource: String,
    /// Pause between a success toast and the reload
    pub reload_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub toast_duration_ms: u64,
    /// How long the selection hint keeps its attention animation
    pub selection_hint_ms: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            resource: "productos".into(),
            reload_delay_ms: 800,
            request_timeout_secs: 30,
            toast_duration_ms: 2500,
            selection_hint_ms: 400,
        }
    }
}

impl ControllerSettings {
    /// Load from the default location, then apply the environment override.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::settings_path()?)?;
        settings.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        settings_file()
    }

    /// Replace the base URL when an override is present and non-blank.
    pub fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::info!(base_url = %url, "Base URL overridden from environment");
            self.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.resource.trim().is_empty() || self.resource.contains('/') {
            bail!("resource must be a single non-empty path segment");
        }
        Ok(())
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn selection_hint_duration(&self) -> Duration {
        Duration::from_millis(self.selection_hint_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ControllerSettings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, ControllerSettings::default());
        assert_eq!(settings.reload_delay(), Duration::from_millis(800));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "resource": "almacenes", "reload_delay_ms": 0 }"#).unwrap();

        let settings = ControllerSettings::load_from(&path).unwrap();
        assert_eq!(settings.resource, "almacenes");
        assert_eq!(settings.reload_delay_ms, 0);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ControllerSettings {
            base_url: "http://inventory.local".into(),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(ControllerSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ControllerSettings::load_from(&path).is_err());
    }

    #[test]
    fn override_ignores_blank_values() {
        let mut settings = ControllerSettings::default();
        settings.apply_base_url_override(Some("   ".into()));
        assert_eq!(settings.base_url, "http://127.0.0.1:5000");
        settings.apply_base_url_override(Some(" http://other:8080 ".into()));
        assert_eq!(settings.base_url, "http://other:8080");
    }

    #[test]
    fn resource_must_be_one_segment() {
        let settings = ControllerSettings {
            resource: "a/b".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(ControllerSettings::default().validate().is_ok());
    }
}
