//! Configuration file support for input-relay.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/input-relay/config.toml`. Settings include input gating flags,
//! an optional playback log, and where recordings are written.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod types;

pub use types::{ConfigPatch, InputConfig, RecordingConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::recording::FileStore;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [input]
/// enabled = true
/// touch_enabled = true
/// keyboard_enabled = true
/// pointer_lock_enabled = false
/// playback_file = "session.json"
///
/// [recording]
/// output_dir = "/home/me/recordings"
/// compress = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Input pipeline settings
    #[serde(default)]
    pub input: InputConfig,

    /// Recording artifact settings
    #[serde(default)]
    pub recording: RecordingConfig,
}

impl Config {
    /// Normalizes blank strings so they read as "not configured".
    fn validate_and_clamp(&mut self) {
        if let Some(file) = &self.input.playback_file {
            if file.trim().is_empty() {
                warn!("Empty playback_file in config, ignoring");
                self.input.playback_file = None;
            }
        }

        if let Some(dir) = &self.recording.output_dir {
            if dir.as_os_str().is_empty() {
                warn!("Empty recording output_dir in config, using default");
                self.recording.output_dir = None;
            }
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("input-relay");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Serializes the config to TOML and writes it to `config_path`.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// File store resolving playback logs against `base_dir` and writing recordings
    /// to the configured output directory.
    pub fn file_store(&self, base_dir: impl Into<PathBuf>) -> FileStore {
        let mut store = FileStore::new(base_dir, self.recording.resolved_output_dir());
        store.compress = self.recording.compress;
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.input.enabled);
        assert!(!config.input.pointer_lock_enabled);
    }

    #[test]
    fn partial_file_keeps_defaults_and_blanks_are_cleared() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[input]\npointer_lock_enabled = true\nplayback_file = \"  \"\n\n[recording]\ncompress = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.input.pointer_lock_enabled);
        assert!(config.input.touch_enabled);
        assert_eq!(config.input.playback_file, None);
        assert!(config.recording.compress);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[input\nenabled = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.input.playback_file = Some("demo.json".into());
        config.recording.output_dir = Some(temp.path().join("out"));

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut input = InputConfig::default();
        let patch = ConfigPatch {
            touch_enabled: Some(false),
            ..ConfigPatch::default()
        };
        input.apply(&patch);
        assert!(!input.touch_enabled);
        assert!(input.keyboard_enabled);
        assert!(patch.touches_device_flags());
        assert!(!ConfigPatch::default().touches_device_flags());

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "touchEnabled": false }));
    }

    #[test]
    fn schema_names_both_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("input").is_some());
        assert!(properties.get("recording").is_some());
    }

    #[test]
    fn file_store_uses_recording_settings() {
        let mut config = Config::default();
        config.recording.output_dir = Some(PathBuf::from("/tmp/recordings"));
        config.recording.compress = true;
        let store = config.file_store("/work");
        assert_eq!(store.output_dir, PathBuf::from("/tmp/recordings"));
        assert_eq!(store.base_dir, PathBuf::from("/work"));
        assert!(store.compress);
    }
}
