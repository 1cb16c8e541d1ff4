//! Configuration type definitions.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input pipeline settings.
///
/// Controls whether bridged events reach the application and which optional
/// device features consumers should honour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputConfig {
    /// Deliver bridged events to the application sink
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Consumers should react to touch events
    #[serde(default = "default_true")]
    pub touch_enabled: bool,

    /// Consumers should react to keyboard events
    #[serde(default = "default_true")]
    pub keyboard_enabled: bool,

    /// Allow pointer-lock requests on the surface
    #[serde(default)]
    pub pointer_lock_enabled: bool,

    /// Playback log loaded on init: a path (relative to the working directory)
    /// or a `file://` URL
    #[serde(default)]
    pub playback_file: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            touch_enabled: true,
            keyboard_enabled: true,
            pointer_lock_enabled: false,
            playback_file: None,
        }
    }
}

impl InputConfig {
    /// Merges the fields present in `patch`.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(touch_enabled) = patch.touch_enabled {
            self.touch_enabled = touch_enabled;
        }
        if let Some(keyboard_enabled) = patch.keyboard_enabled {
            self.keyboard_enabled = keyboard_enabled;
        }
        if let Some(pointer_lock_enabled) = patch.pointer_lock_enabled {
            self.pointer_lock_enabled = pointer_lock_enabled;
        }
        if let Some(playback_file) = &patch.playback_file {
            self.playback_file = Some(playback_file.clone());
        }
    }
}

/// Partial [`InputConfig`] update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer_lock_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_file: Option<String>,
}

impl ConfigPatch {
    /// True when the patch names a device-enablement flag consumers react to.
    pub fn touches_device_flags(&self) -> bool {
        self.touch_enabled.is_some() || self.keyboard_enabled.is_some()
    }
}

/// Recording artifact settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordingConfig {
    /// Directory for saved recordings (default: `<data dir>/input-relay/recordings`)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Write recordings as gzip-compressed JSON
    #[serde(default)]
    pub compress: bool,
}

impl RecordingConfig {
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("input-relay")
                .join("recordings")
        })
    }
}

fn default_true() -> bool {
    true
}
