//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use workout_core::rest::RestTimerSettings;
use workout_sync::SyncConfig;

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["workout.toml", ".workout.toml", "workout.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Sync timing.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Rest timer preferences.
    #[serde(default)]
    pub rest_timer: RestTimerSettings,

    /// Where session data lives.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Relative paths resolve against the working
    /// directory; unset means the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

/// Generate a default workout.toml.
pub fn generate_default_config() -> String {
    r#"# Workout session configuration

[sync]
# Quiet interval before edits are saved.
debounce_ms = 500
# Wait after a session-changed signal before reloading.
external_reload_delay_ms = 100
tick_interval_ms = 1000
request_timeout_ms = 10000
signal_capacity = 64

[rest_timer]
default_secs = 60
step_secs = 15
auto_start = false
sound_enabled = true

[storage]
# data_dir = ".workout"
"#
    .to_string()
}
