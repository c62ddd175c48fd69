//! Application-level configuration loading, including the default game
//! settings applied to newly created games.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::GameSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "FISHBOWL_BACK_CONFIG_PATH";

/// Baked-in defaults used when no configuration file is present.
const DEFAULT_SETTINGS: GameSettings = GameSettings {
    word_count_per_person: 5,
    round_length_seconds: 60,
    skip_penalty_seconds: 10,
};

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    default_settings: GameSettings,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults on any failure.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Settings a game starts with when the host does not override them.
    pub fn default_settings(&self) -> GameSettings {
        self.default_settings
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_settings: DEFAULT_SETTINGS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file.
struct RawConfig {
    #[serde(default)]
    word_count_per_person: Option<u32>,
    #[serde(default)]
    round_length_seconds: Option<u32>,
    #[serde(default)]
    skip_penalty_seconds: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            default_settings: GameSettings {
                word_count_per_person: value
                    .word_count_per_person
                    .unwrap_or(DEFAULT_SETTINGS.word_count_per_person),
                round_length_seconds: value
                    .round_length_seconds
                    .unwrap_or(DEFAULT_SETTINGS.round_length_seconds),
                skip_penalty_seconds: value
                    .skip_penalty_seconds
                    .unwrap_or(DEFAULT_SETTINGS.skip_penalty_seconds),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"roundLengthSeconds": 90}"#).unwrap();
        let config: AppConfig = raw.into();
        let settings = config.default_settings();
        assert_eq!(settings.round_length_seconds, 90);
        assert_eq!(settings.word_count_per_person, 5);
        assert_eq!(settings.skip_penalty_seconds, 10);
    }
}
