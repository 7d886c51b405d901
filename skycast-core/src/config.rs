use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{gateway::weatherapi::DEFAULT_BASE_URL, model::TemperatureUnit};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

pub const DEFAULT_FORECAST_DAYS: u8 = 5;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_unit = "fahrenheit"
/// forecast_days = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com key. `WEATHER_API_KEY` takes precedence.
    pub api_key: Option<String>,

    /// Override for the API root, e.g. a local mock server.
    pub base_url: Option<String>,

    pub forecast_days: u8,

    pub default_unit: TemperatureUnit,

    /// Where the search history is kept; defaults to the platform data dir.
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            forecast_days: DEFAULT_FORECAST_DAYS,
            default_unit: TemperatureUnit::default(),
            history_file: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the history file, honouring the `history_file` override.
    pub fn history_file_path(&self) -> Result<PathBuf> {
        match &self.history_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("history.json")),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Resolve the API key from the environment or the config file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No WeatherAPI key configured.\n\
                     Hint: run `skycast configure` or set the {API_KEY_ENV} environment variable."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key_with_env(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI key configured"));
        assert!(msg.contains("skycast configure"));
    }

    #[test]
    fn environment_key_overrides_config_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        assert_eq!(cfg.api_key_with_env(None).unwrap(), "FILE_KEY");
        assert_eq!(cfg.api_key_with_env(Some("ENV_KEY".into())).unwrap(), "ENV_KEY");
    }

    #[test]
    fn blank_keys_are_ignored() {
        let mut cfg = Config::default();
        cfg.api_key = Some("   ".into());

        assert!(cfg.api_key_with_env(Some(String::new())).is_err());
    }

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg: Config = toml::from_str("api_key = \"K\"").unwrap();

        assert_eq!(cfg.forecast_days, DEFAULT_FORECAST_DAYS);
        assert_eq!(cfg.default_unit, TemperatureUnit::Celsius);
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.default_unit = TemperatureUnit::Fahrenheit;
        cfg.forecast_days = 3;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.default_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(loaded.forecast_days, 3);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn history_file_override_is_used() {
        let cfg = Config {
            history_file: Some(PathBuf::from("/tmp/skycast-history.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.history_file_path().unwrap(),
            PathBuf::from("/tmp/skycast-history.json")
        );
    }
}
