use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{cache::default_ttl, units::TemperatureUnit};

/// Environment variable that overrides the configured API key.
pub const TOKEN_ENV_VAR: &str = "OPENWEATHER_API_TOKEN";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// unit = "fahrenheit"
/// detailed = true
/// cache_ttl_minutes = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub unit: Option<TemperatureUnit>,
    pub detailed: Option<bool>,
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_minutes: Option<i64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// API key: `$OPENWEATHER_API_TOKEN` wins over the file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Result<String> {
        env_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.api_key.clone().filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API token configured.\n\
                     Hint: run `weather configure` or set {TOKEN_ENV_VAR}."
                )
            })
    }

    /// Where cache entries live: the configured directory, else the platform
    /// cache directory, else the system temp directory.
    pub fn cache_root(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }

        match Self::project_dirs() {
            Ok(dirs) => dirs.cache_dir().to_path_buf(),
            Err(_) => std::env::temp_dir().join("weather-cli"),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        match self.cache_ttl_minutes {
            Some(minutes) if minutes > 0 => Duration::minutes(minutes),
            _ => default_ttl(),
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit.unwrap_or_default()
    }

    pub fn detailed(&self) -> bool {
        self.detailed.unwrap_or(false)
    }
}
