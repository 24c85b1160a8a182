use anyhow::{Context, Result, anyhow, bail};
use chrono::TimeDelta;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "SEVERN_API_KEY";

pub const DEFAULT_CLOSURES_URL: &str =
    "https://api.data.nationalhighways.co.uk/roads/v2.0/closures";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// National Highways subscription key.
    pub api_key: Option<String>,
    pub closures_url: String,
    pub weather_url: String,
    /// Point the weather forecast is taken for. Defaults to the M48 bridge.
    pub latitude: f64,
    pub longitude: f64,
    pub timeout_secs: u64,
    pub weather_cache_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            closures_url: DEFAULT_CLOSURES_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            latitude: 51.61,
            longitude: -2.64,
            timeout_secs: 10,
            weather_cache_minutes: 30,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// `SEVERN_API_KEY` wins over the stored key.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
            cfg.api_key = Some(key.trim().to_string());
        }

        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Reject values the feeds cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }

        match TimeDelta::try_minutes(self.weather_cache_minutes) {
            Some(_) if self.weather_cache_minutes >= 0 => Ok(()),
            _ => bail!(
                "weather_cache_minutes must be between 0 and {}, got {}",
                TimeDelta::MAX.num_minutes(),
                self.weather_cache_minutes
            ),
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
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
        let dirs = ProjectDirs::from("dev", "severn-bridges", "severn")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Out-of-range values clamp instead of panicking; `validate` reports them.
    pub fn weather_cache_ttl(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.weather_cache_minutes.max(0)).unwrap_or(TimeDelta::MAX)
    }
}
