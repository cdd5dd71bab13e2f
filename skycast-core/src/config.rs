use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

/// Configuration for a single provider (API key plus optional overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's default endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name, only meaningful for AI providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Whether `skycast here` may look up the current position.
    #[serde(default = "default_geolocation")]
    pub geolocation: bool,

    /// Overrides the IP geolocation endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation_url: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_geolocation() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self { geolocation: true, geolocation_url: None, providers: HashMap::new() }
    }
}

/// The two opaque API keys consumed by lookups and insights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub weather_api_key: Option<String>,
    pub ai_api_key: Option<String>,
}

impl Credentials {
    /// Weather key, treating blank strings as absent.
    pub fn weather_key(&self) -> Option<&str> {
        non_blank(self.weather_api_key.as_deref())
    }

    /// AI key, treating blank strings as absent.
    pub fn ai_key(&self) -> Option<&str> {
        non_blank(self.ai_api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key, keeping any other overrides.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key = api_key;
    }

    /// Returns API key for a provider, if present and non-blank.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        non_blank(self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str()))
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    /// Apply `OPENWEATHER_API_KEY`, `GEMINI_API_KEY` and `GEMINI_MODEL` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.env_key()).filter(|v| !v.trim().is_empty()) {
                self.upsert_provider_api_key(*id, key);
            }
        }

        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.trim().is_empty()) {
            self.providers.entry(ProviderId::Gemini.as_str().to_string()).or_default().model =
                Some(model);
        }

        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            weather_api_key: self.provider_api_key(ProviderId::OpenWeather).map(str::to_owned),
            ai_api_key: self.provider_api_key(ProviderId::Gemini).map(str::to_owned),
        }
    }
}
