use crate::{
    Config, LookupRequest, WeatherSnapshot, error::WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;

/// External services skycast holds credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Environment variable that overrides the configured API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Gemini]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, gemini."
            )),
        }
    }
}

/// A source of current weather conditions.
///
/// The API key is passed per call; `None` or a blank key must fail with
/// [`WeatherError::Configuration`] before any network traffic.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        request: &LookupRequest,
        api_key: Option<&str>,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the weather provider, honouring a configured base URL.
pub fn weather_provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    let base_url = config
        .provider_config(ProviderId::OpenWeather)
        .and_then(|p| p.base_url.clone());

    match base_url {
        Some(url) => Box::new(OpenWeatherProvider::with_base_url(url)),
        None => Box::new(OpenWeatherProvider::new()),
    }
}
