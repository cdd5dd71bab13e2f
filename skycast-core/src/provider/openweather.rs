use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{Condition, LookupRequest, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeather "current weather" endpoint, always in metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenWeatherProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }

    fn query_for(request: &LookupRequest, api_key: &str) -> Vec<(&'static str, String)> {
        let mut query = match request {
            LookupRequest::City(city) => vec![("q", city.clone())],
            LookupRequest::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        };
        query.push(("units", "metric".to_string()));
        query.push(("appid", api_key.to_string()));
        query
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    // Absent for coordinates over open water.
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

/// Map a non-success status to the lookup error taxonomy.
///
/// 404 only means "unknown city" for name lookups; for coordinates it is a
/// plain provider failure.
fn classify_status(status: StatusCode, request: &LookupRequest) -> WeatherError {
    match status {
        StatusCode::UNAUTHORIZED => WeatherError::InvalidCredentials,
        StatusCode::NOT_FOUND if request.is_city() => WeatherError::NotFound,
        _ => WeatherError::Provider { status: status.to_string() },
    }
}

fn parse_current(body: &str) -> Result<WeatherSnapshot, WeatherError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(WeatherError::MalformedResponse)?;

    let weather = parsed.weather.into_iter().next().ok_or_else(|| {
        WeatherError::MalformedResponse(serde::de::Error::custom("`weather` array is empty"))
    })?;

    Ok(WeatherSnapshot {
        location_name: parsed.name,
        country: parsed.sys.country,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        condition: Condition { description: weather.description, icon: weather.icon },
        fetched_at: Utc::now(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(
        &self,
        request: &LookupRequest,
        api_key: Option<&str>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let api_key =
            api_key.filter(|k| !k.trim().is_empty()).ok_or(WeatherError::Configuration)?;

        tracing::debug!(?request, url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&Self::query_for(request, api_key))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "weather provider rejected lookup");
            return Err(classify_status(status, request));
        }

        let body = res.text().await?;
        let snapshot = parse_current(&body)?;

        tracing::info!(
            location = %snapshot.location_name,
            country = %snapshot.country,
            "weather lookup succeeded"
        );
        Ok(snapshot)
    }
}
