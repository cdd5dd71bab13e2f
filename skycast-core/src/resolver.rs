//! Turns user actions into lookup requests.
//!
//! A city name is taken as typed (trimmed). A location request goes through a
//! [`Geolocator`], which stands in for the platform's position capability.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::LocationError,
    model::{Coordinates, LookupRequest},
};

pub const DEFAULT_IP_GEOLOCATION_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// One-shot current-position capability.
#[async_trait]
pub trait Geolocator: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Returns `None` for empty or whitespace-only input.
pub fn resolve_city(input: &str) -> Option<LookupRequest> {
    let city = input.trim();
    if city.is_empty() { None } else { Some(LookupRequest::City(city.to_string())) }
}

/// Ask the geolocator for a single reading.
///
/// An unsupported geolocator is never queried. Any failure of the reading
/// itself is reported as [`LocationError::Denied`].
pub async fn resolve_location(geo: &dyn Geolocator) -> Result<LookupRequest, LocationError> {
    if !geo.is_supported() {
        return Err(LocationError::Unsupported);
    }

    match geo.current_position().await {
        Ok(coords) => Ok(LookupRequest::Coordinates(coords)),
        Err(err) => {
            tracing::debug!(error = %err, "current position unavailable");
            Err(LocationError::Denied)
        }
    }
}

/// Position supplied up front, e.g. from `--lat/--lon`.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Geolocation switched off in configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeolocator;

#[async_trait]
impl Geolocator for DisabledGeolocator {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximate position from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new(DEFAULT_IP_GEOLOCATION_URL)
    }
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|e| {
            tracing::debug!(error = %e, "IP geolocation request failed");
            LocationError::Denied
        })?;

        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), "IP geolocation rejected");
            return Err(LocationError::Denied);
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            tracing::debug!(error = %e, "IP geolocation parse error");
            LocationError::Denied
        })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => {
                tracing::debug!(status = %body.status, message = ?body.message, "IP geolocation failed");
                Err(LocationError::Denied)
            }
        }
    }
}
