use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What a single lookup asks the weather provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupRequest {
    City(String),
    Coordinates(Coordinates),
}

impl LookupRequest {
    pub fn is_city(&self) -> bool {
        matches!(self, LookupRequest::City(_))
    }
}

/// Sky condition as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

/// Current conditions for one location, in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    pub fetched_at: DateTime<Utc>,
}

/// AI commentary derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub summary: String,
    pub outfit_advice: String,
    pub fun_fact: String,
}
