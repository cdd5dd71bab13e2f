//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Input resolution (city names, current position)
//! - The OpenWeather client and its error taxonomy
//! - AI insight generation over a structured-output model
//! - Dashboard state transitions and the controller driving them
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod insight;
pub mod model;
pub mod provider;
pub mod resolver;

pub use config::{Config, Credentials, ProviderConfig};
pub use dashboard::{Action, Dashboard, DashboardState, reduce};
pub use error::{InsightError, LocationError, WeatherError};
pub use insight::{GeminiModel, InsightModel};
pub use model::{Condition, Coordinates, InsightResult, LookupRequest, WeatherSnapshot};
pub use provider::{ProviderId, WeatherProvider, openweather::OpenWeatherProvider};
pub use resolver::{DisabledGeolocator, FixedGeolocator, Geolocator, IpGeolocator};
