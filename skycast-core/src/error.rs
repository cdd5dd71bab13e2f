//! Error taxonomy for lookups and insights.
//!
//! The `Display` text of each variant is what the dashboard shows to the user,
//! so none of them embed raw provider bodies.

/// Weather lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key is not configured.")]
    Configuration,
    #[error("Invalid API key. Please check your weather API key.")]
    InvalidCredentials,
    #[error("City not found. Please try again.")]
    NotFound,
    #[error("Failed to fetch weather data: {status}")]
    Provider { status: String },
    #[error("Weather provider returned an unexpected response.")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Failed to reach the weather provider.")]
    Network(#[from] reqwest::Error),
}

/// Failures while resolving the current position.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Geolocation is not supported on this system.")]
    Unsupported,
    #[error("Unable to retrieve your location.")]
    Denied,
}

/// Insight generation failures. Logged, never shown as a blocking error.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("AI API key is not configured.")]
    Configuration,
    #[error("AI provider returned an empty response.")]
    EmptyResponse,
    #[error("Failed to generate weather insight.")]
    GenerationFailed(#[source] anyhow::Error),
}
