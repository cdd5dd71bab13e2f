//! Dashboard state and the controller that drives it.
//!
//! All state changes go through [`reduce`]. Lookups are tagged with a
//! generation number so a result that arrives after a newer lookup started is
//! dropped instead of overwriting newer state.

use crate::{
    config::Credentials,
    insight::{self, InsightModel},
    model::{InsightResult, LookupRequest, WeatherSnapshot},
    provider::WeatherProvider,
    resolver::{self, Geolocator},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// City text of the last name lookup, if any.
    pub city: Option<String>,
    pub weather: Option<WeatherSnapshot>,
    pub insight: Option<InsightResult>,
    pub loading: bool,
    pub insight_loading: bool,
    /// User-facing message for the last failed lookup.
    pub error: Option<String>,
    pub generation: u64,
}

impl DashboardState {
    /// Whether an insight may be requested right now.
    pub fn can_request_insight(&self) -> bool {
        self.weather.is_some() && !self.insight_loading
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    StartLookup { city: Option<String> },
    LookupSucceeded { generation: u64, snapshot: WeatherSnapshot },
    LookupFailed { generation: u64, message: String },
    StartInsight,
    InsightSucceeded { generation: u64, insight: InsightResult },
    InsightFailed { generation: u64 },
}

pub fn reduce(state: DashboardState, action: Action) -> DashboardState {
    match action {
        Action::StartLookup { city } => DashboardState {
            city,
            weather: None,
            insight: None,
            loading: true,
            insight_loading: false,
            error: None,
            generation: state.generation + 1,
        },
        Action::LookupSucceeded { generation, snapshot } if generation == state.generation => {
            DashboardState { weather: Some(snapshot), loading: false, error: None, ..state }
        }
        Action::LookupFailed { generation, message } if generation == state.generation => {
            DashboardState { weather: None, loading: false, error: Some(message), ..state }
        }
        Action::StartInsight if state.weather.is_some() => {
            DashboardState { insight: None, insight_loading: true, ..state }
        }
        Action::InsightSucceeded { generation, insight }
            if generation == state.generation && state.weather.is_some() =>
        {
            DashboardState { insight: Some(insight), insight_loading: false, ..state }
        }
        Action::InsightFailed { generation } if generation == state.generation => {
            DashboardState { insight_loading: false, ..state }
        }
        // Stale results and insight requests without weather.
        _ => state,
    }
}

/// Owns the dashboard state and the two external clients.
pub struct Dashboard {
    state: DashboardState,
    weather: Box<dyn WeatherProvider>,
    insight_model: Option<Box<dyn InsightModel>>,
    credentials: Credentials,
}

impl Dashboard {
    pub fn new(
        weather: Box<dyn WeatherProvider>,
        insight_model: Option<Box<dyn InsightModel>>,
        credentials: Credentials,
    ) -> Self {
        Self { state: DashboardState::default(), weather, insight_model, credentials }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Look up weather by city name. Blank input is ignored entirely.
    pub async fn search(&mut self, input: &str) {
        let Some(request) = resolver::resolve_city(input) else {
            tracing::debug!("ignoring empty city input");
            return;
        };

        let city = match &request {
            LookupRequest::City(city) => Some(city.clone()),
            LookupRequest::Coordinates(_) => None,
        };
        self.dispatch(Action::StartLookup { city });
        let generation = self.state.generation;

        let result = self.weather.fetch(&request, self.credentials.weather_key()).await;
        self.finish_lookup(generation, result.map_err(|e| e.to_string()));
    }

    /// Look up weather for the current position.
    pub async fn locate(&mut self, geo: &dyn Geolocator) {
        self.dispatch(Action::StartLookup { city: None });
        let generation = self.state.generation;

        let result = match resolver::resolve_location(geo).await {
            Ok(request) => self
                .weather
                .fetch(&request, self.credentials.weather_key())
                .await
                .map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };
        self.finish_lookup(generation, result);
    }

    fn finish_lookup(&mut self, generation: u64, result: Result<WeatherSnapshot, String>) {
        match result {
            Ok(snapshot) => self.dispatch(Action::LookupSucceeded { generation, snapshot }),
            Err(message) => {
                tracing::info!(%message, "weather lookup failed");
                self.dispatch(Action::LookupFailed { generation, message });
            }
        }
    }

    /// Ask the AI model about the current snapshot.
    ///
    /// Returns `false` without contacting the model when there is no weather
    /// to describe. Failures are logged and leave the weather untouched.
    pub async fn request_insight(&mut self) -> bool {
        let Some(snapshot) = self.state.weather.clone() else {
            tracing::debug!("insight requested before any successful lookup");
            return false;
        };

        self.dispatch(Action::StartInsight);
        let generation = self.state.generation;

        match insight::generate(self.insight_model.as_deref(), &snapshot).await {
            Ok(insight) => {
                self.dispatch(Action::InsightSucceeded { generation, insight });
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, cause = ?std::error::Error::source(&err), "insight generation failed");
                self.dispatch(Action::InsightFailed { generation });
                false
            }
        }
    }
}
