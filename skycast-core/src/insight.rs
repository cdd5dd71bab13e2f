//! AI commentary on a weather snapshot.
//!
//! The model is built once from configuration and handed to [`generate`]
//! explicitly; a missing AI key means there is no model at all.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Config, Credentials,
    error::InsightError,
    model::{InsightResult, WeatherSnapshot},
    provider::ProviderId,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// A completion call constrained to a JSON schema.
#[async_trait]
pub trait InsightModel: Send + Sync {
    /// Returns the raw JSON text of the reply, or `None` if the provider sent
    /// nothing back.
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Option<String>>;
}

/// Prompt embedding the snapshot's location and conditions.
pub fn build_prompt(snapshot: &WeatherSnapshot) -> String {
    format!(
        "Analyze the current weather for {location}, {country}.\n\
         Temperature: {temp}°C (feels like {feels}°C).\n\
         Conditions: {description}.\n\
         Humidity: {humidity}%.\n\
         Wind speed: {wind} m/s.\n\n\
         Reply with a one-sentence summary of the weather, practical advice on what to wear, \
         and a short fun fact related to this weather or location.",
        location = snapshot.location_name,
        country = snapshot.country,
        temp = snapshot.temperature,
        feels = snapshot.feels_like,
        description = snapshot.condition.description,
        humidity = snapshot.humidity_pct,
        wind = snapshot.wind_speed_mps,
    )
}

/// Response schema: an object with three required string fields.
pub fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A one-sentence summary of the weather."
            },
            "outfitAdvice": {
                "type": "STRING",
                "description": "Clothing advice for this weather."
            },
            "funFact": {
                "type": "STRING",
                "description": "A fun fact related to the weather or location."
            }
        },
        "required": ["summary", "outfitAdvice", "funFact"]
    })
}

/// Produce an insight for `snapshot`.
///
/// Never touches the network when `model` is `None`.
pub async fn generate(
    model: Option<&dyn InsightModel>,
    snapshot: &WeatherSnapshot,
) -> Result<InsightResult, InsightError> {
    let model = model.ok_or(InsightError::Configuration)?;

    let prompt = build_prompt(snapshot);
    let text = model
        .generate_json(&prompt, &insight_schema())
        .await
        .map_err(InsightError::GenerationFailed)?;

    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(InsightError::EmptyResponse),
    };

    serde_json::from_str::<InsightResult>(&text)
        .context("AI reply did not match the insight schema")
        .map_err(InsightError::GenerationFailed)
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini `generateContent` with structured JSON output.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        }
    }

    /// Build the model only if the credentials carry an AI key.
    pub fn from_credentials(
        credentials: &Credentials,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Option<Self> {
        let api_key = credentials.ai_key()?.to_owned();
        Some(Self::new(api_key, model, base_url))
    }

    /// Build the model from the configured Gemini key and overrides.
    pub fn from_config(config: &Config) -> Option<Self> {
        let provider = config.provider_config(ProviderId::Gemini);

        Self::from_credentials(
            &config.credentials(),
            provider.and_then(|p| p.model.clone()),
            provider.and_then(|p| p.base_url.clone()),
        )
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl InsightModel for GeminiModel {
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Option<String>> {
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        tracing::debug!(model = %self.model, "requesting weather insight");

        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini request failed with status {status}: {}", truncate_body(&body)));
        }

        let parsed: GenerateResponse =
            res.json().await.context("Failed to parse Gemini response JSON")?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;
    use chrono::Utc;
    use std::sync::Mutex;

    struct CannedModel {
        reply: Mutex<Option<Result<Option<String>>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(reply: Result<Option<String>>) -> Self {
            Self { reply: Mutex::new(Some(reply)), prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl InsightModel for CannedModel {
        async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<Option<String>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.lock().unwrap().take().unwrap_or(Ok(None))
        }
    }

    fn london() -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: "London".into(),
            country: "GB".into(),
            temperature: 15.0,
            feels_like: 14.0,
            humidity_pct: 80,
            wind_speed_mps: 3.0,
            condition: Condition { description: "light rain".into(), icon: "10d".into() },
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_embeds_every_snapshot_field() {
        let prompt = build_prompt(&london());

        for needle in ["London", "GB", "15°C", "14°C", "light rain", "80%", "3 m/s"] {
            assert!(prompt.contains(needle), "prompt missing {needle}: {prompt}");
        }
    }

    #[test]
    fn schema_requires_all_three_fields() {
        let schema = insight_schema();
        let required: Vec<&str> =
            schema["required"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
        assert_eq!(required, ["summary", "outfitAdvice", "funFact"]);
    }

    #[tokio::test]
    async fn missing_model_is_configuration_error() {
        let err = generate(None, &london()).await.unwrap_err();
        assert!(matches!(err, InsightError::Configuration));
    }

    #[tokio::test]
    async fn parses_structured_reply() {
        let model = CannedModel::new(Ok(Some(
            r#"{"summary":"Drizzly.","outfitAdvice":"Bring an umbrella.","funFact":"London gets about 150 rainy days a year."}"#
                .into(),
        )));

        let insight = generate(Some(&model), &london()).await.expect("insight");

        assert_eq!(insight.summary, "Drizzly.");
        assert_eq!(insight.outfit_advice, "Bring an umbrella.");
        assert_eq!(insight.fun_fact, "London gets about 150 rainy days a year.");
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_reply_is_empty_response() {
        let model = CannedModel::new(Ok(Some("  ".into())));
        let err = generate(Some(&model), &london()).await.unwrap_err();
        assert!(matches!(err, InsightError::EmptyResponse));

        let model = CannedModel::new(Ok(None));
        let err = generate(Some(&model), &london()).await.unwrap_err();
        assert!(matches!(err, InsightError::EmptyResponse));
    }

    #[tokio::test]
    async fn missing_required_field_is_generation_failure() {
        let model = CannedModel::new(Ok(Some(r#"{"summary":"Drizzly.","funFact":"x"}"#.into())));
        let err = generate(Some(&model), &london()).await.unwrap_err();
        assert!(matches!(err, InsightError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn null_field_is_generation_failure() {
        let model = CannedModel::new(Ok(Some(
            r#"{"summary":"Drizzly.","outfitAdvice":null,"funFact":"x"}"#.into(),
        )));
        let err = generate(Some(&model), &london()).await.unwrap_err();
        assert!(matches!(err, InsightError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn call_failure_is_wrapped() {
        let model = CannedModel::new(Err(anyhow!("HTTP 503: overloaded")));
        let err = generate(Some(&model), &london()).await.unwrap_err();

        assert!(matches!(err, InsightError::GenerationFailed(_)));
        assert!(!err.to_string().contains("overloaded"));
    }

    #[test]
    fn from_config_requires_ai_key() {
        let mut cfg = Config::default();
        assert!(GeminiModel::from_config(&cfg).is_none());

        cfg.upsert_provider_api_key(ProviderId::Gemini, "KEY".into());
        let model = GeminiModel::from_config(&cfg).expect("model with key");
        assert_eq!(model.model_name(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn from_credentials_uses_ai_key_only() {
        let weather_only =
            Credentials { weather_api_key: Some("OW".into()), ai_api_key: None };
        assert!(GeminiModel::from_credentials(&weather_only, None, None).is_none());

        let blank = Credentials { weather_api_key: None, ai_api_key: Some("  ".into()) };
        assert!(GeminiModel::from_credentials(&blank, None, None).is_none());

        let creds = Credentials { weather_api_key: None, ai_api_key: Some("AI".into()) };
        let model = GeminiModel::from_credentials(&creds, Some("m".into()), None)
            .expect("model with key");
        assert_eq!(model.api_key, "AI");
        assert_eq!(model.model_name(), "m");
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let model = GeminiModel::new("k".into(), Some("m".into()), Some("http://host/v1beta/".into()));
        assert_eq!(model.endpoint(), "http://host/v1beta/models/m:generateContent");
    }
}
