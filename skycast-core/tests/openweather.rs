//! OpenWeather client behaviour against a mock HTTP server.

use skycast_core::{
    Coordinates, LookupRequest, OpenWeatherProvider, WeatherError, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn london_body() -> serde_json::Value {
    serde_json::json!({
        "name": "London",
        "sys": { "country": "GB" },
        "main": { "temp": 15, "feels_like": 14, "humidity": 80 },
        "wind": { "speed": 3 },
        "weather": [{ "description": "light rain", "icon": "10d" }]
    })
}

fn provider_for(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url(format!("{}/data/2.5/weather", server.uri()))
}

fn coords() -> LookupRequest {
    LookupRequest::Coordinates(Coordinates { latitude: 51.51, longitude: -0.13 })
}

#[tokio::test]
async fn test_city_lookup_maps_body_exactly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = provider_for(&mock_server)
        .fetch(&LookupRequest::City("London".into()), Some("KEY"))
        .await
        .unwrap();

    assert_eq!(snapshot.location_name, "London");
    assert_eq!(snapshot.country, "GB");
    assert_eq!(snapshot.temperature, 15.0);
    assert_eq!(snapshot.feels_like, 14.0);
    assert_eq!(snapshot.humidity_pct, 80);
    assert_eq!(snapshot.wind_speed_mps, 3.0);
    assert_eq!(snapshot.condition.description, "light rain");
    assert_eq!(snapshot.condition.icon, "10d");
}

#[tokio::test]
async fn test_city_name_is_sent_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "São Paulo, BR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server)
        .fetch(&LookupRequest::City("São Paulo, BR".into()), Some("KEY"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_coordinate_lookup_sends_lat_lon() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("lat", "51.51"))
        .and(query_param("lon", "-0.13"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = provider_for(&mock_server).fetch(&coords(), Some("KEY")).await.unwrap();
    assert_eq!(snapshot.location_name, "London");
}

#[tokio::test]
async fn test_unauthorized_is_invalid_credentials_for_both_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);

    let err = provider.fetch(&LookupRequest::City("London".into()), Some("BAD")).await.unwrap_err();
    assert!(matches!(err, WeatherError::InvalidCredentials));

    let err = provider.fetch(&coords(), Some("BAD")).await.unwrap_err();
    assert!(matches!(err, WeatherError::InvalidCredentials));
}

#[tokio::test]
async fn test_not_found_is_city_specific() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);

    let err = provider
        .fetch(&LookupRequest::City("InvalidCity123".into()), Some("KEY"))
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::NotFound));
    assert_eq!(err.to_string(), "City not found. Please try again.");

    let err = provider.fetch(&coords(), Some("KEY")).await.unwrap_err();
    assert!(matches!(err, WeatherError::Provider { .. }));
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&LookupRequest::City("London".into()), Some("KEY"))
        .await
        .unwrap_err();

    match err {
        WeatherError::Provider { status } => {
            assert!(status.contains("500"));
            assert!(!status.contains("exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&LookupRequest::City("London".into()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Configuration));
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "London",
            "main": { "temp": 15 }
        })))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch(&LookupRequest::City("London".into()), Some("KEY"))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::MalformedResponse(_)));
}
