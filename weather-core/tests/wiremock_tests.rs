//! Integration tests for the OpenWeather provider, IP geolocation and the
//! controller, run against a mock HTTP server.

use weather_lookup_core::{
    Controller, Coordinates, FALLBACK_COORDINATES, GeolocationResolver, IpLocator, LocationQuery,
    LookupError, OpenWeatherProvider, WeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "TEST_KEY_123";

fn tokyo_weather() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 139.6917, "lat": 35.6895},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "base": "stations",
        "main": {
            "temp": 294.15,
            "feels_like": 293.9,
            "temp_min": 292.15,
            "temp_max": 297.15,
            "pressure": 1015,
            "humidity": 60
        },
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 150},
        "clouds": {"all": 75},
        "dt": 1760574600,
        "sys": {"type": 2, "id": 268395, "country": "JP", "sunrise": 1760562000, "sunset": 1760602800},
        "timezone": 32400,
        "id": 1850147,
        "name": "Tokyo",
        "cod": 200
    })
}

fn tokyo_geocode() -> serde_json::Value {
    serde_json::json!([
        {
            "name": "Tokyo",
            "local_names": {"en": "Tokyo", "ja": "東京都"},
            "lat": 35.6895,
            "lon": 139.6917,
            "country": "JP",
            "state": "Tokyo"
        }
    ])
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(API_KEY).with_base_url(server.uri())
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn geocode_sends_combined_query_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Tokyo,JP"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_geocode()))
        .expect(1)
        .mount(&server)
        .await;

    let query = LocationQuery::parse("Tokyo, JP").unwrap();
    let matches = provider(&server).geocode(&query).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Tokyo");
    assert_eq!(matches[0].country, "JP");
    assert_eq!(matches[0].state.as_deref(), Some("Tokyo"));
    assert_eq!(matches[0].coordinates(), Coordinates::new(35.6895, 139.6917));
}

#[tokio::test]
async fn geocode_without_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let query = LocationQuery::parse("Atlantis, XX").unwrap();
    let matches = provider(&server).geocode(&query).await.unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn geocode_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"cod":401,"message":"Invalid API key."}"#),
        )
        .mount(&server)
        .await;

    let query = LocationQuery::parse("Tokyo, JP").unwrap();
    let err = provider(&server).geocode(&query).await.unwrap_err();

    assert_eq!(err.reason(), "status");
    match err {
        LookupError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// ============================================================================
// Current weather
// ============================================================================

#[tokio::test]
async fn current_weather_uses_exact_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "1.3521"))
        .and(query_param("lon", "103.8198"))
        .and(query_param("APPID", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_weather()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = provider(&server)
        .current(Coordinates::new(1.3521, 103.8198))
        .await
        .unwrap();

    assert_eq!(snapshot.id, 1850147);
}

#[tokio::test]
async fn current_weather_is_parsed_into_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_weather()))
        .mount(&server)
        .await;

    let s = provider(&server)
        .current(Coordinates::new(35.6895, 139.6917))
        .await
        .unwrap();

    assert_eq!(s.name, "Tokyo");
    assert_eq!(s.country, "JP");
    assert_eq!(s.humidity_pct, 60);
    assert_eq!(s.condition.id, 803);
    assert_eq!(s.condition.main, "Clouds");
    assert_eq!(s.utc_offset_secs, 32400);
    assert!((s.temperature_k - 294.15).abs() < 1e-9);
    assert!(!s.is_clear());
}

#[tokio::test]
async fn malformed_weather_payload_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current(Coordinates::new(0.0, 0.0))
        .await
        .unwrap_err();

    assert_eq!(err.reason(), "parse");
    assert_eq!(err.user_message(), "Weather data for this location cannot be found");
}

#[tokio::test]
async fn transport_error_does_not_leak_api_key() {
    let provider = OpenWeatherProvider::new(API_KEY).with_base_url("http://127.0.0.1:9");

    let err = provider.current(Coordinates::new(1.0, 2.0)).await.unwrap_err();

    assert_eq!(err.reason(), "transport");
    assert!(!err.to_string().contains(API_KEY));
}

// ============================================================================
// Controller end to end
// ============================================================================

async fn mount_tokyo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Tokyo,JP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_geocode()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "35.6895"))
        .and(query_param("lon", "139.6917"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_weather()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn searching_tokyo_twice_keeps_one_history_entry() {
    let server = MockServer::start().await;
    mount_tokyo(&server).await;
    let mut ctl = Controller::new(provider(&server));

    ctl.search("Tokyo, JP").await;

    let state = ctl.state();
    assert_eq!(state.current.as_ref().map(|s| s.name.as_str()), Some("Tokyo"));
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history.entries()[0].label(), "Tokyo, JP");

    ctl.search("Tokyo, JP").await;

    assert_eq!(ctl.state().history.len(), 1);
    assert_eq!(ctl.state().history.entries()[0].id, 1850147);
    assert!(ctl.state().error.is_none());
}

#[tokio::test]
async fn unknown_place_shows_invalid_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_weather()))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctl = Controller::new(provider(&server));
    ctl.search("Atlantis, XX").await;

    assert_eq!(ctl.state().error.as_deref(), Some("City and Country are invalid"));
    assert!(ctl.state().history.is_empty());
}

// ============================================================================
// Geolocation
// ============================================================================

#[tokio::test]
async fn ip_locator_reads_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "Japan",
            "city": "Tokyo",
            "lat": 35.6895,
            "lon": 139.6917
        })))
        .mount(&server)
        .await;

    let resolver = GeolocationResolver::new(IpLocator::new(
        format!("{}/json", server.uri()),
        reqwest::Client::new(),
    ));

    assert_eq!(resolver.current_location().await, Coordinates::new(35.6895, 139.6917));
}

#[tokio::test]
async fn ip_locator_failure_falls_back_to_singapore() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let resolver = GeolocationResolver::new(IpLocator::new(
        format!("{}/json", server.uri()),
        reqwest::Client::new(),
    ));

    assert_eq!(resolver.current_location().await, FALLBACK_COORDINATES);
}

#[tokio::test]
async fn initial_fetch_after_failed_location_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "1.3521"))
        .and(query_param("lon", "103.8198"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_weather()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = GeolocationResolver::new(IpLocator::new(
        format!("{}/json", server.uri()),
        reqwest::Client::new(),
    ));
    let mut ctl = Controller::new(provider(&server));

    ctl.initialize(&resolver).await;

    assert!(ctl.state().current.is_some());
    assert!(ctl.state().history.is_empty());
}
