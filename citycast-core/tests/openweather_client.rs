//! Tests for OpenWeatherClient against a wiremock server.

use citycast_core::{
    CityQuery, ClientConfig, LookupController, LookupError, LookupPhase, MemoryStore,
    OpenWeatherClient, WeatherSource,
};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START: i64 = 1_709_510_400; // 2024-03-04T00:00:00Z, a Monday

fn current_body(name: &str) -> Value {
    json!({
        "name": name,
        "dt": START + 12 * 3600,
        "main": { "temp": 18.4, "feels_like": 17.2, "humidity": 63, "pressure": 1012 },
        "weather": [{ "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" }],
        "wind": { "speed": 5.1, "deg": 240 }
    })
}

fn forecast_body(samples: usize) -> Value {
    let list: Vec<Value> = (0..samples)
        .map(|i| {
            json!({
                "dt": START + 3 * 3600 * i as i64,
                "main": { "temp": i as f64, "feels_like": i as f64, "humidity": 70 },
                "weather": [{ "description": "light rain", "icon": "10d" }],
                "wind": { "speed": 2.0 },
                "dt_txt": "ignored"
            })
        })
        .collect();

    json!({
        "cod": "200",
        "cnt": samples,
        "list": list,
        "city": { "name": "Paris", "country": "FR" }
    })
}

async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{endpoint}")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new(ClientConfig {
        base_url: server.uri(),
        api_key: "TEST_KEY".to_string(),
    })
}

fn paris() -> CityQuery {
    CityQuery::parse("Paris").unwrap()
}

#[tokio::test]
async fn lookup_returns_both_payloads() {
    let server = MockServer::start().await;

    for endpoint in ["weather", "forecast"] {
        let body = if endpoint == "weather" {
            current_body("Paris")
        } else {
            forecast_body(40)
        };
        Mock::given(method("GET"))
            .and(path(format!("/{endpoint}")))
            .and(query_param("q", "Paris"))
            .and(query_param("appid", "TEST_KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let lookup = client(&server).lookup(&paris()).await.unwrap();

    assert_eq!(lookup.current.name, "Paris");
    assert_eq!(lookup.current.rounded_temperature(), 18);
    assert_eq!(lookup.current.humidity_pct, 63);
    assert_eq!(lookup.current.description, "scattered clouds");
    assert_eq!(lookup.current.icon, "03d");
    assert_eq!(lookup.current.observed_at.timestamp(), START + 12 * 3600);

    assert_eq!(lookup.forecast.len(), 40);
    assert_eq!(lookup.forecast[0].weekday(), "Mon");
    assert_eq!(lookup.forecast[8].weekday(), "Tue");
    assert_eq!(lookup.forecast[39].temperature_c, 39.0);
}

#[tokio::test]
async fn both_requests_are_in_flight_together() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(500);
    mount(
        &server,
        "weather",
        ResponseTemplate::new(200).set_body_json(current_body("Paris")).set_delay(delay),
    )
    .await;
    mount(
        &server,
        "forecast",
        ResponseTemplate::new(200).set_body_json(forecast_body(8)).set_delay(delay),
    )
    .await;

    let started = Instant::now();
    client(&server).lookup(&paris()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= delay, "finished before either response: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "requests ran one after the other: {elapsed:?}");
}

#[tokio::test]
async fn current_not_found_fails_whole_lookup() {
    let server = MockServer::start().await;
    mount(
        &server,
        "weather",
        ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })),
    )
    .await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast_body(40))).await;

    let err = client(&server).lookup(&paris()).await.unwrap_err();

    let LookupError::LookupFailed { source } = err;
    assert!(source.to_string().contains("404"), "unexpected cause: {source}");
}

#[tokio::test]
async fn forecast_server_error_fails_whole_lookup() {
    let server = MockServer::start().await;
    mount(&server, "weather", ResponseTemplate::new(200).set_body_json(current_body("Paris"))).await;
    mount(&server, "forecast", ResponseTemplate::new(500).set_body_string("upstream down")).await;

    let result = client(&server).lookup(&paris()).await;

    assert!(matches!(result, Err(LookupError::LookupFailed { .. })));
}

#[tokio::test]
async fn malformed_json_fails_lookup() {
    let server = MockServer::start().await;
    mount(&server, "weather", ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast_body(8))).await;

    assert!(client(&server).lookup(&paris()).await.is_err());
}

#[tokio::test]
async fn missing_required_field_fails_lookup() {
    let server = MockServer::start().await;
    let mut current = current_body("Paris");
    current.as_object_mut().unwrap().remove("main");
    mount(&server, "weather", ResponseTemplate::new(200).set_body_json(current)).await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast_body(8))).await;

    assert!(client(&server).lookup(&paris()).await.is_err());
}

#[tokio::test]
async fn empty_weather_array_in_forecast_fails_lookup() {
    let server = MockServer::start().await;
    let mut forecast = forecast_body(8);
    forecast["list"][3]["weather"] = json!([]);
    mount(&server, "weather", ResponseTemplate::new(200).set_body_json(current_body("Paris"))).await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast)).await;

    assert!(client(&server).lookup(&paris()).await.is_err());
}

#[tokio::test]
async fn unreachable_server_fails_lookup() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = OpenWeatherClient::new(ClientConfig {
        base_url: uri,
        api_key: "TEST_KEY".to_string(),
    });

    assert!(client.lookup(&paris()).await.is_err());
}

#[tokio::test]
async fn controller_reaches_ready_with_daily_samples() {
    let server = MockServer::start().await;
    mount(&server, "weather", ResponseTemplate::new(200).set_body_json(current_body("Paris"))).await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast_body(40))).await;

    let mut controller =
        LookupController::new(client(&server), MemoryStore::new(), CityQuery::parse("Delhi").unwrap());
    let ticket = controller.search("Paris").unwrap();
    controller.run(ticket).await;

    let state = controller.state();
    assert_eq!(state.phase(), LookupPhase::Ready);
    assert_eq!(state.current.as_ref().unwrap().name, "Paris");
    let temps: Vec<f64> = state.daily_forecast.iter().map(|s| s.temperature_c).collect();
    assert_eq!(temps, [0.0, 8.0, 16.0, 24.0, 32.0]);
}

#[tokio::test]
async fn controller_reaches_failed_on_partial_failure() {
    let server = MockServer::start().await;
    mount(&server, "weather", ResponseTemplate::new(401).set_body_string("invalid api key")).await;
    mount(&server, "forecast", ResponseTemplate::new(200).set_body_json(forecast_body(40))).await;

    let mut controller =
        LookupController::new(client(&server), MemoryStore::new(), CityQuery::parse("Delhi").unwrap());
    let ticket = controller.start();
    controller.run(ticket).await;

    let state = controller.state();
    assert_eq!(state.phase(), LookupPhase::Failed);
    assert!(state.current.is_none());
    assert!(state.daily_forecast.is_empty());
    assert!(!state.error.as_deref().unwrap_or_default().is_empty());
}
