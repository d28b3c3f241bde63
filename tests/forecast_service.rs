//! Integration tests for the weekly forecast using wiremock
//!
//! These tests run the full fetch-and-aggregate path against a mock
//! OpenWeatherMap server.

use chrono::{TimeZone, Utc};
use climaplan::config::{ForecastConfig, RetryConfig};
use climaplan::data::{OpenWeatherClient, WeatherError};
use climaplan::forecast::{DayKey, ForecastError, ForecastService};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn ts(day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0)
        .single()
        .expect("Valid test time")
        .timestamp()
}

fn sample(dt: i64, main: &str, icon: &str, temp: f64) -> Value {
    json!({
        "dt": dt,
        "main": {
            "temp": temp,
            "feels_like": temp - 2.0,
            "temp_min": temp - 1.0,
            "temp_max": temp + 1.0,
            "pressure": 1015,
            "humidity": 80
        },
        "weather": [{ "id": 800, "main": main, "description": "descripción", "icon": icon }],
        "wind": { "speed": 3.1, "deg": 200 },
        "pop": 0.2
    })
}

fn current_response() -> Value {
    let mut current = sample(ts(1, 14), "Clear", "01d", 16.0);
    current["name"] = json!("Concepción");
    current["rain"] = json!({ "1h": 0.4 });
    current
}

/// 40 three-hourly samples from 01/06 15:00 UTC, reaching into a sixth day
fn forecast_response() -> Value {
    let start = ts(1, 15);
    let list: Vec<Value> = (0..40)
        .map(|i| {
            let dt = start + i * 3 * 3600;
            if dt == ts(3, 12) {
                sample(dt, "Rain", "10d", 12.0)
            } else if dt == ts(4, 3) {
                sample(dt, "Thunderstorm", "11n", 12.0)
            } else {
                sample(dt, "Clouds", "04d", 12.0)
            }
        })
        .collect();

    json!({ "cod": "200", "cnt": list.len(), "list": list })
}

async fn mount_geocoding(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Concepcion,CL"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response()))
        .mount(server)
        .await;
}

fn concepcion() -> Value {
    json!([{ "name": "Concepción", "lat": -36.827, "lon": -73.0503, "country": "CL" }])
}

fn no_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        initial_delay_ms: 1,
        multiplier: 2.0,
        max_delay_ms: 10,
    }
}

fn service_for(server: &MockServer, retry: RetryConfig) -> ForecastService<OpenWeatherClient> {
    let config = ForecastConfig {
        api_key: "test-key".to_string(),
        timezone: "UTC".to_string(),
        base_url: server.uri(),
        retry,
        ..Default::default()
    };
    let client = OpenWeatherClient::from_config(&config);
    ForecastService::new(client, config).expect("Service should build")
}

#[tokio::test]
async fn test_weekly_forecast_end_to_end() {
    let server = MockServer::start().await;
    mount_geocoding(&server, concepcion()).await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .mount(&server)
        .await;

    let service = service_for(&server, no_retry());
    let forecast = service
        .get_weekly_forecast(None, None)
        .await
        .expect("Forecast should succeed");

    assert_eq!(forecast.location, "Concepcion");
    assert_eq!(forecast.country, "CL");
    assert_eq!(forecast.timezone, "UTC");

    let keys: Vec<String> = forecast.forecast_data.keys().map(|k| k.to_string()).collect();
    assert_eq!(
        keys,
        ["01/06/2025", "02/06/2025", "03/06/2025", "04/06/2025", "05/06/2025"]
    );

    let now = &forecast.current_weather;
    assert!(now.is_current);
    assert_eq!(now.condition, "Despejado");
    assert_eq!(now.precipitation, 0.4);
    assert_eq!(now.hour, "14:00");

    let today = forecast.forecast_data.values().next().expect("Today");
    assert!(today.samples.first().expect("Current sample").is_current);
    assert_eq!(today.day_txt, "DOM");

    let rainy = forecast
        .forecast_data
        .get(&"03/06/2025".parse::<DayKey>().expect("Key"))
        .expect("Third day");
    assert_eq!(rainy.condition, "Lluvia");
    assert_eq!(rainy.icon, "10d");
    assert_eq!(rainy.samples.len(), 8);

    // The storm falls at 03:00, outside the daytime window
    let stormy_night = forecast
        .forecast_data
        .get(&"04/06/2025".parse::<DayKey>().expect("Key"))
        .expect("Fourth day");
    assert_eq!(stormy_night.condition, "Nublado");

    for day in forecast.forecast_data.values() {
        let temp = f64::from(day.temp.expect("Day has data"));
        assert!(day.temp_min.expect("min") <= temp && temp <= day.temp_max.expect("max"));
        assert!(day.samples.windows(2).all(|w| w[0].dt < w[1].dt));
    }
}

#[tokio::test]
async fn test_unknown_location_is_reported() {
    let server = MockServer::start().await;
    mount_geocoding(&server, json!([])).await;

    let service = service_for(&server, no_retry());
    let err = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect_err("Forecast should fail");

    assert!(matches!(err, ForecastError::LocationNotFound { .. }));
    assert_eq!(err.to_string(), "Location not found: Concepcion, CL");
}

#[tokio::test]
async fn test_provider_message_is_surfaced() {
    let server = MockServer::start().await;
    mount_geocoding(&server, concepcion()).await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server, no_retry());
    let err = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect_err("Forecast should fail");

    match &err {
        ForecastError::Upstream(WeatherError::Api { status, message }) => {
            assert_eq!(*status, 401);
            assert!(message.starts_with("Invalid API key"));
        }
        other => panic!("Expected upstream API error, got {:?}", other),
    }
    assert!(err.to_string().contains("Invalid API key"));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    mount_geocoding(&server, concepcion()).await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .with_priority(2)
        .mount(&server)
        .await;

    let retry = RetryConfig {
        max_retries: 2,
        initial_delay_ms: 1,
        multiplier: 2.0,
        max_delay_ms: 10,
    };
    let service = service_for(&server, retry);
    let forecast = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect("Forecast should succeed after a retry");

    assert_eq!(forecast.forecast_data.len(), 5);
}

#[tokio::test]
async fn test_server_error_fails_whole_forecast_when_retries_exhausted() {
    let server = MockServer::start().await;
    mount_geocoding(&server, concepcion()).await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(2)
        .mount(&server)
        .await;

    let retry = RetryConfig {
        max_retries: 1,
        initial_delay_ms: 1,
        multiplier: 2.0,
        max_delay_ms: 10,
    };
    let service = service_for(&server, retry);
    let err = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect_err("Forecast should fail");

    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_huge_backoff_multiplier_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let retry = RetryConfig {
        max_retries: 3,
        initial_delay_ms: 1,
        multiplier: 1e300,
        max_delay_ms: 5,
    };
    let service = service_for(&server, retry);
    let err = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect_err("Forecast should fail");

    match err {
        ForecastError::Upstream(WeatherError::Api { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected upstream API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forecast_sample_without_condition_is_rejected() {
    let server = MockServer::start().await;
    mount_geocoding(&server, concepcion()).await;
    mount_weather(&server).await;

    let mut body = forecast_response();
    body["list"][5]["weather"] = json!([]);
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let service = service_for(&server, no_retry());
    let err = service
        .get_weekly_forecast(Some("Concepcion"), Some("CL"))
        .await
        .expect_err("Forecast should fail");

    assert!(matches!(
        err,
        ForecastError::Upstream(WeatherError::MissingField(_))
    ));
    assert!(err.to_string().contains("weather"));
}
