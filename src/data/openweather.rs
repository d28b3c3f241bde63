//! OpenWeatherMap API client
//!
//! This module fetches geocoding matches, current conditions and the
//! 5-day/3-hour forecast from OpenWeatherMap and parses them into the raw
//! observation types of [`crate::data`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Coordinates, CurrentReading, RawSample};
use crate::config::{ForecastConfig, RetryConfig};

/// Base URL for the OpenWeatherMap API
pub const OPEN_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Path of the direct geocoding endpoint
const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// Path of the current-conditions endpoint
const CURRENT_PATH: &str = "/data/2.5/weather";

/// Path of the 5-day/3-hour forecast endpoint
const FORECAST_PATH: &str = "/data/2.5/forecast";

/// Errors that can occur when talking to the weather provider
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The provider answered with a non-success status
    #[error("Weather provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),
}

impl WeatherError {
    /// Whether a fresh attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::RequestFailed(_) => true,
            WeatherError::Api { status, .. } => *status >= 500 || *status == 429,
            WeatherError::ParseError(_) | WeatherError::MissingField(_) => false,
        }
    }
}

/// Source of geocoding matches and raw weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a place name and country code to its best coordinates.
    ///
    /// Returns `Ok(None)` when the provider knows no such place.
    async fn geocode(
        &self,
        location: &str,
        country: &str,
    ) -> Result<Option<Coordinates>, WeatherError>;

    /// Fetch the reading for "right now" at the given coordinates
    async fn current(&self, coords: Coordinates) -> Result<CurrentReading, WeatherError>;

    /// Fetch the chronological 5-day/3-hour forecast at the given coordinates
    async fn forecast(&self, coords: Coordinates) -> Result<Vec<RawSample>, WeatherError>;
}

/// Client for fetching weather data from the OpenWeatherMap API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
    retry: RetryConfig,
}

impl OpenWeatherClient {
    /// Create a new client with default settings for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPEN_WEATHER_BASE_URL.to_string(),
            units: "metric".to_string(),
            lang: "es".to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_units(config.units.clone())
            .with_language(config.lang.clone())
            .with_retry(config.retry.clone())
    }

    /// Point the client at another API host (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the measurement units ("metric", "imperial", "standard")
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Set the language of free-text descriptions
    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the retry policy for transient failures
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Query parameters shared by the current and forecast endpoints
    fn weather_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", self.units.clone()),
            ("lang", self.lang.clone()),
            ("appid", self.api_key.clone()),
        ]
    }

    /// GET a JSON document, retrying transient failures with exponential backoff
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        let text = loop {
            match self.get_once(&url, query).await {
                Ok(text) => break text,
                Err(err) if attempt < self.retry.max_retries && err.is_retryable() => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    attempt += 1;
                    warn!(
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Weather request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        };

        Ok(serde_json::from_str(&text)?)
    }

    /// Perform a single GET and return the body of a successful response
    async fn get_once(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<String, WeatherError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: provider_message(&text),
            });
        }

        debug!(url, status = status.as_u16(), bytes = text.len(), "Weather response received");
        Ok(text)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn geocode(
        &self,
        location: &str,
        country: &str,
    ) -> Result<Option<Coordinates>, WeatherError> {
        let query = [
            ("q", format!("{},{}", location, country)),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        let matches: Vec<GeoMatch> = self.get_json(GEOCODING_PATH, &query).await?;

        Ok(matches.into_iter().next().map(|m| Coordinates {
            lat: m.lat,
            lon: m.lon,
        }))
    }

    async fn current(&self, coords: Coordinates) -> Result<CurrentReading, WeatherError> {
        let reading: CurrentReading = self
            .get_json(CURRENT_PATH, &self.weather_query(coords))
            .await?;

        if reading.sample.weather.is_empty() {
            return Err(WeatherError::MissingField("weather".to_string()));
        }

        Ok(reading)
    }

    async fn forecast(&self, coords: Coordinates) -> Result<Vec<RawSample>, WeatherError> {
        let response: ForecastResponse = self
            .get_json(FORECAST_PATH, &self.weather_query(coords))
            .await?;

        if let Some(sample) = response.list.iter().find(|s| s.weather.is_empty()) {
            return Err(WeatherError::MissingField(format!(
                "weather (forecast sample at {})",
                sample.dt
            )));
        }

        Ok(response.list)
    }
}

/// Extract the provider's own message from an error body, or fall back to the raw text
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}

/// One match from the geocoding endpoint
#[derive(Debug, Deserialize)]
struct GeoMatch {
    lat: f64,
    lon: f64,
}

/// 5-day/3-hour forecast response structure
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<RawSample>,
}

/// Error body returned by OpenWeatherMap on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
