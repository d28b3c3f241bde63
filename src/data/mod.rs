//! Upstream weather data models for Climaplan
//!
//! This module contains the raw observation types delivered by the weather
//! provider, exactly as they arrive on the wire, plus the provider client.

pub mod openweather;

pub use openweather::{OpenWeatherClient, WeatherError, WeatherProvider};

use serde::{Deserialize, Serialize};

/// Base URL for OpenWeatherMap condition icons
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Icon shown when the provider did not send one
pub const DEFAULT_ICON: &str = "01d";

/// A geographic position resolved by the geocoding provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude coordinate
    pub lat: f64,
    /// Longitude coordinate
    pub lon: f64,
}

/// Temperature and atmosphere readings of one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    /// Temperature in Celsius
    pub temp: f64,
    /// Feels-like temperature in Celsius
    #[serde(default)]
    pub feels_like: f64,
    /// Minimum temperature in Celsius
    pub temp_min: f64,
    /// Maximum temperature in Celsius
    pub temp_max: f64,
    /// Atmospheric pressure in hPa
    #[serde(default)]
    pub pressure: f64,
    /// Relative humidity percentage (0-100)
    #[serde(default)]
    pub humidity: u8,
}

/// Condition descriptor attached to an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInfo {
    /// Main condition group ("Clear", "Rain", ...)
    pub main: String,
    /// Free-text description in the requested language
    #[serde(default)]
    pub description: String,
    /// Icon identifier ("01d", "10n", ...)
    #[serde(default)]
    pub icon: String,
}

/// Wind readings of one observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed in m/s
    #[serde(default)]
    pub speed: f64,
}

/// Precipitation amount keyed by accumulation window
///
/// The current-conditions endpoint usually reports a 1-hour window while the
/// 3-hourly forecast reports a 3-hour window; either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationWindow {
    /// Amount accumulated over the last hour, in mm
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,
    /// Amount accumulated over the last three hours, in mm
    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hours: Option<f64>,
}

/// One upstream hourly/3-hourly observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Observation time as epoch seconds (UTC)
    pub dt: i64,
    /// Temperature and atmosphere readings
    pub main: MainReadings,
    /// Condition descriptors; the first one is authoritative
    pub weather: Vec<ConditionInfo>,
    /// Wind readings
    #[serde(default)]
    pub wind: Wind,
    /// Optional precipitation amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<PrecipitationWindow>,
    /// Optional probability of precipitation (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
}

impl RawSample {
    /// Returns the authoritative condition descriptor, if any
    pub fn condition(&self) -> Option<&ConditionInfo> {
        self.weather.first()
    }
}

/// The "right now" reading from the current-conditions endpoint
///
/// Same shape as a [`RawSample`], but always attributed to today's bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReading {
    #[serde(flatten)]
    pub sample: RawSample,
}

impl From<RawSample> for CurrentReading {
    fn from(sample: RawSample) -> Self {
        Self { sample }
    }
}

/// Returns the URL of the daytime variant of a condition icon.
///
/// Night icons ("10n") are swapped for their day counterpart ("10d") so the
/// calendar renders consistently; an empty identifier falls back to "01d".
pub fn icon_url(icon: &str) -> String {
    let icon = if icon.is_empty() { DEFAULT_ICON } else { icon };
    let daytime = match icon.strip_suffix('n') {
        Some(stem) => format!("{}d", stem),
        None => icon.to_string(),
    };
    format!("{}/{}@4x.png", ICON_BASE_URL, daytime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST_ITEM: &str = r#"{
        "dt": 1748790000,
        "main": {
            "temp": 14.2,
            "feels_like": 13.5,
            "temp_min": 12.8,
            "temp_max": 14.9,
            "pressure": 1018,
            "sea_level": 1018,
            "grnd_level": 1010,
            "humidity": 81,
            "temp_kf": 1.4
        },
        "weather": [{"id": 500, "main": "Rain", "description": "lluvia ligera", "icon": "10n"}],
        "clouds": {"all": 90},
        "wind": {"speed": 4.1, "deg": 350, "gust": 7.2},
        "visibility": 10000,
        "pop": 0.64,
        "rain": {"3h": 0.82},
        "sys": {"pod": "n"},
        "dt_txt": "2025-06-01 15:00:00"
    }"#;

    #[test]
    fn test_parse_forecast_item() {
        let sample: RawSample = serde_json::from_str(FORECAST_ITEM).expect("Failed to parse item");

        assert_eq!(sample.dt, 1748790000);
        assert!((sample.main.temp - 14.2).abs() < 0.01);
        assert!((sample.main.pressure - 1018.0).abs() < 0.01);
        assert_eq!(sample.main.humidity, 81);
        assert_eq!(sample.condition().map(|c| c.main.as_str()), Some("Rain"));
        assert_eq!(sample.rain.as_ref().and_then(|r| r.three_hours), Some(0.82));
        assert_eq!(sample.rain.as_ref().and_then(|r| r.one_hour), None);
        assert_eq!(sample.pop, Some(0.64));
    }

    #[test]
    fn test_parse_item_without_optional_fields() {
        let minimal = r#"{
            "dt": 1748790000,
            "main": {"temp": 10.0, "temp_min": 9.0, "temp_max": 11.0},
            "weather": [{"main": "Clouds"}]
        }"#;

        let sample: RawSample = serde_json::from_str(minimal).expect("Failed to parse item");

        assert!(sample.rain.is_none());
        assert!(sample.pop.is_none());
        assert_eq!(sample.main.humidity, 0);
        assert_eq!(sample.wind, Wind::default());
    }

    #[test]
    fn test_parse_current_reading_flattened() {
        let current = r#"{
            "coord": {"lon": -73.05, "lat": -36.83},
            "weather": [{"id": 800, "main": "Clear", "description": "cielo claro", "icon": "01d"}],
            "main": {"temp": 22.3, "feels_like": 21.9, "temp_min": 20.1, "temp_max": 23.4, "pressure": 1015, "humidity": 40},
            "wind": {"speed": 3.6},
            "rain": {"1h": 0.3},
            "dt": 1748786400,
            "name": "Concepción"
        }"#;

        let reading: CurrentReading = serde_json::from_str(current).expect("Failed to parse reading");

        assert_eq!(reading.sample.dt, 1748786400);
        assert_eq!(reading.sample.rain.as_ref().and_then(|r| r.one_hour), Some(0.3));
        assert_eq!(reading.sample.condition().map(|c| c.icon.as_str()), Some("01d"));
    }

    #[test]
    fn test_parse_missing_main_fails() {
        let broken = r#"{"dt": 1748790000, "weather": []}"#;
        let result: Result<RawSample, _> = serde_json::from_str(broken);
        assert!(result.is_err());
    }

    #[test]
    fn test_icon_url_uses_daytime_variant() {
        assert_eq!(icon_url("10n"), "https://openweathermap.org/img/wn/10d@4x.png");
        assert_eq!(icon_url("04d"), "https://openweathermap.org/img/wn/04d@4x.png");
    }

    #[test]
    fn test_icon_url_defaults_when_empty() {
        assert_eq!(icon_url(""), "https://openweathermap.org/img/wn/01d@4x.png");
    }
}
