//! Process-wide configuration for Climaplan
//!
//! Settings are assembled from built-in defaults, an optional TOML file and
//! finally command-line flags or environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::openweather::OPEN_WEATHER_BASE_URL;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured timezone is not a known IANA zone
    #[error("Unknown timezone: '{0}'")]
    InvalidTimezone(String),

    /// The retry policy cannot produce sensible delays
    #[error("Invalid retry settings: {0}")]
    InvalidRetry(String),

    /// No API key was configured
    #[error("Missing API key: set OPENWEATHER_KEY, pass --api-key or add api_key to the config file")]
    MissingApiKey,
}

/// Retry policy for upstream GET calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds (default: 200ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each retry (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound on any single delay in milliseconds (default: 5000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_delay() -> u64 {
    200
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_delay() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0 for the first retry).
    ///
    /// Grows by `multiplier` per attempt and never exceeds `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = (self.initial_delay_ms as f64) * self.multiplier.max(1.0).powi(exponent);
        // NaN compares false, so `min` yields the cap
        let capped = base.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::InvalidRetry(format!(
                "multiplier must be a finite number of at least 1.0, got {}",
                self.multiplier
            )));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidRetry(format!(
                "initial_delay_ms ({}) exceeds max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

/// Configuration for the weekly forecast operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Credential for the upstream weather provider
    #[serde(default)]
    pub api_key: String,

    /// IANA zone used for all day bucketing and formatting
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Place used when the caller does not name one
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Country code used when the caller does not name one
    #[serde(default = "default_country")]
    pub default_country: String,

    /// Provider API host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Measurement units requested from the provider
    #[serde(default = "default_units")]
    pub units: String,

    /// Language of provider descriptions
    #[serde(default = "default_lang")]
    pub lang: String,

    /// How long geocoding matches stay fresh on disk, in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_cache_ttl_hours: u64,

    /// Retry policy for upstream calls
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_timezone() -> String {
    "America/Santiago".to_string()
}

fn default_location() -> String {
    "Concepcion".to_string()
}

fn default_country() -> String {
    "CL".to_string()
}

fn default_base_url() -> String {
    OPEN_WEATHER_BASE_URL.to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_lang() -> String {
    "es".to_string()
}

const fn default_geocode_ttl() -> u64 {
    24
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timezone: default_timezone(),
            default_location: default_location(),
            default_country: default_country(),
            base_url: default_base_url(),
            units: default_units(),
            lang: default_lang(),
            geocode_cache_ttl_hours: default_geocode_ttl(),
            retry: RetryConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse configuration from TOML text; absent keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the configured timezone
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.timezone)
    }

    /// Check that the configuration can drive a forecast request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        self.tz()?;
        self.retry.validate()
    }
}

/// Parse an IANA timezone name such as "America/Santiago"
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}
