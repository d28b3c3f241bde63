//! Weekly forecast aggregation and recommendation engine
//!
//! Turns a current-conditions reading and a 5-day/3-hour forecast into a
//! day-indexed model: samples are grouped into local calendar days, each day
//! gets a representative condition, a display temperature and an advisory.
//!
//! The whole model is rebuilt on every call; nothing but geocoding matches
//! is cached.

pub mod aggregate;
pub mod bucket;
pub mod conditions;
pub mod recommend;
pub mod select;

pub use aggregate::{aggregate, AggregatedDay};
pub use bucket::{bucketize, DayBucket, DayKey, NormalizedSample};
pub use conditions::{precipitation, priority, translate};
pub use recommend::recommend;
pub use select::select_representative;

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cache::CacheManager;
use crate::config::{parse_timezone, ForecastConfig};
use crate::data::{Coordinates, CurrentReading, RawSample, WeatherError, WeatherProvider};

/// Errors that abort a weekly forecast
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The geocoding provider knows no such place
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    /// A call to the weather provider failed
    #[error("Error fetching weather: {0}")]
    Upstream(#[from] WeatherError),

    /// The provider sent a timestamp outside the representable range
    #[error("Invalid timestamp in weather data: {0}")]
    InvalidTimestamp(i64),

    /// The configured timezone is not a known IANA zone
    #[error("Unknown timezone: '{0}'")]
    InvalidTimezone(String),
}

/// Day-indexed forecast for one place
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyForecast {
    /// Place the forecast was requested for
    pub location: String,
    /// Country code the forecast was requested for
    pub country: String,
    /// IANA zone days and times are expressed in
    pub timezone: String,
    /// The "right now" reading
    pub current_weather: NormalizedSample,
    /// Today and up to four following days, in calendar order
    pub forecast_data: BTreeMap<DayKey, AggregatedDay>,
}

/// Builds the day-indexed model from already fetched data.
///
/// Pure and synchronous; `location` and `country` of the result are left
/// empty for the caller to fill in.
pub fn build_weekly_forecast(
    current: &CurrentReading,
    samples: &[RawSample],
    tz: &Tz,
) -> Result<WeeklyForecast, ForecastError> {
    let (current_weather, days) = bucketize(current, samples, tz)?;

    let forecast_data = days
        .into_iter()
        .map(|(key, bucket)| (key, aggregate(bucket)))
        .collect();

    Ok(WeeklyForecast {
        location: String::new(),
        country: String::new(),
        timezone: tz.name().to_string(),
        current_weather,
        forecast_data,
    })
}

/// Fetches and aggregates weekly forecasts from a weather provider
#[derive(Debug)]
pub struct ForecastService<P> {
    provider: P,
    config: ForecastConfig,
    tz: Tz,
    cache: Option<CacheManager>,
}

impl<P: WeatherProvider> ForecastService<P> {
    /// Create a service; fails if the configured timezone is unknown
    pub fn new(provider: P, config: ForecastConfig) -> Result<Self, ForecastError> {
        let tz = parse_timezone(&config.timezone)
            .map_err(|_| ForecastError::InvalidTimezone(config.timezone.clone()))?;

        Ok(Self {
            provider,
            config,
            tz,
            cache: None,
        })
    }

    /// Keep geocoding matches in the given on-disk cache
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The timezone days are bucketed in
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Fetch and aggregate the weekly forecast for a place.
    ///
    /// Missing or blank arguments fall back to the configured default
    /// location and country. Either a complete forecast or an error is
    /// returned, never a partial one.
    #[instrument(skip(self), fields(timezone = %self.tz))]
    pub async fn get_weekly_forecast(
        &self,
        location: Option<&str>,
        country: Option<&str>,
    ) -> Result<WeeklyForecast, ForecastError> {
        let location = non_blank(location).unwrap_or(self.config.default_location.as_str());
        let country = non_blank(country).unwrap_or(self.config.default_country.as_str());

        let coords = self.resolve(location, country).await?;
        debug!(lat = coords.lat, lon = coords.lon, "Location resolved");

        let (current, samples) = futures::try_join!(
            self.provider.current(coords),
            self.provider.forecast(coords)
        )?;

        let mut forecast = build_weekly_forecast(&current, &samples, &self.tz)?;
        forecast.location = location.to_string();
        forecast.country = country.to_string();

        info!(
            location,
            country,
            samples = samples.len(),
            days = forecast.forecast_data.len(),
            "Weekly forecast built"
        );
        Ok(forecast)
    }

    /// Geocode a place, consulting the on-disk cache first
    async fn resolve(&self, location: &str, country: &str) -> Result<Coordinates, ForecastError> {
        let key = CacheManager::geocode_key(location, country);

        if let Some(coords) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.read_fresh::<Coordinates>(&key))
        {
            debug!(key = %key, "Using cached geocoding match");
            return Ok(coords);
        }

        let coords = self
            .provider
            .geocode(location, country)
            .await?
            .ok_or_else(|| ForecastError::LocationNotFound {
                location: format!("{}, {}", location, country),
            })?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.write(&key, &coords, self.config.geocode_cache_ttl_hours) {
                warn!(key = %key, error = %e, "Failed to cache geocoding match");
            }
        }

        Ok(coords)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
