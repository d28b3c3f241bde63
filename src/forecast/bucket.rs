//! Normalization of raw observations and grouping into local calendar days.
//!
//! Every timestamp is converted to the configured timezone before its day is
//! derived, so a sample at 02:00 UTC may well belong to the previous local day.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::conditions::{precipitation, translate};
use super::recommend::recommend;
use super::ForecastError;
use crate::data::{CurrentReading, RawSample};

/// Maximum number of calendar days in one forecast (today + 4)
pub const MAX_DAYS: usize = 5;

/// Display format of a day key
const DAY_KEY_FORMAT: &str = "%d/%m/%Y";

/// A calendar day in the target timezone, displayed as `DD/MM/YYYY`.
///
/// Keys order chronologically, not lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Wrap a local calendar date
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The local calendar date of this key
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DAY_KEY_FORMAT).map(Self)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Display-ready form of a raw observation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSample {
    /// Observation time as epoch seconds (UTC)
    pub dt: i64,
    /// Local calendar day the observation belongs to
    pub day_key: DayKey,
    /// Local time of day, `HH:MM`
    pub hour: String,
    /// Local time of day, `HH:MM:SS`
    pub local_time: String,
    /// Local date and time, `DD/MM/YYYY HH:MM:SS`
    pub local_timestamp: String,
    /// Temperature, rounded to whole degrees
    pub temp: f64,
    /// Feels-like temperature, rounded to whole degrees
    pub feels_like: f64,
    /// Minimum temperature, rounded to whole degrees
    pub temp_min: f64,
    /// Maximum temperature, rounded to whole degrees
    pub temp_max: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Wind speed
    pub wind: f64,
    /// Translated condition label
    pub condition: String,
    /// Free-text description from the provider
    pub description: String,
    /// Provider icon identifier
    pub icon: String,
    /// Precipitation amount in mm
    pub precipitation: f64,
    /// Probability of precipitation (0.0-1.0)
    pub pop: f64,
    /// Advisory for this observation
    pub recommendation: String,
    /// Whether this is the "right now" reading
    pub is_current: bool,
}

impl NormalizedSample {
    /// Normalize one raw observation, formatting its times in `tz`.
    pub fn from_raw(sample: &RawSample, tz: &Tz, is_current: bool) -> Result<Self, ForecastError> {
        let local = DateTime::from_timestamp(sample.dt, 0)
            .ok_or(ForecastError::InvalidTimestamp(sample.dt))?
            .with_timezone(tz);

        let (condition, description, icon) = match sample.condition() {
            Some(info) => (translate(&info.main), info.description.clone(), info.icon.clone()),
            None => (String::new(), String::new(), String::new()),
        };
        let temp = sample.main.temp.round();

        Ok(Self {
            dt: sample.dt,
            day_key: DayKey::new(local.date_naive()),
            hour: local.format("%H:%M").to_string(),
            local_time: local.format("%H:%M:%S").to_string(),
            local_timestamp: local.format("%d/%m/%Y %H:%M:%S").to_string(),
            temp,
            feels_like: sample.main.feels_like.round(),
            temp_min: sample.main.temp_min.round(),
            temp_max: sample.main.temp_max.round(),
            pressure: sample.main.pressure,
            humidity: sample.main.humidity,
            wind: sample.wind.speed,
            recommendation: recommend(&condition, Some(temp)).to_string(),
            condition,
            description,
            icon,
            precipitation: precipitation(sample.rain.as_ref()),
            pop: sample.pop.unwrap_or(0.0),
            is_current,
        })
    }
}

/// The samples and running temperature range of one local calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    /// The day this bucket collects
    pub key: DayKey,
    samples: Vec<NormalizedSample>,
    temp_min: f64,
    temp_max: f64,
}

impl DayBucket {
    /// An empty bucket; its range starts at +inf/-inf
    pub fn new(key: DayKey) -> Self {
        Self {
            key,
            samples: Vec::new(),
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
        }
    }

    /// Add a sample, keeping samples ascending by timestamp
    pub fn push(&mut self, sample: NormalizedSample) {
        self.temp_min = self.temp_min.min(sample.temp_min);
        self.temp_max = self.temp_max.max(sample.temp_max);
        let idx = self.samples.partition_point(|s| s.dt <= sample.dt);
        self.samples.insert(idx, sample);
    }

    /// Samples of this day, ascending by timestamp
    pub fn samples(&self) -> &[NormalizedSample] {
        &self.samples
    }

    /// Lowest and highest temperature seen, or `None` for an empty bucket
    pub fn temp_range(&self) -> Option<(f64, f64)> {
        if self.samples.is_empty() {
            None
        } else {
            Some((self.temp_min, self.temp_max))
        }
    }

    /// Consume the bucket, yielding its samples
    pub fn into_samples(self) -> Vec<NormalizedSample> {
        self.samples
    }
}

/// Groups the current reading and the raw forecast into local calendar days.
///
/// Today's bucket is seeded with the current reading before any forecast
/// sample is looked at. Ingestion stops at the first sample that would open
/// a sixth day. Returns the normalized current reading with the buckets.
pub fn bucketize(
    current: &CurrentReading,
    raw_samples: &[RawSample],
    tz: &Tz,
) -> Result<(NormalizedSample, BTreeMap<DayKey, DayBucket>), ForecastError> {
    let current = NormalizedSample::from_raw(&current.sample, tz, true)?;

    let mut days = BTreeMap::new();
    let mut today = DayBucket::new(current.day_key);
    today.push(current.clone());
    days.insert(current.day_key, today);

    for (ingested, raw) in raw_samples.iter().enumerate() {
        let sample = NormalizedSample::from_raw(raw, tz, false)?;

        if !days.contains_key(&sample.day_key) && days.len() >= MAX_DAYS {
            debug!(
                day = %sample.day_key,
                discarded = raw_samples.len() - ingested,
                "Day window full, discarding remaining samples"
            );
            break;
        }

        days.entry(sample.day_key)
            .or_insert_with(|| DayBucket::new(sample.day_key))
            .push(sample);
    }

    Ok((current, days))
}
