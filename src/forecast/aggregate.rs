//! Per-day summary of a bucket: range, representative condition, dates and advisory.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::bucket::{DayBucket, DayKey, NormalizedSample};
use super::recommend::recommend;
use super::select::select_representative;
use crate::data::{icon_url, DEFAULT_ICON};

/// Condition shown for a day without any sample
pub const NO_DATA: &str = "Datos no disponibles";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Summary of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDay {
    /// The day this summary describes
    pub day_key: DayKey,
    /// Short uppercase weekday ("LUN")
    pub day_txt: String,
    /// Short date ("2 de junio")
    pub date_short: String,
    /// Long date ("Lunes, 2 de junio")
    pub date_long: String,
    /// Condition label of the representative sample
    pub condition: String,
    /// Icon of the representative sample
    pub icon: String,
    /// Daytime icon image URL
    pub icon_url: String,
    /// Rounded midpoint of the day's range, `None` without data
    pub temp: Option<i32>,
    /// Lowest temperature of the day
    pub temp_min: Option<f64>,
    /// Highest temperature of the day
    pub temp_max: Option<f64>,
    /// Advisory for the day
    pub recommendation: String,
    /// Samples of the day, ascending by timestamp
    pub samples: Vec<NormalizedSample>,
}

/// Summarize one day bucket.
///
/// A bucket without samples yields a placeholder day instead of an error.
pub fn aggregate(bucket: DayBucket) -> AggregatedDay {
    let date = bucket.key.date();
    let range = bucket.temp_range();
    let temp = range.map(|(min, max)| ((min + max) / 2.0).round() as i32);

    let (condition, icon) = match select_representative(bucket.samples()) {
        Some(chosen) => (chosen.condition.clone(), chosen.icon.clone()),
        None => (NO_DATA.to_string(), DEFAULT_ICON.to_string()),
    };

    AggregatedDay {
        day_key: bucket.key,
        day_txt: weekday_short(date.weekday()).to_uppercase(),
        date_short: capitalize(&short_date(date)),
        date_long: capitalize(&format!("{}, {}", weekday_long(date.weekday()), short_date(date))),
        recommendation: recommend(&condition, temp.map(f64::from)).to_string(),
        condition,
        icon_url: icon_url(&icon),
        icon,
        temp,
        temp_min: range.map(|(min, _)| min),
        temp_max: range.map(|(_, max)| max),
        samples: bucket.into_samples(),
    }
}

fn short_date(date: NaiveDate) -> String {
    format!("{} de {}", date.day(), MONTHS[date.month0() as usize])
}

fn weekday_long(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lun",
        Weekday::Tue => "mar",
        Weekday::Wed => "mié",
        Weekday::Thu => "jue",
        Weekday::Fri => "vie",
        Weekday::Sat => "sáb",
        Weekday::Sun => "dom",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
