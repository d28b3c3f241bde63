//! Condition labels, severity ranking and precipitation normalization.

use crate::data::PrecipitationWindow;

/// Label of a thunderstorm
pub const STORM: &str = "Tormenta";
/// Label of snowfall
pub const SNOW: &str = "Nieve";
/// Label of rain
pub const RAIN: &str = "Lluvia";
/// Label of drizzle
pub const DRIZZLE: &str = "Llovizna";

/// Priority of any condition that is not severe weather.
///
/// Also serves as the "nothing severe found" sentinel when picking a
/// representative sample.
pub const DEFAULT_PRIORITY: u8 = 98;

/// Upstream main-condition names and their display labels
const TRANSLATIONS: &[(&str, &str)] = &[
    ("Clear", "Despejado"),
    ("Clouds", "Nublado"),
    ("Rain", RAIN),
    ("Thunderstorm", STORM),
    ("Snow", SNOW),
    ("Drizzle", DRIZZLE),
    ("Mist", "Neblina"),
    ("Fog", "Niebla"),
    ("Haze", "Bruma"),
];

/// Severity of labelled conditions; lower is more severe
const PRIORITIES: &[(&str, u8)] = &[(STORM, 1), (SNOW, 2), (RAIN, 3), (DRIZZLE, 4)];

/// Translates an upstream main-condition name into its display label.
///
/// Unknown names are returned unchanged.
pub fn translate(condition: &str) -> String {
    TRANSLATIONS
        .iter()
        .find(|(upstream, _)| *upstream == condition)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| condition.to_string())
}

/// Severity rank of a translated condition label.
///
/// Returns [`DEFAULT_PRIORITY`] for anything that is not severe weather.
pub fn priority(label: &str) -> u8 {
    PRIORITIES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, rank)| *rank)
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Collapses a precipitation window into a single amount in mm.
///
/// Prefers the 1-hour amount, then the 3-hour amount, else zero.
pub fn precipitation(window: Option<&PrecipitationWindow>) -> f64 {
    window
        .and_then(|w| w.one_hour.or(w.three_hours))
        .unwrap_or(0.0)
}
