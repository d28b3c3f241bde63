//! Command-line interface parsing for Climaplan
//!
//! This module handles parsing of CLI arguments using clap, merges them over
//! the config file, and renders a weekly forecast as text.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::{ConfigError, ForecastConfig};
use crate::forecast::WeeklyForecast;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration assembled from file and flags is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Climaplan - Weekly weather calendar with activity recommendations
#[derive(Parser, Debug)]
#[command(name = "climaplan")]
#[command(about = "Weekly weather calendar with activity recommendations")]
#[command(version)]
pub struct Cli {
    /// Place to forecast (defaults to the configured location)
    #[arg(long)]
    pub city: Option<String>,

    /// Country code of the place, e.g. CL (defaults to the configured country)
    #[arg(long)]
    pub country: Option<String>,

    /// IANA timezone used to group days, e.g. America/Santiago
    #[arg(long, env = "CLIMAPLAN_TIMEZONE")]
    pub timezone: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print the full forecast as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not read or write the geocoding cache
    #[arg(long)]
    pub no_cache: bool,
}

/// How the forecast is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable calendar
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Settings for the forecast operation
    pub forecast: ForecastConfig,
    /// Output format
    pub output: OutputFormat,
    /// Whether the geocoding cache is used
    pub use_cache: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Flags override the config file, which overrides built-in defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut forecast = match &cli.config {
            Some(path) => ForecastConfig::from_file(path)?,
            None => ForecastConfig::default(),
        };

        // A set-but-empty environment variable must not erase the file's value
        if let Some(api_key) = non_blank(cli.api_key.as_deref()) {
            forecast.api_key = api_key.to_string();
        }
        if let Some(timezone) = non_blank(cli.timezone.as_deref()) {
            forecast.timezone = timezone.to_string();
        }
        forecast.validate()?;

        Ok(StartupConfig {
            forecast,
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            use_cache: !cli.no_cache,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Renders the forecast as a plain-text weekly calendar
pub fn render_text(forecast: &WeeklyForecast) -> String {
    let mut out = String::new();
    let now = &forecast.current_weather;

    let _ = writeln!(out, "{}, {} ({})", forecast.location, forecast.country, forecast.timezone);
    let _ = writeln!(
        out,
        "Ahora {}: {} {}°C (sensación {}°C), humedad {}%, viento {} m/s",
        now.hour, now.condition, now.temp, now.feels_like, now.humidity, now.wind
    );
    let _ = writeln!(out, "  {}", now.recommendation);
    out.push('\n');

    for day in forecast.forecast_data.values() {
        let temp = day.temp.map_or_else(|| "--".to_string(), |t| t.to_string());
        let range = match (day.temp_min, day.temp_max) {
            (Some(min), Some(max)) => format!("{}° / {}°", min, max),
            _ => "--".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<4} {:<12} {:<20} {:>3}°C  ({})  {}",
            day.day_txt, day.date_short, day.condition, temp, range, day.recommendation
        );
    }

    out
}
