//! Climaplan - Weekly weather calendar for the terminal
//!
//! Fetches current conditions and the 5-day forecast for a place and prints
//! one line per local calendar day with a clothing or activity advisory.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use climaplan::cache::CacheManager;
use climaplan::cli::{render_text, Cli, OutputFormat, StartupConfig};
use climaplan::data::OpenWeatherClient;
use climaplan::forecast::ForecastService;

/// Installs the stderr log subscriber, honoring `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let startup = StartupConfig::from_cli(&cli)?;
    let client = OpenWeatherClient::from_config(&startup.forecast);
    let mut service = ForecastService::new(client, startup.forecast)?;

    if startup.use_cache {
        match CacheManager::new() {
            Some(cache) => service = service.with_cache(cache),
            None => warn!("No cache directory available, geocoding will not be cached"),
        }
    }
    debug!(timezone = %service.timezone(), "Service ready");

    let forecast = service
        .get_weekly_forecast(cli.city.as_deref(), cli.country.as_deref())
        .await?;

    match startup.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forecast)?),
        OutputFormat::Text => print!("{}", render_text(&forecast)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
