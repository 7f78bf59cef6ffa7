//! Arguments and helpers shared across CLI commands.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use plumemap::config::ConfigFile;
use plumemap::coordinator::{AppliedWeather, FetchOutcome, WeatherFetchCoordinator};
use plumemap::geo::{self, Location};
use plumemap::provider::{AsyncReqwestClient, ProviderFactory, ProviderKind};
use plumemap::scene::GeometryConfig;
use plumemap::stability::StabilityClass;
use plumemap::weather::WeatherSnapshot;

use crate::error::CliError;

/// Release point.
#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

impl LocationArgs {
    pub fn location(&self) -> Location {
        geo::clamp_coordinate(self.lat, self.lon)
    }
}

/// Weather used for geometry. Values not given fall back to the default
/// snapshot (6.5 mph from 270°, class D).
#[derive(Debug, Clone, Args)]
pub struct WeatherInput {
    /// Wind speed in mph
    #[arg(long)]
    pub wind_speed: Option<f64>,

    /// Direction the wind blows from, degrees clockwise from north
    #[arg(long)]
    pub wind_dir: Option<f64>,

    /// Pasquill-Gifford stability class (A-F)
    #[arg(long)]
    pub stability: Option<StabilityClass>,

    /// Fetch current weather for the location instead
    #[arg(long, conflicts_with_all = ["wind_speed", "wind_dir", "stability"])]
    pub live: bool,

    /// Weather provider for --live (open-meteo, nws)
    #[arg(long, requires = "live")]
    pub provider: Option<ProviderKind>,
}

impl WeatherInput {
    /// Snapshot from the manual flags.
    pub fn manual(&self) -> WeatherSnapshot {
        let base = WeatherSnapshot::fallback();
        WeatherSnapshot {
            wind_speed_mph: self.wind_speed.unwrap_or(base.wind_speed_mph),
            wind_direction_deg: self.wind_dir.unwrap_or(base.wind_direction_deg),
            stability: self.stability.unwrap_or(base.stability),
            ..base
        }
        .sanitized()
    }

    /// Live or manual weather for `location`.
    pub async fn resolve(
        &self,
        location: Location,
        config: &ConfigFile,
    ) -> Result<WeatherSnapshot, CliError> {
        if self.live {
            let applied = fetch_weather(location, self.provider, config).await?;
            Ok(applied.weather)
        } else {
            Ok(self.manual())
        }
    }
}

/// Loads configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Geometry settings with an optional projection override.
pub fn geometry_config(config: &ConfigFile, hours: Option<f64>) -> GeometryConfig {
    match hours {
        Some(hours) => config.geometry.with_projection_hours(hours),
        None => config.geometry,
    }
}

/// HTTP client for weather providers.
pub fn weather_http_client(config: &ConfigFile) -> Result<AsyncReqwestClient, CliError> {
    Ok(AsyncReqwestClient::with_options(
        config.weather.timeout_secs,
        &config.weather.user_agent,
    )?)
}

/// Resolves weather for one location through the fetch coordinator.
///
/// Provider failures do not fail the command; the applied weather is then
/// the fallback snapshot and a warning is printed.
pub async fn fetch_weather(
    location: Location,
    provider: Option<ProviderKind>,
    config: &ConfigFile,
) -> Result<AppliedWeather, CliError> {
    let kind = provider.unwrap_or(config.weather.provider);
    let provider = ProviderFactory::new(weather_http_client(config)?).create(kind);
    let coordinator = WeatherFetchCoordinator::new(provider, config.coordinator_config());

    let spinner = spinner(format!(
        "Fetching weather from {} for {}",
        coordinator.provider_name(),
        location
    ));
    let (token, outcome) = coordinator.resolve(location).await;
    spinner.finish_and_clear();

    if let FetchOutcome::FellBack { reason, .. } = &outcome {
        eprintln!(
            "{} {} unavailable ({}), using fallback weather",
            console::style("warning:").yellow().bold(),
            kind,
            reason
        );
    }

    coordinator.current().ok_or_else(|| {
        CliError::Weather(format!("request {} was superseded", token))
    })
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
