//! `weather` command: resolve current conditions for a location.

use clap::Args;
use plumemap::config::ConfigFile;
use plumemap::coordinator::{AppliedWeather, WeatherSource};
use plumemap::provider::ProviderKind;
use plumemap::units;

use super::common::{self, LocationArgs};
use crate::error::CliError;

/// Arguments for `plumemap weather`.
#[derive(Debug, Args)]
pub struct WeatherArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Weather provider (open-meteo, nws); defaults to weather.provider
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Print the applied weather as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WeatherArgs, config: &ConfigFile) -> Result<(), CliError> {
    let applied = common::fetch_weather(args.location.location(), args.provider, config).await?;

    if args.json {
        return common::print_json(&applied);
    }

    print_summary(&applied);
    Ok(())
}

fn print_summary(applied: &AppliedWeather) {
    let w = &applied.weather;
    let source = match &applied.source {
        WeatherSource::Provider { name } => name.clone(),
        WeatherSource::Fallback { .. } => "fallback".to_string(),
    };

    println!("Weather at {} [{}]", applied.request.location, source);
    println!(
        "  Wind:        {:.1} mph ({:.1} m/s) from {:.0}° ({})",
        w.wind_speed_mph,
        w.wind_speed_ms(),
        w.wind_direction_deg,
        units::compass_point(w.wind_direction_deg)
    );
    println!("  Temperature: {:.1} °F", w.temperature_f);
    println!("  Humidity:    {:.0} %", w.humidity_pct);
    println!("  Pressure:    {:.2} inHg", w.pressure_inhg);
    println!(
        "  Stability:   {} ({})",
        w.stability,
        w.stability.description()
    );
}
