//! Geometry commands: `corridor`, `rings` and `scene`.
//!
//! Each prints JSON ready for a map layer.

use std::path::{Path, PathBuf};

use clap::Args;
use plumemap::config::ConfigFile;
use plumemap::geo::Location;
use plumemap::model::ModelResult;
use plumemap::scene::SceneBuilder;
use plumemap::weather::WeatherSnapshot;

use super::common::{self, LocationArgs, WeatherInput};
use crate::error::CliError;

/// Arguments shared by the geometry commands.
#[derive(Debug, Args)]
pub struct GeometryArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub weather: WeatherInput,

    /// Projection window in hours; defaults to geometry.projection_hours
    #[arg(long)]
    pub hours: Option<f64>,
}

/// Arguments for `plumemap scene`.
#[derive(Debug, Args)]
pub struct SceneArgs {
    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Model result JSON to map into concentration markers
    #[arg(long, value_name = "FILE")]
    pub model_result: Option<PathBuf>,
}

async fn builder_and_inputs(
    args: &GeometryArgs,
    config: &ConfigFile,
) -> Result<(SceneBuilder, Location, WeatherSnapshot), CliError> {
    let location = args.location.location();
    let weather = args.weather.resolve(location, config).await?;
    let builder = SceneBuilder::new(common::geometry_config(config, args.hours));
    Ok((builder, location, weather))
}

pub async fn run_corridor(args: GeometryArgs, config: &ConfigFile) -> Result<(), CliError> {
    let (builder, location, weather) = builder_and_inputs(&args, config).await?;
    let corridor = builder.corridor_builder().build(location, &weather);
    tracing::info!(
        travel_m = corridor.travel_distance_m,
        end_half_width_m = corridor.end_half_width_m,
        "Built corridor"
    );
    common::print_json(&corridor)
}

pub async fn run_rings(args: GeometryArgs, config: &ConfigFile) -> Result<(), CliError> {
    let (builder, location, weather) = builder_and_inputs(&args, config).await?;
    let rings = builder.ring_generator().generate(location, &weather);
    common::print_json(&rings)
}

pub async fn run_scene(args: SceneArgs, config: &ConfigFile) -> Result<(), CliError> {
    let result = args
        .model_result
        .as_deref()
        .map(read_model_result)
        .transpose()?;
    let (builder, location, weather) = builder_and_inputs(&args.geometry, config).await?;
    let scene = builder.build(location, &weather, result.as_ref());
    common::print_json(&scene)
}

/// Reads a model result JSON file; `-` reads stdin.
pub fn read_model_result(path: &Path) -> Result<ModelResult, CliError> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    }
    .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_model_result() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kind":"plume","maxConcentration":2.0,"grid":[{{"x":100,"y":0,"concentration":2.0}}]}}"#
        )
        .unwrap();

        let result = read_model_result(file.path()).unwrap();
        assert_eq!(result.grid.len(), 1);
        assert_eq!(result.max_concentration, 2.0);
    }

    #[test]
    fn test_read_model_result_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            read_model_result(file.path()),
            Err(CliError::Input(_))
        ));
    }
}
