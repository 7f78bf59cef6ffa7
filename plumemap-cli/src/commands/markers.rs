//! `markers` command: map a model result onto styled concentration markers.

use std::path::PathBuf;

use clap::Args;
use plumemap::config::ConfigFile;
use plumemap::field::{ConcentrationFieldMapper, FlowFrame};
use plumemap::geo;
use plumemap::render::{self, MarkerStyle};

use super::common;
use super::geometry::read_model_result;
use crate::error::CliError;

/// Arguments for `plumemap markers`.
#[derive(Debug, Args)]
pub struct MarkersArgs {
    /// Model result JSON (`-` for stdin)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Source latitude; needed to place offset grid points
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Source longitude; needed to place offset grid points
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Direction the wind blows from, degrees clockwise from north
    #[arg(long, default_value_t = 270.0)]
    pub wind_dir: f64,

    /// Render style (discrete, pulsing, heatmap); omit for raw markers
    #[arg(long)]
    pub style: Option<String>,

    /// Animation frame for time-varying styles
    #[arg(long, default_value_t = 0)]
    pub frame: u64,
}

pub fn run(args: MarkersArgs, config: &ConfigFile) -> Result<(), CliError> {
    let style = args
        .style
        .as_deref()
        .map(|name| {
            render::style_by_name(name).ok_or_else(|| {
                CliError::Input(format!(
                    "unknown style '{}' (expected discrete, pulsing or heatmap)",
                    name
                ))
            })
        })
        .transpose()?;

    let result = read_model_result(&args.input)?;
    let frame = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(FlowFrame::new(
            geo::clamp_coordinate(lat, lon),
            plumemap::weather::flow_angle_rad(args.wind_dir),
        )),
        _ => None,
    };

    let geometry = &config.geometry;
    let mapper = ConcentrationFieldMapper::new()
        .with_radius(geometry.marker_base_radius_px, geometry.marker_radius_span_px);
    let field = mapper.map(&result, frame.as_ref());

    if field.rejected > 0 {
        eprintln!(
            "{} skipped {} of {} grid points",
            console::style("warning:").yellow().bold(),
            field.rejected,
            result.grid.len()
        );
    }

    match style {
        Some(style) => common::print_json(&style.style_all(&field.markers, args.frame)),
        None => common::print_json(&field),
    }
}
