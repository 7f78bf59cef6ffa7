//! `model` command: run the external dispersion model service.

use clap::Args;
use plumemap::config::ConfigFile;
use plumemap::model::{DispersionModelClient, EmissionParams, ModelKind, ModelRunParams};
use plumemap::provider::AsyncReqwestClient;

use super::common::{self, LocationArgs, WeatherInput};
use crate::error::CliError;

/// Arguments for `plumemap model`.
#[derive(Debug, Args)]
pub struct ModelArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub weather: WeatherInput,

    /// Model kind (plume, puff, instantaneous)
    #[arg(long, default_value = "plume")]
    pub kind: ModelKind,

    /// Emission rate Q (g/s, or g for instantaneous releases)
    #[arg(long)]
    pub emission_rate: Option<f64>,

    /// Effective stack height H in meters
    #[arg(long)]
    pub stack_height: Option<f64>,

    /// Run over the service's 6 x 5 receptor grid (`run-grid`)
    #[arg(long)]
    pub grid: bool,

    /// Model service base URL; defaults to model.base_url
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn run(args: ModelArgs, config: &ConfigFile) -> Result<(), CliError> {
    let source = args.location.location();
    let weather = args.weather.resolve(source, config).await?;

    let mut emission = EmissionParams::for_kind(args.kind);
    if let Some(q) = args.emission_rate {
        emission.rate_g_per_s = q;
    }
    if let Some(h) = args.stack_height {
        emission.stack_height_m = h;
    }
    let params = ModelRunParams::new(source, args.kind, weather).with_emission(emission);

    let mut client_config = config.model_client_config();
    if let Some(url) = args.base_url {
        client_config = client_config.with_base_url(url);
    }
    let http = AsyncReqwestClient::with_options(client_config.timeout_secs, &config.weather.user_agent)?;
    let client = DispersionModelClient::new(http, client_config);

    tracing::info!(
        kind = %args.kind,
        %source,
        base_url = %client.config().base_url,
        "Running dispersion model"
    );

    let result = if args.grid {
        client
            .run_grid(&params)
            .await?
            .into_model_result(args.kind, weather.stability)
    } else {
        client.run_model(&params).await?
    };

    common::print_json(&result)
}
