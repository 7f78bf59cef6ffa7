//! HTTP client for the external dispersion model service.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::provider::AsyncHttpClient;
use crate::stability::StabilityClass;

use super::types::{
    EmissionParams, GridPoint, GridResult, ModelError, ModelKind, ModelResult, ModelRunParams,
};

/// Default model service base URL.
pub const DEFAULT_MODEL_BASE_URL: &str = "http://localhost:8080/api";

/// Default model request timeout in seconds.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;

/// Downwind receptor distances (m); the service's run-grid layout.
pub const GRID_DOWNWIND_M: [f64; 6] = [50.0, 100.0, 200.0, 300.0, 500.0, 1000.0];

/// Crosswind receptor offsets (m); the service's run-grid layout.
pub const GRID_CROSSWIND_M: [f64; 5] = [-50.0, -25.0, 0.0, 25.0, 50.0];

/// The service rejects non-positive wind speeds.
const MIN_SAMPLE_WIND_MS: f64 = 0.5;

/// Configuration for [`DispersionModelClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub downwind_m: Vec<f64>,
    pub crosswind_m: Vec<f64>,
}

impl Default for ModelClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            downwind_m: GRID_DOWNWIND_M.to_vec(),
            crosswind_m: GRID_CROSSWIND_M.to_vec(),
        }
    }
}

impl ModelClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the receptor layout used by [`DispersionModelClient::sample_grid`].
    pub fn with_layout(mut self, downwind_m: Vec<f64>, crosswind_m: Vec<f64>) -> Self {
        self.downwind_m = downwind_m;
        self.crosswind_m = crosswind_m;
        self
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    lat: f64,
    lon: f64,
    kind: ModelKind,
    emission: &'a EmissionParams,
    weather: &'a crate::weather::WeatherSnapshot,
}

#[derive(Debug, Serialize)]
struct GridRequest<'a> {
    model_type: ModelKind,
    u: f64,
    stability: StabilityClass,
    stability_class: StabilityClass,
    #[serde(flatten)]
    emission: &'a EmissionParams,
}

#[derive(Debug, Serialize)]
struct SampleRequest<'a> {
    x: f64,
    y: f64,
    u: f64,
    stability: StabilityClass,
    #[serde(flatten)]
    emission: &'a EmissionParams,
}

#[derive(Debug, Deserialize)]
struct SampleResponse {
    concentration: f64,
}

/// Client for the dispersion model service.
///
/// # Example
///
/// ```ignore
/// let client = DispersionModelClient::new(AsyncReqwestClient::with_timeout(30)?, ModelClientConfig::default());
/// let grid = client.run_grid(&ModelRunParams::new(source, ModelKind::Plume, weather)).await?;
/// let result = grid.into_model_result(ModelKind::Plume, weather.stability);
/// ```
pub struct DispersionModelClient<C: AsyncHttpClient> {
    http_client: C,
    config: ModelClientConfig,
}

impl<C: AsyncHttpClient> DispersionModelClient<C> {
    pub fn new(http_client: C, config: ModelClientConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &ModelClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/model/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Runs the full model for a release: `POST {base}/model/run`.
    ///
    /// The request kind is authoritative; a missing stability class in the
    /// response is filled from the request weather.
    pub async fn run_model(&self, params: &ModelRunParams) -> Result<ModelResult, ModelError> {
        let source = params.source.clamped();
        let request = RunRequest {
            lat: source.lat,
            lon: source.lon,
            kind: params.kind,
            emission: &params.emission,
            weather: &params.weather,
        };
        let body = serde_json::to_vec(&request)?;

        let response = self
            .http_client
            .post_json(&self.endpoint("run"), body)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, kind = %params.kind, "Model run failed"))?;

        let mut result: ModelResult = serde_json::from_slice(&response)?;
        result.kind = params.kind;
        result.stability_class.get_or_insert(params.weather.stability);

        tracing::info!(
            kind = %result.kind,
            points = result.grid.len(),
            max = result.max_concentration,
            "Model run complete"
        );
        Ok(result)
    }

    /// Runs the model over the service's fixed receptor layout:
    /// `POST {base}/model/run-grid`.
    ///
    /// The service samples every receptor itself and echoes the model type
    /// and stability class. The request kind is authoritative; a missing
    /// stability class is filled from the request weather.
    pub async fn run_grid(&self, params: &ModelRunParams) -> Result<GridResult, ModelError> {
        let stability = params.weather.stability;
        let body = serde_json::to_vec(&GridRequest {
            model_type: params.kind,
            u: params.weather.wind_speed_ms().max(MIN_SAMPLE_WIND_MS),
            stability,
            stability_class: stability,
            emission: &params.emission,
        })?;

        let response = self
            .http_client
            .post_json(&self.endpoint("run-grid"), body)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, kind = %params.kind, "Grid run failed"))?;

        let mut result: GridResult = serde_json::from_slice(&response)?;
        if result.grid.is_empty() {
            return Err(ModelError::EmptyGrid);
        }
        result.kind = Some(params.kind);
        result.stability_class.get_or_insert(stability);

        tracing::info!(
            kind = %params.kind,
            points = result.grid.len(),
            max = result.max_concentration,
            "Grid run complete"
        );
        Ok(result)
    }

    /// Samples a custom receptor layout: one `POST {base}/model/{kind}` per
    /// receptor, issued concurrently.
    ///
    /// Any failed sample fails the whole run.
    pub async fn sample_grid(&self, params: &ModelRunParams) -> Result<GridResult, ModelError> {
        if self.config.downwind_m.is_empty() || self.config.crosswind_m.is_empty() {
            return Err(ModelError::EmptyGrid);
        }

        let url = self.endpoint(params.kind.as_str());
        let wind_ms = params.weather.wind_speed_ms().max(MIN_SAMPLE_WIND_MS);
        let stability = params.weather.stability;

        let receptors: Vec<(f64, f64)> = self
            .config
            .downwind_m
            .iter()
            .flat_map(|&x| self.config.crosswind_m.iter().map(move |&y| (x, y)))
            .collect();

        tracing::debug!(
            kind = %params.kind,
            receptors = receptors.len(),
            wind_ms,
            "Sampling model grid"
        );

        let samples = receptors.iter().map(|&(x, y)| {
            let url = &url;
            async move {
                let body = serde_json::to_vec(&SampleRequest {
                    x,
                    y,
                    u: wind_ms,
                    stability,
                    emission: &params.emission,
                })?;
                let response = self.http_client.post_json(url, body).await?;
                let sample: SampleResponse = serde_json::from_slice(&response)?;
                Ok::<_, ModelError>(GridPoint::offset(x, y, sample.concentration.max(0.0)))
            }
        });

        let grid = try_join_all(samples)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, kind = %params.kind, "Grid sampling failed"))?;

        let max_concentration = grid
            .iter()
            .map(|p| p.concentration)
            .filter(|c| c.is_finite())
            .fold(0.0, f64::max);

        Ok(GridResult {
            kind: Some(params.kind),
            grid,
            max_concentration,
            stability_class: Some(stability),
        })
    }
}
