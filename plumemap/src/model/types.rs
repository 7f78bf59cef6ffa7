//! Dispersion model result and request types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Location;
use crate::provider::ProviderError;
use crate::stability::StabilityClass;
use crate::weather::WeatherSnapshot;

/// Release model evaluated by the dispersion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Continuous release, steady-state Gaussian plume.
    #[default]
    Plume,
    /// Short release tracked as a moving puff.
    Puff,
    /// Single instantaneous release.
    Instantaneous,
}

impl ModelKind {
    /// Endpoint path segment for this model.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Plume => "plume",
            ModelKind::Puff => "puff",
            ModelKind::Instantaneous => "instantaneous",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plume" => Ok(ModelKind::Plume),
            "puff" => Ok(ModelKind::Puff),
            "instantaneous" | "instant" => Ok(ModelKind::Instantaneous),
            other => Err(format!(
                "Unknown model kind '{}'. Valid kinds: plume, puff, instantaneous",
                other
            )),
        }
    }
}

/// Why a grid point could not be placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidGridPoint {
    #[error("grid point carries both offset and absolute coordinates")]
    Ambiguous,

    #[error("grid point is missing one of its coordinate pair")]
    Incomplete,

    #[error("grid point has no coordinates")]
    NoCoordinates,

    #[error("grid point has a non-finite coordinate or concentration")]
    NonFinite,

    #[error("offset grid point without a flow frame")]
    NoFlowFrame,
}

/// How a grid point is located, inferred from which fields are present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridRepresentation {
    /// Meters along and across the flow direction from the release point.
    Offset { downwind_m: f64, crosswind_m: f64 },
    /// Absolute coordinates.
    Absolute(Location),
}

/// One sample of the model output grid.
///
/// Two shapes occur in practice: offset based (`downwind_offset_m`,
/// `crosswind_offset_m`, or the service's `x`/`y`) and absolute (`lat`,
/// `lon`/`lng`). All coordinate fields are optional on the wire;
/// [`GridPoint::representation`] decides which shape a point has.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPoint {
    #[serde(
        default,
        alias = "x",
        alias = "downwindOffsetM",
        skip_serializing_if = "Option::is_none"
    )]
    pub downwind_offset_m: Option<f64>,
    #[serde(
        default,
        alias = "y",
        alias = "crosswindOffsetM",
        skip_serializing_if = "Option::is_none"
    )]
    pub crosswind_offset_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, alias = "lng", skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub concentration: f64,
}

impl GridPoint {
    /// Creates an offset-based point.
    pub fn offset(downwind_m: f64, crosswind_m: f64, concentration: f64) -> Self {
        Self {
            downwind_offset_m: Some(downwind_m),
            crosswind_offset_m: Some(crosswind_m),
            concentration,
            ..Self::default()
        }
    }

    /// Creates an absolute-coordinate point.
    pub fn absolute(location: Location, concentration: f64) -> Self {
        Self {
            lat: Some(location.lat),
            lon: Some(location.lon),
            concentration,
            ..Self::default()
        }
    }

    /// Infers the representation from the fields present.
    ///
    /// Exactly one complete coordinate pair must be present. Mixed, partial
    /// or missing pairs are rejected rather than guessed.
    pub fn representation(&self) -> Result<GridRepresentation, InvalidGridPoint> {
        let offset = (self.downwind_offset_m, self.crosswind_offset_m);
        let absolute = (self.lat, self.lon);

        let has_offset = offset.0.is_some() || offset.1.is_some();
        let has_absolute = absolute.0.is_some() || absolute.1.is_some();

        let repr = match (has_offset, has_absolute) {
            (true, true) => return Err(InvalidGridPoint::Ambiguous),
            (false, false) => return Err(InvalidGridPoint::NoCoordinates),
            (true, false) => match offset {
                (Some(downwind_m), Some(crosswind_m)) => GridRepresentation::Offset {
                    downwind_m,
                    crosswind_m,
                },
                _ => return Err(InvalidGridPoint::Incomplete),
            },
            (false, true) => match absolute {
                (Some(lat), Some(lon)) => GridRepresentation::Absolute(Location { lat, lon }),
                _ => return Err(InvalidGridPoint::Incomplete),
            },
        };

        let finite = match repr {
            GridRepresentation::Offset {
                downwind_m,
                crosswind_m,
            } => downwind_m.is_finite() && crosswind_m.is_finite(),
            GridRepresentation::Absolute(loc) => loc.lat.is_finite() && loc.lon.is_finite(),
        };
        if !finite || !self.concentration.is_finite() {
            return Err(InvalidGridPoint::NonFinite);
        }

        Ok(repr)
    }
}

/// Output of a dispersion model run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelResult {
    #[serde(default, alias = "type")]
    pub kind: ModelKind,
    #[serde(default)]
    pub grid: Vec<GridPoint>,
    #[serde(default, alias = "maxConcentration")]
    pub max_concentration: f64,
    #[serde(
        default,
        alias = "stability",
        alias = "stabilityClass",
        skip_serializing_if = "Option::is_none"
    )]
    pub stability_class: Option<StabilityClass>,
}

impl ModelResult {
    /// Largest concentration actually present in the grid.
    pub fn observed_max(&self) -> f64 {
        self.grid
            .iter()
            .map(|p| p.concentration)
            .filter(|c| c.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Output of a grid run: the sampled receptors plus whatever model
/// metadata the service echoed back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridResult {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ModelKind>,
    #[serde(default)]
    pub grid: Vec<GridPoint>,
    #[serde(default, alias = "maxConcentration")]
    pub max_concentration: f64,
    #[serde(
        default,
        alias = "stabilityClass",
        skip_serializing_if = "Option::is_none"
    )]
    pub stability_class: Option<StabilityClass>,
}

impl GridResult {
    /// Converts to a [`ModelResult`], filling metadata the service left out.
    pub fn into_model_result(self, kind: ModelKind, stability: StabilityClass) -> ModelResult {
        ModelResult {
            kind: self.kind.unwrap_or(kind),
            grid: self.grid,
            max_concentration: self.max_concentration,
            stability_class: Some(self.stability_class.unwrap_or(stability)),
        }
    }
}

/// Release parameters sent with every model request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionParams {
    /// Emission rate in g/s, or total mass in g for instantaneous releases.
    #[serde(rename = "Q")]
    pub rate_g_per_s: f64,
    /// Effective stack height (m).
    #[serde(rename = "H")]
    pub stack_height_m: f64,
    /// Receptor height above ground (m).
    #[serde(rename = "z")]
    pub receptor_height_m: f64,
    /// Lateral dispersion parameter (m).
    #[serde(rename = "sy")]
    pub sigma_y_m: f64,
    /// Vertical dispersion parameter (m).
    #[serde(rename = "sz")]
    pub sigma_z_m: f64,
    /// Time since release (s).
    #[serde(rename = "t")]
    pub elapsed_s: f64,
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            rate_g_per_s: 10.0,
            stack_height_m: 50.0,
            receptor_height_m: 1.5,
            sigma_y_m: 10.0,
            sigma_z_m: 8.0,
            elapsed_s: 60.0,
        }
    }
}

impl EmissionParams {
    /// Defaults for the given model; instantaneous releases use 100 g.
    pub fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Instantaneous => Self {
                rate_g_per_s: 100.0,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// Everything needed to run the dispersion model for one release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRunParams {
    pub source: Location,
    pub kind: ModelKind,
    pub emission: EmissionParams,
    pub weather: WeatherSnapshot,
}

impl ModelRunParams {
    /// Creates parameters with the default emission for `kind`.
    pub fn new(source: Location, kind: ModelKind, weather: WeatherSnapshot) -> Self {
        Self {
            source,
            kind,
            emission: EmissionParams::for_kind(kind),
            weather,
        }
    }

    pub fn with_emission(mut self, emission: EmissionParams) -> Self {
        self.emission = emission;
        self
    }
}

/// Errors from the dispersion model service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model service request failed: {0}")]
    Transport(#[from] ProviderError),

    #[error("Malformed model response: {0}")]
    Malformed(String),

    #[error("Model returned an empty grid")]
    EmptyGrid,
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Malformed(e.to_string())
    }
}
