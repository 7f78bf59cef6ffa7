//! Concentration marker types.

use serde::{Deserialize, Serialize};

use crate::geo::{self, Location};
use crate::weather::{self, WeatherSnapshot};

use super::color::Rgb;

/// A renderable concentration sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationMarker {
    pub position: Location,
    /// Concentration as reported by the model, floored at zero.
    pub concentration: f64,
    /// Concentration relative to the result maximum, `[0, 1]`.
    pub intensity: f64,
    pub color: Rgb,
    pub radius_px: f64,
}

/// Markers for one model result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerField {
    /// Markers in grid order.
    pub markers: Vec<ConcentrationMarker>,
    /// Grid points that could not be placed.
    pub rejected: usize,
}

impl MarkerField {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Local frame for offset-based grid points: the release point and the
/// direction the wind blows toward.
///
/// Downwind offsets run along the flow; positive crosswind offsets lie to
/// the left of the flow, matching the corridor's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowFrame {
    pub origin: Location,
    pub flow_angle_rad: f64,
}

impl FlowFrame {
    pub fn new(origin: Location, flow_angle_rad: f64) -> Self {
        Self {
            origin: origin.clamped(),
            flow_angle_rad,
        }
    }

    /// Frame for a release at `origin` under `weather`.
    pub fn from_weather(origin: Location, weather: &WeatherSnapshot) -> Self {
        Self::new(origin, weather::flow_angle_rad(weather.wind_from_deg()))
    }

    /// Places an offset in geographic coordinates.
    pub fn place(&self, downwind_m: f64, crosswind_m: f64) -> Location {
        let (sin, cos) = self.flow_angle_rad.sin_cos();
        let east = downwind_m * cos - crosswind_m * sin;
        let north = downwind_m * sin + crosswind_m * cos;
        geo::project(self.origin, north, east)
    }
}
