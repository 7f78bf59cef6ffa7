//! Downwind hazard corridor.
//!
//! The corridor approximates the region a release could reach within the
//! projection window: a trapezoid starting at the source, following the flow
//! direction, widening from a stability-dependent base half-width to three
//! times that at the far end.
//!
//! ```text
//!            left-base ──────────────── left-end
//!           /                                  \
//!   origin ●  ─ ─ ─ ─ ─ ─ flow axis ─ ─ ─ ─ ─ ─ ● far
//!           \                                  /
//!            right-base ────────────── right-end
//! ```
//!
//! Vertices are computed in a local metric frame and projected with
//! [`crate::geo`], then clamped into the renderable range.

use serde::{Deserialize, Serialize};

use crate::geo::{self, Location};
use crate::weather::{self, WeatherSnapshot};

/// Default projection window in hours.
pub const DEFAULT_PROJECTION_HOURS: f64 = 3.0;

/// Minimum travel distance in meters. Keeps the polygon non-degenerate in
/// calm air.
pub const MIN_TRAVEL_DISTANCE_M: f64 = 100.0;

/// Ratio of far-end half-width to source-end half-width.
pub const END_WIDTH_RATIO: f64 = 3.0;

/// Number of vertices in every corridor polygon.
pub const CORRIDOR_VERTEX_COUNT: usize = 6;

/// Corridor polygon plus the metric quantities it was built from.
///
/// The polygon is closed implicitly (last vertex connects back to the first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorPolygon {
    /// Vertices in order: origin, left-base, left-end, far, right-end,
    /// right-base.
    pub vertices: Vec<Location>,
    /// Downwind length of the corridor in meters.
    pub travel_distance_m: f64,
    /// Half-width at the source end in meters.
    pub base_half_width_m: f64,
    /// Half-width at the far end in meters.
    pub end_half_width_m: f64,
    /// Flow heading (math convention, radians).
    pub flow_angle_rad: f64,
}

impl CorridorPolygon {
    /// The far endpoint on the flow axis, if the polygon has one.
    ///
    /// Polygons from [`CorridorBuilder`] always do; deserialized ones may not.
    pub fn far_endpoint(&self) -> Option<Location> {
        self.vertices.get(3).copied()
    }
}

/// Builds corridor polygons for a fixed projection window.
#[derive(Debug, Clone, Copy)]
pub struct CorridorBuilder {
    projection_hours: f64,
}

impl Default for CorridorBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECTION_HOURS)
    }
}

impl CorridorBuilder {
    /// Creates a builder projecting `projection_hours` ahead.
    ///
    /// Non-finite or negative windows fall back to the default.
    pub fn new(projection_hours: f64) -> Self {
        let projection_hours = if projection_hours.is_finite() && projection_hours >= 0.0 {
            projection_hours
        } else {
            DEFAULT_PROJECTION_HOURS
        };
        Self { projection_hours }
    }

    /// Projection window in hours.
    pub fn projection_hours(&self) -> f64 {
        self.projection_hours
    }

    /// Builds the corridor for a source point and weather snapshot.
    pub fn build(&self, origin: Location, weather: &WeatherSnapshot) -> CorridorPolygon {
        let origin = origin.clamped();
        let wind_ms = weather.wind_speed_ms();
        let theta = weather::flow_angle_rad(weather.wind_from_deg());

        let travel = (wind_ms * 3600.0 * self.projection_hours).max(MIN_TRAVEL_DISTANCE_M);
        let base_half = travel * weather.stability.growth_coefficient();
        let end_half = END_WIDTH_RATIO * base_half;

        // Flow direction and its left-hand perpendicular, (east, north).
        let (sin, cos) = theta.sin_cos();
        let flow = (cos, sin);
        let perp = (-sin, cos);

        let offsets = [
            (0.0, 0.0),
            (perp.0 * base_half, perp.1 * base_half),
            (
                flow.0 * travel + perp.0 * end_half,
                flow.1 * travel + perp.1 * end_half,
            ),
            (flow.0 * travel, flow.1 * travel),
            (
                flow.0 * travel - perp.0 * end_half,
                flow.1 * travel - perp.1 * end_half,
            ),
            (-perp.0 * base_half, -perp.1 * base_half),
        ];

        let vertices = offsets
            .iter()
            .map(|&(east, north)| geo::project(origin, north, east))
            .collect();

        tracing::trace!(
            %origin,
            travel_m = travel,
            base_half_m = base_half,
            stability = %weather.stability,
            "Built hazard corridor"
        );

        CorridorPolygon {
            vertices,
            travel_distance_m: travel,
            base_half_width_m: base_half,
            end_half_width_m: end_half,
            flow_angle_rad: theta,
        }
    }
}
