//! One-shot composition of everything drawn for a selection.
//!
//! A [`DispersionScene`] is rebuilt wholesale whenever the origin, the
//! weather or the model result changes. Nothing is patched in place and no
//! state carries over between builds.

use serde::{Deserialize, Serialize};

use crate::corridor::{CorridorBuilder, CorridorPolygon, DEFAULT_PROJECTION_HOURS};
use crate::field::{
    ConcentrationFieldMapper, FlowFrame, MarkerField, DEFAULT_BASE_RADIUS_PX,
    DEFAULT_RADIUS_SPAN_PX,
};
use crate::geo::Location;
use crate::model::ModelResult;
use crate::rings::{TimeRing, TimeRingGenerator, DEFAULT_RING_INTERVAL_HOURS};
use crate::weather::WeatherSnapshot;

/// Geometry settings shared by all builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Corridor projection window and last ring checkpoint, in hours.
    pub projection_hours: f64,
    /// Spacing between time rings, in hours.
    pub ring_interval_hours: f64,
    /// Marker radius at zero intensity.
    pub marker_base_radius_px: f64,
    /// Radius added at full intensity.
    pub marker_radius_span_px: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            projection_hours: DEFAULT_PROJECTION_HOURS,
            ring_interval_hours: DEFAULT_RING_INTERVAL_HOURS,
            marker_base_radius_px: DEFAULT_BASE_RADIUS_PX,
            marker_radius_span_px: DEFAULT_RADIUS_SPAN_PX,
        }
    }
}

impl GeometryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projection_hours(mut self, hours: f64) -> Self {
        self.projection_hours = hours;
        self
    }

    pub fn with_ring_interval_hours(mut self, hours: f64) -> Self {
        self.ring_interval_hours = hours;
        self
    }

    pub fn with_marker_radius(mut self, base_px: f64, span_px: f64) -> Self {
        self.marker_base_radius_px = base_px;
        self.marker_radius_span_px = span_px;
        self
    }
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionScene {
    pub origin: Location,
    pub weather: WeatherSnapshot,
    pub corridor: CorridorPolygon,
    pub rings: Vec<TimeRing>,
    pub markers: MarkerField,
}

/// Builds [`DispersionScene`]s from a fixed [`GeometryConfig`].
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    corridor: CorridorBuilder,
    rings: TimeRingGenerator,
    mapper: ConcentrationFieldMapper,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}

impl SceneBuilder {
    pub fn new(config: GeometryConfig) -> Self {
        let corridor = CorridorBuilder::new(config.projection_hours);
        Self {
            corridor,
            rings: TimeRingGenerator::with_interval(
                config.ring_interval_hours,
                corridor.projection_hours(),
            ),
            mapper: ConcentrationFieldMapper::new()
                .with_radius(config.marker_base_radius_px, config.marker_radius_span_px),
        }
    }

    pub fn corridor_builder(&self) -> &CorridorBuilder {
        &self.corridor
    }

    pub fn ring_generator(&self) -> &TimeRingGenerator {
        &self.rings
    }

    pub fn field_mapper(&self) -> &ConcentrationFieldMapper {
        &self.mapper
    }

    /// Builds the scene. Without a model result the marker field is empty.
    pub fn build(
        &self,
        origin: Location,
        weather: &WeatherSnapshot,
        result: Option<&ModelResult>,
    ) -> DispersionScene {
        let origin = origin.clamped();
        let weather = weather.sanitized();
        let frame = FlowFrame::from_weather(origin, &weather);

        let markers = result
            .map(|r| self.mapper.map(r, Some(&frame)))
            .unwrap_or_default();

        tracing::debug!(
            %origin,
            wind_mph = weather.wind_speed_mph,
            wind_from = weather.wind_direction_deg,
            stability = %weather.stability,
            markers = markers.len(),
            "Built dispersion scene"
        );

        DispersionScene {
            origin,
            corridor: self.corridor.build(origin, &weather),
            rings: self.rings.generate(origin, &weather),
            markers,
            weather,
        }
    }
}
