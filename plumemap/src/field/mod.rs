//! Concentration field mapping.
//!
//! Turns a [`ModelResult`] grid into renderable [`ConcentrationMarker`]s:
//!
//! 1. Place each grid point: absolute points are clamped in place, offset
//!    points are rotated into the flow frame and projected
//! 2. `intensity = concentration / max(max_concentration, ε)`, clamped to `[0, 1]`
//! 3. `radius_px = base + intensity × span`
//! 4. `color = ColorScale::color(intensity)`
//!
//! Grid points that cannot be placed are counted in
//! [`MarkerField::rejected`] and logged; the rest still render.
//!
//! # Example
//!
//! ```ignore
//! use plumemap::field::{ConcentrationFieldMapper, FlowFrame};
//!
//! let frame = FlowFrame::from_weather(origin, &weather);
//! let field = ConcentrationFieldMapper::default().map(&result, Some(&frame));
//! ```

mod color;
mod types;

pub use color::{ColorBand, ColorScale, Rgb, BLUE, DEEP_RED, GOLD, GREEN, ORANGE, RED};
pub use types::{ConcentrationMarker, FlowFrame, MarkerField};

use rayon::prelude::*;

use crate::geo;
use crate::model::{GridPoint, GridRepresentation, InvalidGridPoint, ModelResult};

/// Smallest divisor used when normalizing.
pub const INTENSITY_EPSILON: f64 = 1e-12;

/// Default marker radius at zero intensity, in pixels.
pub const DEFAULT_BASE_RADIUS_PX: f64 = 8.0;

/// Default radius added at full intensity, in pixels.
pub const DEFAULT_RADIUS_SPAN_PX: f64 = 20.0;

/// Maps model output grids to markers.
#[derive(Debug, Clone, Copy)]
pub struct ConcentrationFieldMapper {
    base_radius_px: f64,
    radius_span_px: f64,
    scale: ColorScale,
}

impl Default for ConcentrationFieldMapper {
    fn default() -> Self {
        Self {
            base_radius_px: DEFAULT_BASE_RADIUS_PX,
            radius_span_px: DEFAULT_RADIUS_SPAN_PX,
            scale: ColorScale,
        }
    }
}

impl ConcentrationFieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the marker radius encoding. Negative or non-finite values keep
    /// the defaults.
    pub fn with_radius(mut self, base_px: f64, span_px: f64) -> Self {
        if base_px.is_finite() && base_px >= 0.0 {
            self.base_radius_px = base_px;
        }
        if span_px.is_finite() && span_px >= 0.0 {
            self.radius_span_px = span_px;
        }
        self
    }

    /// Normalized intensity of `concentration` against `max_concentration`.
    ///
    /// Always in `[0, 1]`; a zero or invalid maximum never divides by zero.
    pub fn intensity(concentration: f64, max_concentration: f64) -> f64 {
        let max = if max_concentration.is_finite() {
            max_concentration.max(INTENSITY_EPSILON)
        } else {
            INTENSITY_EPSILON
        };
        let ratio = concentration / max;
        if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        }
    }

    /// Marker radius for an intensity.
    pub fn radius_px(&self, intensity: f64) -> f64 {
        self.base_radius_px + intensity * self.radius_span_px
    }

    /// Maps every grid point of `result`.
    ///
    /// `frame` is required to place offset-based points; without it they are
    /// rejected.
    pub fn map(&self, result: &ModelResult, frame: Option<&FlowFrame>) -> MarkerField {
        let placed: Vec<Result<ConcentrationMarker, InvalidGridPoint>> = result
            .grid
            .par_iter()
            .map(|point| self.marker(point, result.max_concentration, frame))
            .collect();

        let mut markers = Vec::with_capacity(placed.len());
        let mut rejected = 0;
        let mut first_reason = None;
        for outcome in placed {
            match outcome {
                Ok(marker) => markers.push(marker),
                Err(reason) => {
                    rejected += 1;
                    first_reason.get_or_insert(reason);
                }
            }
        }

        if let Some(reason) = first_reason {
            tracing::warn!(
                rejected,
                total = result.grid.len(),
                reason = %reason,
                "Rejected grid points"
            );
        }

        MarkerField { markers, rejected }
    }

    fn marker(
        &self,
        point: &GridPoint,
        max_concentration: f64,
        frame: Option<&FlowFrame>,
    ) -> Result<ConcentrationMarker, InvalidGridPoint> {
        let position = match point.representation()? {
            GridRepresentation::Absolute(loc) => geo::clamp_coordinate(loc.lat, loc.lon),
            GridRepresentation::Offset {
                downwind_m,
                crosswind_m,
            } => frame
                .ok_or(InvalidGridPoint::NoFlowFrame)?
                .place(downwind_m, crosswind_m),
        };

        let concentration = point.concentration.max(0.0);
        let intensity = Self::intensity(concentration, max_concentration);

        Ok(ConcentrationMarker {
            position,
            concentration,
            intensity,
            color: self.scale.color(intensity),
            radius_px: self.radius_px(intensity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Location;
    use crate::model::ModelKind;
    use crate::stability::StabilityClass;
    use crate::weather::WeatherSnapshot;

    const ORIGIN: Location = Location {
        lat: 39.8283,
        lon: -98.5795,
    };

    fn frame() -> FlowFrame {
        FlowFrame::from_weather(
            ORIGIN,
            &WeatherSnapshot::with_wind(10.0, 270.0, StabilityClass::D),
        )
    }

    fn result(grid: Vec<GridPoint>, max: f64) -> ModelResult {
        ModelResult {
            kind: ModelKind::Plume,
            grid,
            max_concentration: max,
            stability_class: Some(StabilityClass::D),
        }
    }

    #[test]
    fn test_zero_max_gives_zero_intensity() {
        let grid = (1..=5)
            .map(|i| GridPoint::offset(i as f64 * 100.0, 0.0, 0.0))
            .collect();
        let field = ConcentrationFieldMapper::default().map(&result(grid, 0.0), Some(&frame()));

        assert_eq!(field.len(), 5);
        assert_eq!(field.rejected, 0);
        for m in &field.markers {
            assert_eq!(m.intensity, 0.0);
            assert_eq!(m.radius_px, DEFAULT_BASE_RADIUS_PX);
            assert_eq!(m.color, BLUE);
        }
    }

    #[test]
    fn test_intensity_and_radius() {
        let grid = vec![
            GridPoint::offset(100.0, 0.0, 10.0),
            GridPoint::offset(200.0, 0.0, 5.0),
        ];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 10.0), Some(&frame()));

        assert_eq!(field.markers[0].intensity, 1.0);
        assert_eq!(field.markers[0].radius_px, 28.0);
        assert_eq!(field.markers[0].color, DEEP_RED);
        assert_eq!(field.markers[1].intensity, 0.5);
        assert_eq!(field.markers[1].radius_px, 18.0);
    }

    #[test]
    fn test_offset_points_follow_the_wind() {
        let grid = vec![GridPoint::offset(1000.0, 0.0, 1.0)];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 1.0), Some(&frame()));
        let p = field.markers[0].position;
        assert!(p.lon > ORIGIN.lon);
        assert!((p.lat - ORIGIN.lat).abs() < 1e-9);
    }

    #[test]
    fn test_absolute_points_used_directly() {
        let here = Location::new(40.0, -98.0);
        let grid = vec![GridPoint::absolute(here, 2.0)];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 4.0), None);
        assert_eq!(field.markers[0].position, here);
        assert_eq!(field.markers[0].intensity, 0.5);
    }

    #[test]
    fn test_absolute_points_clamped_not_dropped() {
        let grid = vec![GridPoint {
            lat: Some(95.0),
            lon: Some(-200.0),
            concentration: 1.0,
            ..GridPoint::default()
        }];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 1.0), None);
        assert_eq!(field.markers[0].position, Location { lat: 90.0, lon: -180.0 });
    }

    #[test]
    fn test_invalid_points_rejected_and_counted() {
        let grid = vec![
            GridPoint::offset(100.0, 0.0, 1.0),
            GridPoint {
                lat: Some(40.0),
                ..GridPoint::offset(100.0, 0.0, 1.0)
            },
            GridPoint::default(),
            GridPoint::absolute(Location::new(40.0, -98.0), 1.0),
        ];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 1.0), Some(&frame()));
        assert_eq!(field.len(), 2);
        assert_eq!(field.rejected, 2);
    }

    #[test]
    fn test_offset_points_need_a_frame() {
        let grid = vec![GridPoint::offset(100.0, 0.0, 1.0)];
        let field = ConcentrationFieldMapper::default().map(&result(grid, 1.0), None);
        assert!(field.is_empty());
        assert_eq!(field.rejected, 1);
    }

    #[test]
    fn test_marker_order_preserved() {
        let grid: Vec<GridPoint> = (0..200)
            .map(|i| GridPoint::offset(10.0 + i as f64, 0.0, i as f64))
            .collect();
        let field = ConcentrationFieldMapper::default().map(&result(grid, 199.0), Some(&frame()));
        for (i, m) in field.markers.iter().enumerate() {
            assert_eq!(m.concentration, i as f64);
        }
    }

    #[test]
    fn test_with_radius() {
        let mapper = ConcentrationFieldMapper::new().with_radius(4.0, 10.0);
        assert_eq!(mapper.radius_px(0.5), 9.0);
        let mapper = ConcentrationFieldMapper::new().with_radius(-1.0, f64::NAN);
        assert_eq!(mapper.radius_px(1.0), 28.0);
    }

    #[test]
    fn test_mapping_is_repeatable() {
        let grid = vec![
            GridPoint::offset(50.0, -25.0, 0.3),
            GridPoint::offset(500.0, 25.0, 0.9),
        ];
        let r = result(grid, 1.0);
        let mapper = ConcentrationFieldMapper::default();
        assert_eq!(mapper.map(&r, Some(&frame())), mapper.map(&r, Some(&frame())));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_intensity_always_in_unit_range(
                c in prop::num::f64::ANY,
                max in prop::num::f64::ANY,
            ) {
                let i = ConcentrationFieldMapper::intensity(c, max);
                prop_assert!((0.0..=1.0).contains(&i));
            }

            #[test]
            fn test_radius_within_encoding(c in 0.0f64..1e6, max in 0.0f64..1e6) {
                let mapper = ConcentrationFieldMapper::default();
                let r = mapper.radius_px(ConcentrationFieldMapper::intensity(c, max));
                prop_assert!((DEFAULT_BASE_RADIUS_PX..=DEFAULT_BASE_RADIUS_PX + DEFAULT_RADIUS_SPAN_PX).contains(&r));
            }
        }
    }
}
