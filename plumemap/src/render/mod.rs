//! Presentation strategies over a marker field.
//!
//! Styles decide how markers look on screen (static circles, a pulsing
//! animation, heatmap weights). They never change a marker's intensity or
//! its color decision; those belong to the field mapper. Animation state is
//! passed in explicitly as a frame counter.

use serde::{Deserialize, Serialize};

use crate::field::{ConcentrationMarker, Rgb};
use crate::geo::Location;

/// Fixed heatmap blob radius in pixels.
pub const HEATMAP_RADIUS_PX: f64 = 25.0;

/// Frames per radian of the pulse cycle.
const PULSE_PERIOD_FRAMES: f64 = 10.0;

/// A marker as drawn for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyledMarker {
    pub position: Location,
    pub color: Rgb,
    pub radius_px: f64,
    /// Fill opacity, `[0, 1]`.
    pub opacity: f64,
    /// Multiplier applied to `radius_px` by the renderer.
    pub scale: f64,
    /// Heatmap weight, `[0, 1]`.
    pub weight: f64,
}

/// Maps a marker to its on-screen appearance.
pub trait MarkerStyle: Send + Sync {
    /// Short identifier, e.g. `"pulsing"`.
    fn name(&self) -> &'static str;

    /// Styles marker `index` of the field for animation frame `frame`.
    fn style(&self, marker: &ConcentrationMarker, index: usize, frame: u64) -> StyledMarker;

    /// Styles a whole field.
    fn style_all(&self, markers: &[ConcentrationMarker], frame: u64) -> Vec<StyledMarker> {
        markers
            .iter()
            .enumerate()
            .map(|(i, m)| self.style(m, i, frame))
            .collect()
    }
}

/// Static circles, opacity rising with intensity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteMarkers;

impl MarkerStyle for DiscreteMarkers {
    fn name(&self) -> &'static str {
        "discrete"
    }

    fn style(&self, marker: &ConcentrationMarker, _index: usize, _frame: u64) -> StyledMarker {
        StyledMarker {
            position: marker.position,
            color: marker.color,
            radius_px: marker.radius_px,
            opacity: 0.4 + 0.5 * marker.intensity,
            scale: 1.0,
            weight: marker.intensity,
        }
    }
}

/// Circles that breathe over time, each slightly out of phase.
///
/// `opacity = 0.5 + 0.3·sin(frame/10)`, `scale = 1 + 0.1·sin(frame/10 + index)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulsingMarkers;

impl MarkerStyle for PulsingMarkers {
    fn name(&self) -> &'static str {
        "pulsing"
    }

    fn style(&self, marker: &ConcentrationMarker, index: usize, frame: u64) -> StyledMarker {
        let phase = frame as f64 / PULSE_PERIOD_FRAMES;
        StyledMarker {
            position: marker.position,
            color: marker.color,
            radius_px: marker.radius_px,
            opacity: 0.5 + 0.3 * phase.sin(),
            scale: 1.0 + 0.1 * (phase + index as f64).sin(),
            weight: marker.intensity,
        }
    }
}

/// Heatmap points: fixed radius, weight carries the intensity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heatmap;

impl MarkerStyle for Heatmap {
    fn name(&self) -> &'static str {
        "heatmap"
    }

    fn style(&self, marker: &ConcentrationMarker, _index: usize, _frame: u64) -> StyledMarker {
        StyledMarker {
            position: marker.position,
            color: marker.color,
            radius_px: HEATMAP_RADIUS_PX,
            opacity: 0.6,
            scale: 1.0,
            weight: marker.intensity,
        }
    }
}

/// Looks up a style by name.
pub fn style_by_name(name: &str) -> Option<Box<dyn MarkerStyle>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "discrete" | "markers" => Some(Box::new(DiscreteMarkers)),
        "pulsing" | "pulse" => Some(Box::new(PulsingMarkers)),
        "heatmap" | "heat" => Some(Box::new(Heatmap)),
        _ => None,
    }
}
