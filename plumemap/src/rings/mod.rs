//! Time-of-arrival rings.
//!
//! Each ring marks how far the plume centerline could have travelled after a
//! given elapsed time at the current wind speed. Rings are visual aids drawn
//! as circles, so the metric radius is reduced to a single representative
//! degree radius (mean of the latitude and longitude spans).

use serde::{Deserialize, Serialize};

use crate::geo::{self, Location};
use crate::units;
use crate::weather::WeatherSnapshot;

/// Default spacing between checkpoints in hours.
pub const DEFAULT_RING_INTERVAL_HOURS: f64 = 0.5;

/// Default last checkpoint in hours.
pub const DEFAULT_RING_HORIZON_HOURS: f64 = 3.0;

/// Upper bound on generated rings. Intervals that would exceed it are
/// widened so the last ring still reaches the horizon.
pub const MAX_RINGS: usize = 96;

/// A single time-of-arrival ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRing {
    /// Ring center (the release point).
    pub center: Location,
    /// Representative radius in degrees.
    pub radius_deg: f64,
    /// Elapsed time since release in hours.
    pub elapsed_hours: f64,
    /// Travel distance in meters.
    pub distance_meters: f64,
    /// Travel distance in statute miles, for display.
    pub distance_miles: f64,
}

/// Generates rings at fixed elapsed-time checkpoints.
#[derive(Debug, Clone)]
pub struct TimeRingGenerator {
    checkpoints: Vec<f64>,
}

impl Default for TimeRingGenerator {
    fn default() -> Self {
        Self::with_interval(DEFAULT_RING_INTERVAL_HOURS, DEFAULT_RING_HORIZON_HOURS)
    }
}

impl TimeRingGenerator {
    /// Creates a generator from explicit checkpoints (hours).
    ///
    /// Non-finite and negative checkpoints are dropped; the rest are sorted
    /// ascending and deduplicated.
    pub fn new(checkpoints: impl IntoIterator<Item = f64>) -> Self {
        let mut checkpoints: Vec<f64> = checkpoints
            .into_iter()
            .filter(|h| h.is_finite() && *h >= 0.0)
            .collect();
        checkpoints.sort_by(f64::total_cmp);
        checkpoints.dedup();
        checkpoints.truncate(MAX_RINGS);
        Self { checkpoints }
    }

    /// Creates checkpoints every `interval_hours` up to and including
    /// `horizon_hours`.
    pub fn with_interval(interval_hours: f64, horizon_hours: f64) -> Self {
        if !(interval_hours.is_finite() && interval_hours > 0.0 && horizon_hours.is_finite()) {
            return Self::default();
        }
        let mut interval_hours = interval_hours;
        let mut steps = ((horizon_hours / interval_hours) + 1e-9).floor().max(0.0) as usize;
        if steps > MAX_RINGS {
            let widened = horizon_hours / MAX_RINGS as f64;
            tracing::warn!(
                requested = interval_hours,
                widened,
                horizon = horizon_hours,
                max_rings = MAX_RINGS,
                "Ring interval too small, widening"
            );
            interval_hours = widened;
            steps = MAX_RINGS;
        }
        Self::new((1..=steps).map(|i| i as f64 * interval_hours))
    }

    /// The elapsed-time checkpoints in ascending order.
    pub fn checkpoints(&self) -> &[f64] {
        &self.checkpoints
    }

    /// Generates one ring per checkpoint, ascending by elapsed time.
    pub fn generate(&self, origin: Location, weather: &WeatherSnapshot) -> Vec<TimeRing> {
        let center = origin.clamped();
        let wind_ms = weather.wind_speed_ms();

        self.checkpoints
            .iter()
            .map(|&hours| {
                let distance_meters = wind_ms * units::SECONDS_PER_HOUR * hours;
                TimeRing {
                    center,
                    radius_deg: geo::meters_to_mean_degrees(distance_meters, center.lat),
                    elapsed_hours: hours,
                    distance_meters,
                    distance_miles: units::meters_to_miles(distance_meters),
                }
            })
            .collect()
    }
}
