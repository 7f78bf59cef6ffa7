//! Geographic value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// A point on the globe in decimal degrees.
///
/// Locations are plain values: a new selection replaces the old one wholesale.
/// Construct through [`Location::new`] to get a value that is guaranteed to be
/// renderable (NaN components zeroed, out-of-range components clamped).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl Location {
    /// Creates a location, clamping it into the valid coordinate range.
    pub fn new(lat: f64, lon: f64) -> Self {
        super::clamp_coordinate(lat, lon)
    }

    /// Returns this location clamped into the valid coordinate range.
    pub fn clamped(self) -> Self {
        super::clamp_coordinate(self.lat, self.lon)
    }

    /// Whether both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.lat)
            && (MIN_LON..=MAX_LON).contains(&self.lon)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}
