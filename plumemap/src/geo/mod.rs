//! Local-tangent projection between metric offsets and geographic coordinates.
//!
//! Geometry is built in a flat local frame (meters north/east of a reference
//! point) and projected back to latitude/longitude. One degree of latitude is
//! treated as a constant distance; one degree of longitude shrinks with the
//! cosine of latitude.
//!
//! Latitude is clamped to ±85° before the longitude scale is taken so the
//! cosine never collapses to zero near the poles.

mod types;

pub use types::{Location, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

use std::f64::consts::PI;

/// Meters per degree of latitude (WGS-84 mean, equatorial tier).
pub const METERS_PER_DEGREE_LAT: f64 = 111_321.5;

/// Latitude limit used when computing the longitude scale.
pub const PROJECTION_LAT_LIMIT: f64 = 85.0;

/// Meters spanned by one degree of longitude at the given latitude.
///
/// The latitude is clamped to ±[`PROJECTION_LAT_LIMIT`] first, so the result
/// is always strictly positive.
#[inline]
pub fn meters_per_degree_lon(lat: f64) -> f64 {
    let lat = if lat.is_nan() { 0.0 } else { lat };
    let clamped = lat.clamp(-PROJECTION_LAT_LIMIT, PROJECTION_LAT_LIMIT);
    METERS_PER_DEGREE_LAT * (clamped * PI / 180.0).cos()
}

/// Projects a metric offset from `origin` into absolute coordinates.
///
/// The result is not clamped; pass it through [`clamp_coordinate`] before
/// handing it to a renderer.
#[inline]
pub fn offset_to_lat_lon(origin: Location, d_meters_north: f64, d_meters_east: f64) -> Location {
    Location {
        lat: origin.lat + d_meters_north / METERS_PER_DEGREE_LAT,
        lon: origin.lon + d_meters_east / meters_per_degree_lon(origin.lat),
    }
}

/// Inverse of [`offset_to_lat_lon`]: returns `(meters_north, meters_east)` of
/// `point` relative to `origin`.
#[inline]
pub fn lat_lon_to_offset(origin: Location, point: Location) -> (f64, f64) {
    let north = (point.lat - origin.lat) * METERS_PER_DEGREE_LAT;
    let east = (point.lon - origin.lon) * meters_per_degree_lon(origin.lat);
    (north, east)
}

/// Projects an offset and clamps the result into the valid range.
#[inline]
pub fn project(origin: Location, d_meters_north: f64, d_meters_east: f64) -> Location {
    let p = offset_to_lat_lon(origin, d_meters_north, d_meters_east);
    clamp_coordinate(p.lat, p.lon)
}

/// Forces a coordinate pair into the renderable range.
///
/// Any `NaN` component becomes `0`; otherwise each component is clamped to
/// `[-90, 90]` / `[-180, 180]`. Infinite values clamp to the nearest bound.
/// The operation is idempotent.
#[inline]
pub fn clamp_coordinate(lat: f64, lon: f64) -> Location {
    let lat = if lat.is_nan() { 0.0 } else { lat.clamp(MIN_LAT, MAX_LAT) };
    let lon = if lon.is_nan() { 0.0 } else { lon.clamp(MIN_LON, MAX_LON) };
    Location { lat, lon }
}

/// Converts a distance in meters to an approximate degree radius at `lat`.
///
/// Averages the latitude-degree and longitude-degree spans. Good enough for
/// visual aids drawn as circles; not a geodesic radius.
#[inline]
pub fn meters_to_mean_degrees(meters: f64, lat: f64) -> f64 {
    let lat_deg = meters / METERS_PER_DEGREE_LAT;
    let lon_deg = meters / meters_per_degree_lon(lat);
    (lat_deg + lon_deg) / 2.0
}
