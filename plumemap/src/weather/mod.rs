//! Weather snapshot consumed by the geometry builders.
//!
//! A snapshot mixes units the way operators read them: wind in mph,
//! temperature in °F, pressure in inHg. Wind direction follows the
//! meteorological convention (the compass heading the wind blows FROM).
//!
//! Providers convert into this shape at the boundary; geometry builders only
//! ever read snapshots and convert wind speed to m/s themselves.

use serde::{Deserialize, Serialize};

use crate::stability::StabilityClass;
use crate::units;

/// Fallback wind speed (mph) used when no provider answer is available.
pub const FALLBACK_WIND_SPEED_MPH: f64 = 6.5;

/// Fallback wind direction (degrees, blowing from the west).
pub const FALLBACK_WIND_DIRECTION_DEG: f64 = 270.0;

/// Fallback temperature (°F).
pub const FALLBACK_TEMPERATURE_F: f64 = 70.0;

/// Fallback relative humidity (%).
pub const FALLBACK_HUMIDITY_PCT: f64 = 70.0;

/// Fallback station pressure (inHg).
pub const FALLBACK_PRESSURE_INHG: f64 = 29.92;

/// Fallback stability class (neutral).
pub const FALLBACK_STABILITY: StabilityClass = StabilityClass::D;

/// Point-in-time surface weather.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Wind speed in miles per hour, `≥ 0`.
    #[serde(alias = "wind_speed")]
    pub wind_speed_mph: f64,
    /// Direction the wind blows FROM, degrees clockwise from north, `[0, 360)`.
    #[serde(alias = "wind_direction")]
    pub wind_direction_deg: f64,
    /// Air temperature in °F.
    #[serde(alias = "temperature")]
    pub temperature_f: f64,
    /// Relative humidity in percent, `[0, 100]`.
    #[serde(alias = "humidity")]
    pub humidity_pct: f64,
    /// Pressure in inches of mercury.
    #[serde(alias = "pressure")]
    pub pressure_inhg: f64,
    /// Atmospheric stability class.
    #[serde(default, alias = "stability_class")]
    pub stability: StabilityClass,
}

impl WeatherSnapshot {
    /// The documented fallback snapshot: 6.5 mph from 270°, 70°F, 70%,
    /// 29.92 inHg, class D.
    pub const fn fallback() -> Self {
        Self {
            wind_speed_mph: FALLBACK_WIND_SPEED_MPH,
            wind_direction_deg: FALLBACK_WIND_DIRECTION_DEG,
            temperature_f: FALLBACK_TEMPERATURE_F,
            humidity_pct: FALLBACK_HUMIDITY_PCT,
            pressure_inhg: FALLBACK_PRESSURE_INHG,
            stability: FALLBACK_STABILITY,
        }
    }

    /// Creates a snapshot from wind alone, filling the rest from the fallback.
    pub fn with_wind(wind_speed_mph: f64, wind_direction_deg: f64, stability: StabilityClass) -> Self {
        Self {
            wind_speed_mph,
            wind_direction_deg,
            stability,
            ..Self::fallback()
        }
    }

    /// Wind speed in meters per second, after sanitization.
    #[inline]
    pub fn wind_speed_ms(&self) -> f64 {
        units::mph_to_ms(sanitize_speed(self.wind_speed_mph))
    }

    /// Wind direction normalised into `[0, 360)`; non-finite becomes 0.
    #[inline]
    pub fn wind_from_deg(&self) -> f64 {
        normalize_bearing(self.wind_direction_deg)
    }

    /// Returns a copy with every field forced into its valid domain.
    ///
    /// Negative or non-finite wind becomes calm, direction is wrapped,
    /// humidity is clamped to `[0, 100]`, and non-finite temperature or
    /// pressure take fallback values.
    pub fn sanitized(&self) -> Self {
        let fallback = Self::fallback();
        Self {
            wind_speed_mph: sanitize_speed(self.wind_speed_mph),
            wind_direction_deg: normalize_bearing(self.wind_direction_deg),
            temperature_f: finite_or(self.temperature_f, fallback.temperature_f),
            humidity_pct: finite_or(self.humidity_pct, fallback.humidity_pct).clamp(0.0, 100.0),
            pressure_inhg: finite_or(self.pressure_inhg, fallback.pressure_inhg),
            stability: self.stability,
        }
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Flow heading in standard math convention (radians, east = 0,
/// counter-clockwise positive) for a meteorological "wind from" bearing.
///
/// Adding 180° turns "blowing from" into "blowing toward"; `90 − x` turns a
/// compass bearing into a math angle.
#[inline]
pub fn flow_angle_rad(wind_from_deg: f64) -> f64 {
    let toward = (normalize_bearing(wind_from_deg) + 180.0).rem_euclid(360.0);
    (90.0 - toward).to_radians()
}

#[inline]
fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.max(0.0)
    } else {
        0.0
    }
}

#[inline]
fn normalize_bearing(deg: f64) -> f64 {
    if deg.is_finite() {
        deg.rem_euclid(360.0)
    } else {
        0.0
    }
}

#[inline]
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_constants() {
        let w = WeatherSnapshot::fallback();
        assert_eq!(w.wind_speed_mph, 6.5);
        assert_eq!(w.wind_direction_deg, 270.0);
        assert_eq!(w.temperature_f, 70.0);
        assert_eq!(w.humidity_pct, 70.0);
        assert_eq!(w.pressure_inhg, 29.92);
        assert_eq!(w.stability, StabilityClass::D);
        assert_eq!(WeatherSnapshot::default(), w);
    }

    #[test]
    fn test_west_wind_flows_east() {
        let angle = flow_angle_rad(270.0);
        assert!(angle.cos() > 0.999_999);
        assert!(angle.sin().abs() < 1e-9);
    }

    #[test]
    fn test_north_wind_flows_south() {
        let angle = flow_angle_rad(0.0);
        assert!(angle.sin() < -0.999_999);
        assert!(angle.cos().abs() < 1e-9);
    }

    #[test]
    fn test_sanitized() {
        let w = WeatherSnapshot {
            wind_speed_mph: -4.0,
            wind_direction_deg: -90.0,
            temperature_f: f64::NAN,
            humidity_pct: 140.0,
            pressure_inhg: f64::INFINITY,
            stability: StabilityClass::F,
        }
        .sanitized();
        assert_eq!(w.wind_speed_mph, 0.0);
        assert_eq!(w.wind_direction_deg, 270.0);
        assert_eq!(w.temperature_f, 70.0);
        assert_eq!(w.humidity_pct, 100.0);
        assert_eq!(w.pressure_inhg, 29.92);
        assert_eq!(w.stability, StabilityClass::F);
    }

    #[test]
    fn test_deserialize_snake_case_payload() {
        let json = r#"{
            "wind_speed": 2.9,
            "wind_direction": 270,
            "temperature": 83.1,
            "humidity": 79.9,
            "pressure": 30.06,
            "stability_class": "C"
        }"#;
        let w: WeatherSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(w.wind_speed_mph, 2.9);
        assert_eq!(w.stability, StabilityClass::C);
    }

    #[test]
    fn test_deserialize_loose_stability() {
        let payload = |class: &str| {
            format!(
                r#"{{"wind_speed": 4.0, "wind_direction": 180, "temperature": 70,
                    "humidity": 50, "pressure": 29.9, "stability_class": "{}"}}"#,
                class
            )
        };

        let neutral: WeatherSnapshot = serde_json::from_str(&payload("1/2")).unwrap();
        assert_eq!(neutral.stability, StabilityClass::D);
        assert_eq!(neutral.wind_speed_mph, 4.0);

        let lower: WeatherSnapshot = serde_json::from_str(&payload("b")).unwrap();
        assert_eq!(lower.stability, StabilityClass::B);
    }
}
