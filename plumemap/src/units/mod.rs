//! Unit conversions used at the engine boundary.
//!
//! Weather arrives in a mix of unit systems (providers speak SI, the operator
//! display speaks imperial). Every conversion lives here so that geometry
//! builders only ever see one unit per quantity:
//!
//! | Quantity      | Internal unit | Geometry unit |
//! |---------------|---------------|---------------|
//! | Wind speed    | mph           | m/s           |
//! | Temperature   | °F            | -             |
//! | Pressure      | inHg          | -             |
//! | Distance      | meters        | meters        |
//!
//! All functions are total over their numeric domain and are exact inverses
//! of each other within floating-point tolerance.

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Inches of mercury per pascal.
pub const INHG_PER_PASCAL: f64 = 0.0002953;

/// Pascals per millibar (hectopascal).
pub const PASCALS_PER_MILLIBAR: f64 = 100.0;

/// Standard sea-level pressure in pascals.
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

/// Converts miles per hour to meters per second.
#[inline]
pub fn mph_to_ms(mph: f64) -> f64 {
    mph * METERS_PER_MILE / SECONDS_PER_HOUR
}

/// Converts meters per second to miles per hour.
#[inline]
pub fn ms_to_mph(ms: f64) -> f64 {
    ms * SECONDS_PER_HOUR / METERS_PER_MILE
}

/// Converts kilometers per hour to meters per second.
#[inline]
pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh * 1000.0 / SECONDS_PER_HOUR
}

/// Converts degrees Fahrenheit to degrees Celsius.
#[inline]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Converts degrees Celsius to degrees Fahrenheit.
#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Converts pascals to inches of mercury.
#[inline]
pub fn pa_to_inhg(pa: f64) -> f64 {
    pa * INHG_PER_PASCAL
}

/// Converts inches of mercury to pascals.
#[inline]
pub fn inhg_to_pa(inhg: f64) -> f64 {
    inhg / INHG_PER_PASCAL
}

/// Converts millibars (hPa) to pascals.
#[inline]
pub fn mb_to_pa(mb: f64) -> f64 {
    mb * PASCALS_PER_MILLIBAR
}

/// Converts pascals to millibars (hPa).
#[inline]
pub fn pa_to_mb(pa: f64) -> f64 {
    pa / PASCALS_PER_MILLIBAR
}

/// Converts millibars (hPa) to inches of mercury.
#[inline]
pub fn mb_to_inhg(mb: f64) -> f64 {
    pa_to_inhg(mb_to_pa(mb))
}

/// Converts inches of mercury to millibars (hPa).
#[inline]
pub fn inhg_to_mb(inhg: f64) -> f64 {
    pa_to_mb(inhg_to_pa(inhg))
}

/// Converts statute miles to meters.
#[inline]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Converts meters to statute miles.
#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// 16-point compass labels, clockwise from north.
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Returns the 16-point compass label for a bearing in degrees.
///
/// Bearings outside `[0, 360)` are wrapped; non-finite bearings map to "N".
pub fn compass_point(bearing_deg: f64) -> &'static str {
    if !bearing_deg.is_finite() {
        return COMPASS_POINTS[0];
    }
    let wrapped = bearing_deg.rem_euclid(360.0);
    let index = ((wrapped / 22.5) + 0.5).floor() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, rel: f64) {
        let scale = a.abs().max(b.abs()).max(1.0);
        assert!(
            (a - b).abs() <= rel * scale,
            "expected {} ≈ {} (rel tol {})",
            a,
            b,
            rel
        );
    }

    #[test]
    fn test_ten_mph_in_ms() {
        assert_close(mph_to_ms(10.0), 4.470388888888889, 1e-12);
    }

    #[test]
    fn test_freezing_and_boiling_points() {
        assert_close(fahrenheit_to_celsius(32.0), 0.0, 1e-12);
        assert_close(fahrenheit_to_celsius(212.0), 100.0, 1e-12);
        assert_close(celsius_to_fahrenheit(-40.0), -40.0, 1e-12);
    }

    #[test]
    fn test_standard_pressure_in_inhg() {
        // 101325 Pa ≈ 29.92 inHg
        assert!((pa_to_inhg(STANDARD_PRESSURE_PA) - 29.92).abs() < 0.01);
        assert!((mb_to_inhg(1013.25) - 29.92).abs() < 0.01);
    }

    #[test]
    fn test_kmh_to_ms() {
        assert_close(kmh_to_ms(36.0), 10.0, 1e-12);
    }

    #[test]
    fn test_mile_in_meters() {
        assert_eq!(miles_to_meters(1.0), 1609.34);
        assert_close(meters_to_miles(48_280.2), 30.0, 1e-9);
    }

    #[test]
    fn test_compass_points() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(202.5), "SSW");
        assert_eq!(compass_point(270.0), "W");
        assert_eq!(compass_point(-90.0), "W");
        assert_eq!(compass_point(f64::NAN), "N");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_speed_roundtrip(x in 0.0..500.0_f64) {
                let back = mph_to_ms(ms_to_mph(x));
                prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
                let back = ms_to_mph(mph_to_ms(x));
                prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
            }

            #[test]
            fn test_temperature_roundtrip(x in -100.0..150.0_f64) {
                let back = celsius_to_fahrenheit(fahrenheit_to_celsius(x));
                prop_assert!((back - x).abs() <= 1e-6 * x.abs().max(1.0));
            }

            #[test]
            fn test_pressure_roundtrip(x in 0.0..200_000.0_f64) {
                let back = inhg_to_pa(pa_to_inhg(x));
                prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
                let back = mb_to_inhg(inhg_to_mb(x / 1000.0));
                prop_assert!((back - x / 1000.0).abs() <= 1e-6 * (x / 1000.0).max(1.0));
            }

            #[test]
            fn test_distance_roundtrip(x in 0.0..1.0e7_f64) {
                let back = miles_to_meters(meters_to_miles(x));
                prop_assert!((back - x).abs() <= 1e-6 * x.max(1.0));
            }
        }
    }
}
