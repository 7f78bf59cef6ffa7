//! Five-band intensity color scale.
//!
//! | Band     | Intensity    | From   | To        |
//! |----------|--------------|--------|-----------|
//! | Low      | `[0.0, 0.2)` | blue   | green     |
//! | Moderate | `[0.2, 0.4)` | green  | gold      |
//! | Elevated | `[0.4, 0.6)` | gold   | orange    |
//! | High     | `[0.6, 0.8)` | orange | red       |
//! | Severe   | `[0.8, 1.0]` | red    | deep red  |
//!
//! Within a band the color is linearly interpolated toward the next band's
//! base color, so the scale is continuous across thresholds and hue never
//! moves back toward blue as intensity rises.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Hue angle in degrees, `[0, 360)`. Gray has hue 0.
    pub fn hue(&self) -> f64 {
        let (r, g, b) = (self.r as f64, self.g as f64, self.b as f64);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;
        if chroma == 0.0 {
            return 0.0;
        }
        let h = if max == r {
            ((g - b) / chroma).rem_euclid(6.0)
        } else if max == g {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };
        h * 60.0
    }

    /// `#rrggbb` form for map renderers.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Intensity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Low,
    Moderate,
    Elevated,
    High,
    Severe,
}

impl ColorBand {
    pub const ALL: [ColorBand; 5] = [
        ColorBand::Low,
        ColorBand::Moderate,
        ColorBand::Elevated,
        ColorBand::High,
        ColorBand::Severe,
    ];

    /// Half-open intensity range `[lower, upper)`; the last band includes 1.0.
    pub fn range(self) -> (f64, f64) {
        (BOUNDS[self.index()], BOUNDS[self.index() + 1])
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Band edges.
const BOUNDS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

pub const BLUE: Rgb = Rgb::new(74, 144, 226);
pub const GREEN: Rgb = Rgb::new(46, 204, 113);
pub const GOLD: Rgb = Rgb::new(255, 215, 0);
pub const ORANGE: Rgb = Rgb::new(255, 140, 0);
pub const RED: Rgb = Rgb::new(255, 68, 68);
pub const DEEP_RED: Rgb = Rgb::new(178, 34, 34);

/// Band base colors followed by the terminal stop.
const STOPS: [Rgb; 6] = [BLUE, GREEN, GOLD, ORANGE, RED, DEEP_RED];

/// Deterministic intensity → color mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorScale;

impl ColorScale {
    /// Band containing `intensity`. Out-of-range and NaN inputs are clamped.
    pub fn band(&self, intensity: f64) -> ColorBand {
        let i = sanitize(intensity);
        let idx = BOUNDS[1..BOUNDS.len() - 1]
            .iter()
            .filter(|&&edge| i >= edge)
            .count();
        ColorBand::ALL[idx]
    }

    /// Color for `intensity`.
    pub fn color(&self, intensity: f64) -> Rgb {
        let i = sanitize(intensity);
        let band = self.band(i);
        let (lower, upper) = band.range();
        let t = (i - lower) / (upper - lower);
        STOPS[band.index()].lerp(STOPS[band.index() + 1], t)
    }
}

fn sanitize(intensity: f64) -> f64 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}
