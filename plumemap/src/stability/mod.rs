//! Pasquill-Gifford atmospheric stability.
//!
//! Stability class drives how quickly a release spreads sideways. Unstable
//! air (A) mixes vigorously and produces a wide corridor; stable air (F)
//! suppresses lateral mixing and produces a narrow one.
//!
//! # Growth table
//!
//! | Class | Description         | Growth coefficient |
//! |-------|---------------------|--------------------|
//! | A     | Very unstable       | 0.20               |
//! | B     | Unstable            | 0.15               |
//! | C     | Slightly unstable   | 0.12               |
//! | D     | Neutral             | 0.09               |
//! | E     | Slightly stable     | 0.06               |
//! | F     | Stable              | 0.04               |
//!
//! The coefficient is the fraction of downwind travel distance used as the
//! corridor half-width at the source end.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::units;

/// Pasquill-Gifford stability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum StabilityClass {
    A,
    B,
    C,
    /// Neutral. Used whenever the class is unknown.
    #[default]
    D,
    E,
    F,
}

impl StabilityClass {
    /// All classes from most unstable to most stable.
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Lateral growth coefficient for this class.
    pub fn growth_coefficient(self) -> f64 {
        match self {
            StabilityClass::A => 0.20,
            StabilityClass::B => 0.15,
            StabilityClass::C => 0.12,
            StabilityClass::D => 0.09,
            StabilityClass::E => 0.06,
            StabilityClass::F => 0.04,
        }
    }

    /// Single-letter label.
    pub fn as_str(self) -> &'static str {
        match self {
            StabilityClass::A => "A",
            StabilityClass::B => "B",
            StabilityClass::C => "C",
            StabilityClass::D => "D",
            StabilityClass::E => "E",
            StabilityClass::F => "F",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            StabilityClass::A => "very unstable",
            StabilityClass::B => "unstable",
            StabilityClass::C => "slightly unstable",
            StabilityClass::D => "neutral",
            StabilityClass::E => "slightly stable",
            StabilityClass::F => "stable",
        }
    }

    /// Parses a class letter, falling back to neutral (D) for anything
    /// unrecognised.
    pub fn parse_or_neutral(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a stability class letter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stability class '{0}' (expected A-F)")]
pub struct UnknownStabilityClass(pub String);

impl FromStr for StabilityClass {
    type Err = UnknownStabilityClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(StabilityClass::A),
            "B" => Ok(StabilityClass::B),
            "C" => Ok(StabilityClass::C),
            "D" => Ok(StabilityClass::D),
            "E" => Ok(StabilityClass::E),
            "F" => Ok(StabilityClass::F),
            _ => Err(UnknownStabilityClass(s.to_string())),
        }
    }
}

/// Payloads carry anything from `"B"` to `"d"` to `"1/2"` or a bare number;
/// whatever is not a class letter deserializes as neutral (D).
impl<'de> Deserialize<'de> for StabilityClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClassVisitor;

        impl Visitor<'_> for ClassVisitor {
            type Value = StabilityClass;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a stability class letter")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(StabilityClass::parse_or_neutral(v))
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
                Ok(StabilityClass::default())
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
                Ok(StabilityClass::default())
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Ok(StabilityClass::default())
            }
        }

        deserializer.deserialize_any(ClassVisitor)
    }
}

/// Growth coefficient for an optional class; missing means neutral (D).
#[inline]
pub fn growth_coefficient(class: Option<StabilityClass>) -> f64 {
    class.unwrap_or_default().growth_coefficient()
}

/// Sky cover below this percentage counts as clear.
const CLEAR_SKY_MAX_PCT: f64 = 30.0;

/// Sky cover at or above this percentage counts as overcast.
const OVERCAST_MIN_PCT: f64 = 70.0;

/// Derives a stability class from surface wind and sky cover.
///
/// Used only when a provider reports raw sky cover instead of a classified
/// letter. `wind_speed_ms` is in meters per second, `sky_cover_pct` in
/// `[0, 100]`. Non-finite inputs are treated as calm / half cover.
///
/// | Sky cover     | Wind (mph)                         |
/// |---------------|------------------------------------|
/// | clear <30%    | <4 A, <8 B, <13 C, else D          |
/// | partly        | <6 B, <11 C, else D                |
/// | overcast ≥70% | <15 D, else E                      |
pub fn classify(wind_speed_ms: f64, sky_cover_pct: f64) -> StabilityClass {
    let wind_ms = if wind_speed_ms.is_finite() { wind_speed_ms.max(0.0) } else { 0.0 };
    let cover = if sky_cover_pct.is_finite() { sky_cover_pct } else { 50.0 };
    let mph = units::ms_to_mph(wind_ms);

    if cover < CLEAR_SKY_MAX_PCT {
        if mph < 4.0 {
            StabilityClass::A
        } else if mph < 8.0 {
            StabilityClass::B
        } else if mph < 13.0 {
            StabilityClass::C
        } else {
            StabilityClass::D
        }
    } else if cover < OVERCAST_MIN_PCT {
        if mph < 6.0 {
            StabilityClass::B
        } else if mph < 11.0 {
            StabilityClass::C
        } else {
            StabilityClass::D
        }
    } else if mph < 15.0 {
        StabilityClass::D
    } else {
        StabilityClass::E
    }
}
