//! Weather provider trait, errors, and the shared normalization step.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::geo::Location;
use crate::stability::{self, StabilityClass};
use crate::units;
use crate::weather::WeatherSnapshot;

/// Relative humidity assumed when a provider omits it.
pub const DEFAULT_HUMIDITY_PCT: f64 = 70.0;

/// Errors that can occur while talking to an external provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Payload could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Payload decoded but lacked a required field.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// Provider did not answer within the allotted time.
    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

/// Boxed future returned by [`WeatherProvider::fetch`].
pub type WeatherFuture<'a> =
    Pin<Box<dyn Future<Output = Result<WeatherSnapshot, ProviderError>> + Send + 'a>>;

/// A source of current surface weather for a location.
///
/// Dyn-compatible so a coordinator can hold `Arc<dyn WeatherProvider>` and
/// swap sources at runtime.
pub trait WeatherProvider: Send + Sync {
    /// Returns the human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetches and normalizes weather for `location`.
    fn fetch(&self, location: Location) -> WeatherFuture<'_>;
}

/// Provider-agnostic observation in SI-ish units, before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawObservation {
    pub wind_speed_ms: Option<f64>,
    pub wind_from_deg: Option<f64>,
    pub temperature_f: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_pa: Option<f64>,
    pub sky_cover_pct: Option<f64>,
}

impl RawObservation {
    /// Converts into a [`WeatherSnapshot`].
    ///
    /// Wind speed, wind direction and temperature are required. Humidity and
    /// pressure fall back to 70% and standard atmosphere. Stability is derived
    /// from wind and sky cover, or neutral when sky cover is unknown.
    pub fn normalize(self) -> Result<WeatherSnapshot, ProviderError> {
        let wind_ms = finite(self.wind_speed_ms).ok_or(ProviderError::MissingField("wind speed"))?;
        let wind_from =
            finite(self.wind_from_deg).ok_or(ProviderError::MissingField("wind direction"))?;
        let temperature_f =
            finite(self.temperature_f).ok_or(ProviderError::MissingField("temperature"))?;

        let wind_ms = wind_ms.max(0.0);
        let humidity = finite(self.humidity_pct).unwrap_or(DEFAULT_HUMIDITY_PCT);
        let pressure_pa = finite(self.pressure_pa).unwrap_or(units::STANDARD_PRESSURE_PA);
        let stability = finite(self.sky_cover_pct)
            .map(|cover| stability::classify(wind_ms, cover))
            .unwrap_or(StabilityClass::D);

        Ok(WeatherSnapshot {
            wind_speed_mph: units::ms_to_mph(wind_ms),
            wind_direction_deg: wind_from.rem_euclid(360.0),
            temperature_f,
            humidity_pct: humidity.clamp(0.0, 100.0),
            pressure_inhg: units::pa_to_inhg(pressure_pa),
            stability,
        })
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
