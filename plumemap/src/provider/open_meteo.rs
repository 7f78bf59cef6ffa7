//! Open-Meteo current-conditions provider.
//!
//! Direct coordinate query against the free Open-Meteo forecast API. No API
//! key or authentication required; global coverage.
//!
//! # URL Pattern
//!
//! `https://api.open-meteo.com/v1/forecast?latitude={lat}&longitude={lon}&current=...&wind_speed_unit=ms`
//!
//! # Units
//!
//! - Wind speed: m/s (requested explicitly)
//! - Temperature: °C
//! - Surface pressure: hPa
//! - Cloud cover / humidity: %

use serde::Deserialize;

use crate::geo::Location;
use crate::provider::{AsyncHttpClient, ProviderError, RawObservation, WeatherFuture, WeatherProvider};
use crate::units;

/// Base URL for the Open-Meteo forecast endpoint.
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Variables requested in the `current` block.
const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,surface_pressure,cloud_cover,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    surface_pressure: Option<f64>,
    cloud_cover: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

impl From<CurrentBlock> for RawObservation {
    fn from(c: CurrentBlock) -> Self {
        RawObservation {
            wind_speed_ms: c.wind_speed_10m,
            wind_from_deg: c.wind_direction_10m,
            temperature_f: c.temperature_2m.map(units::celsius_to_fahrenheit),
            humidity_pct: c.relative_humidity_2m,
            pressure_pa: c.surface_pressure.map(units::mb_to_pa),
            sky_cover_pct: c.cloud_cover,
        }
    }
}

/// Open-Meteo weather provider.
///
/// # Example
///
/// ```ignore
/// use plumemap::provider::{AsyncReqwestClient, OpenMeteoProvider, WeatherProvider};
///
/// let provider = OpenMeteoProvider::new(AsyncReqwestClient::new()?);
/// let weather = provider.fetch(Location::new(39.83, -98.58)).await?;
/// ```
pub struct OpenMeteoProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> OpenMeteoProvider<C> {
    /// Creates a provider against the public endpoint.
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, OPEN_METEO_BASE_URL)
    }

    /// Creates a provider against a custom endpoint (self-hosted instance).
    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Builds the query URL for the given location.
    fn build_url(&self, location: Location) -> String {
        format!(
            "{}?latitude={:.4}&longitude={:.4}&current={}&wind_speed_unit=ms&temperature_unit=celsius",
            self.base_url, location.lat, location.lon, CURRENT_VARIABLES
        )
    }

    async fn fetch_snapshot(
        &self,
        location: Location,
    ) -> Result<crate::weather::WeatherSnapshot, ProviderError> {
        let url = self.build_url(location.clamped());
        let body = self.http_client.get(&url).await?;
        let response: ForecastResponse = serde_json::from_slice(&body)?;
        let current = response
            .current
            .ok_or(ProviderError::MissingField("current"))?;
        RawObservation::from(current).normalize()
    }
}

impl<C: AsyncHttpClient> WeatherProvider for OpenMeteoProvider<C> {
    fn name(&self) -> &str {
        "Open-Meteo"
    }

    fn fetch(&self, location: Location) -> WeatherFuture<'_> {
        Box::pin(self.fetch_snapshot(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;
    use crate::stability::StabilityClass;

    fn sample_response() -> &'static str {
        r#"{
            "latitude": 39.83,
            "longitude": -98.58,
            "current": {
                "time": "2025-06-01T12:00",
                "temperature_2m": 20.0,
                "relative_humidity_2m": 45,
                "surface_pressure": 1013.25,
                "cloud_cover": 10,
                "wind_speed_10m": 4.4704,
                "wind_direction_10m": 270
            }
        }"#
    }

    #[test]
    fn test_provider_name() {
        let provider = OpenMeteoProvider::new(MockAsyncHttpClient::new());
        assert_eq!(provider.name(), "Open-Meteo");
    }

    #[test]
    fn test_url_construction() {
        let provider = OpenMeteoProvider::new(MockAsyncHttpClient::new());
        let url = provider.build_url(Location::new(39.8283, -98.5795));
        assert!(url.starts_with(
            "https://api.open-meteo.com/v1/forecast?latitude=39.8283&longitude=-98.5795"
        ));
        assert!(url.contains("wind_speed_unit=ms"));
        assert!(url.contains("cloud_cover"));
    }

    #[tokio::test]
    async fn test_fetch_converts_to_snapshot_units() {
        let client = MockAsyncHttpClient::new().with_route("open-meteo.com", sample_response());
        let provider = OpenMeteoProvider::new(client);

        let w = provider.fetch(Location::new(39.83, -98.58)).await.unwrap();
        assert!((w.wind_speed_mph - 10.0).abs() < 0.01);
        assert_eq!(w.wind_direction_deg, 270.0);
        assert!((w.temperature_f - 68.0).abs() < 1e-9);
        assert_eq!(w.humidity_pct, 45.0);
        assert!((w.pressure_inhg - 29.92).abs() < 0.01);
        // Clear sky, 10 mph
        assert_eq!(w.stability, StabilityClass::C);
    }

    #[tokio::test]
    async fn test_fetch_missing_current_block() {
        let client = MockAsyncHttpClient::new().with_route("open-meteo.com", r#"{"latitude": 1}"#);
        let provider = OpenMeteoProvider::new(client);

        let result = provider.fetch(Location::new(1.0, 2.0)).await;
        assert_eq!(result, Err(ProviderError::MissingField("current")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let client = MockAsyncHttpClient::new().with_route("open-meteo.com", "<html>");
        let provider = OpenMeteoProvider::new(client);

        let result = provider.fetch(Location::new(1.0, 2.0)).await;
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_network_error() {
        let client = MockAsyncHttpClient::new().with_error(
            "open-meteo.com",
            ProviderError::Http("Connection refused".to_string()),
        );
        let provider = OpenMeteoProvider::new(client);

        match provider.fetch(Location::new(1.0, 2.0)).await {
            Err(ProviderError::Http(msg)) => assert!(msg.contains("Connection refused")),
            other => panic!("Expected HttpError, got {:?}", other),
        }
    }
}
