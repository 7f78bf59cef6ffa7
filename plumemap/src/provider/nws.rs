//! US National Weather Service (api.weather.gov) grid-point provider.
//!
//! The NWS API is organised around a forecast grid. Resolving weather for a
//! coordinate takes three requests:
//!
//! 1. `/points/{lat},{lon}` resolves the forecast office and grid cell
//! 2. `/gridpoints/{office}/{x},{y}` returns raw gridded layers (wind,
//!    humidity, sky cover, pressure) as time series with a unit of measure
//! 3. `/gridpoints/{office}/{x},{y}/forecast/hourly` returns the hourly
//!    forecast, whose first period supplies the current temperature
//!
//! # Coverage
//!
//! United States and territories only. Points outside coverage answer 404,
//! which surfaces as [`ProviderError::Status`].

use serde::Deserialize;

use crate::geo::Location;
use crate::provider::{AsyncHttpClient, ProviderError, RawObservation, WeatherFuture, WeatherProvider};
use crate::units;
use crate::weather::WeatherSnapshot;

/// Base URL for the NWS API.
pub const NWS_BASE_URL: &str = "https://api.weather.gov";

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    grid_id: String,
    grid_x: i64,
    grid_y: i64,
}

#[derive(Debug, Deserialize)]
struct GridpointResponse {
    properties: GridpointProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridpointProperties {
    wind_speed: Option<GridLayer>,
    wind_direction: Option<GridLayer>,
    relative_humidity: Option<GridLayer>,
    sky_cover: Option<GridLayer>,
    pressure: Option<GridLayer>,
}

/// One gridded quantity. NWS publishes a time series under `values`; some
/// proxies flatten it to a single `value`.
#[derive(Debug, Default, Deserialize)]
struct GridLayer {
    uom: Option<String>,
    value: Option<f64>,
    #[serde(default)]
    values: Vec<GridValue>,
}

#[derive(Debug, Deserialize)]
struct GridValue {
    value: Option<f64>,
}

impl GridLayer {
    fn current(&self) -> Option<f64> {
        self.value
            .or_else(|| self.values.iter().find_map(|v| v.value))
    }

    /// Current wind speed converted to m/s according to `uom`.
    fn wind_speed_ms(&self) -> Option<f64> {
        let raw = self.current()?;
        let uom = self.uom.as_deref().unwrap_or("");
        let ms = if uom.contains("km_h") {
            units::kmh_to_ms(raw)
        } else if uom.ends_with(":kt") {
            raw * 1852.0 / units::SECONDS_PER_HOUR
        } else if uom.contains("mi_h") {
            units::mph_to_ms(raw)
        } else {
            raw
        };
        Some(ms)
    }
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    #[serde(default)]
    periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyPeriod {
    temperature: Option<f64>,
    temperature_unit: Option<String>,
}

impl HourlyPeriod {
    fn temperature_f(&self) -> Option<f64> {
        let t = self.temperature?;
        match self.temperature_unit.as_deref() {
            Some("C") => Some(units::celsius_to_fahrenheit(t)),
            _ => Some(t),
        }
    }
}

/// NWS grid-point forecast provider.
pub struct NwsProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> NwsProvider<C> {
    /// Creates a provider against the public NWS API.
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, NWS_BASE_URL)
    }

    /// Creates a provider against a custom endpoint.
    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// NWS accepts at most four decimal places.
    fn points_url(&self, location: Location) -> String {
        format!("{}/points/{:.4},{:.4}", self.base_url, location.lat, location.lon)
    }

    fn gridpoint_url(&self, grid: &PointProperties) -> String {
        format!(
            "{}/gridpoints/{}/{},{}",
            self.base_url, grid.grid_id, grid.grid_x, grid.grid_y
        )
    }

    async fn fetch_snapshot(&self, location: Location) -> Result<WeatherSnapshot, ProviderError> {
        let points_body = self.http_client.get(&self.points_url(location.clamped())).await?;
        let point: PointResponse = serde_json::from_slice(&points_body)?;

        let grid_url = self.gridpoint_url(&point.properties);
        let grid_body = self.http_client.get(&grid_url).await?;
        let grid: GridpointResponse = serde_json::from_slice(&grid_body)?;

        let hourly_body = self
            .http_client
            .get(&format!("{}/forecast/hourly", grid_url))
            .await?;
        let hourly: HourlyResponse = serde_json::from_slice(&hourly_body)?;

        let layers = grid.properties;
        let raw = RawObservation {
            wind_speed_ms: layers.wind_speed.as_ref().and_then(GridLayer::wind_speed_ms),
            wind_from_deg: layers.wind_direction.as_ref().and_then(GridLayer::current),
            temperature_f: hourly
                .properties
                .periods
                .first()
                .and_then(HourlyPeriod::temperature_f),
            humidity_pct: layers.relative_humidity.as_ref().and_then(GridLayer::current),
            pressure_pa: layers.pressure.as_ref().and_then(GridLayer::current),
            sky_cover_pct: layers.sky_cover.as_ref().and_then(GridLayer::current),
        };

        tracing::debug!(
            office = %point.properties.grid_id,
            x = point.properties.grid_x,
            y = point.properties.grid_y,
            "Resolved NWS grid point"
        );

        raw.normalize()
    }
}

impl<C: AsyncHttpClient> WeatherProvider for NwsProvider<C> {
    fn name(&self) -> &str {
        "NWS"
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

    const POINTS: &str = r#"{
        "properties": { "gridId": "GLD", "gridX": 155, "gridY": 34 }
    }"#;

    const GRIDPOINT: &str = r#"{
        "properties": {
            "windSpeed": { "uom": "wmoUnit:km_h-1", "values": [
                { "validTime": "2025-06-01T12:00:00+00:00/PT1H", "value": 16.09344 },
                { "validTime": "2025-06-01T13:00:00+00:00/PT1H", "value": 30.0 }
            ]},
            "windDirection": { "uom": "wmoUnit:degree_(angle)", "values": [
                { "validTime": "2025-06-01T12:00:00+00:00/PT1H", "value": 270 }
            ]},
            "relativeHumidity": { "uom": "wmoUnit:percent", "values": [
                { "validTime": "2025-06-01T12:00:00+00:00/PT1H", "value": 62 }
            ]},
            "skyCover": { "uom": "wmoUnit:percent", "values": [
                { "validTime": "2025-06-01T12:00:00+00:00/PT1H", "value": 85 }
            ]}
        }
    }"#;

    const HOURLY: &str = r#"{
        "properties": { "periods": [
            { "number": 1, "temperature": 77, "temperatureUnit": "F" },
            { "number": 2, "temperature": 75, "temperatureUnit": "F" }
        ]}
    }"#;

    fn full_client() -> MockAsyncHttpClient {
        // More specific fragments first: the hourly URL also contains the
        // gridpoint URL.
        MockAsyncHttpClient::new()
            .with_route("/forecast/hourly", HOURLY)
            .with_route("/gridpoints/GLD/155,34", GRIDPOINT)
            .with_route("/points/", POINTS)
    }

    #[test]
    fn test_points_url_uses_four_decimals() {
        let provider = NwsProvider::new(MockAsyncHttpClient::new());
        assert_eq!(
            provider.points_url(Location::new(39.828312, -98.579512)),
            "https://api.weather.gov/points/39.8283,-98.5795"
        );
    }

    #[test]
    fn test_layer_prefers_flat_value() {
        let layer = GridLayer {
            uom: None,
            value: Some(3.0),
            values: vec![GridValue { value: Some(9.0) }],
        };
        assert_eq!(layer.current(), Some(3.0));
    }

    #[test]
    fn test_layer_wind_units() {
        let kmh = GridLayer {
            uom: Some("wmoUnit:km_h-1".into()),
            value: Some(36.0),
            values: vec![],
        };
        assert!((kmh.wind_speed_ms().unwrap() - 10.0).abs() < 1e-12);

        let ms = GridLayer {
            uom: Some("wmoUnit:m_s-1".into()),
            value: Some(4.0),
            values: vec![],
        };
        assert_eq!(ms.wind_speed_ms(), Some(4.0));
    }

    #[tokio::test]
    async fn test_fetch_follows_three_requests() {
        let client = full_client();
        let provider = NwsProvider::new(client.clone());

        let w = provider.fetch(Location::new(39.8283, -98.5795)).await.unwrap();

        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.weather.gov/points/39.8283,-98.5795".to_string(),
                "https://api.weather.gov/gridpoints/GLD/155,34".to_string(),
                "https://api.weather.gov/gridpoints/GLD/155,34/forecast/hourly".to_string(),
            ]
        );

        // 16.09344 km/h = 10 mph
        assert!((w.wind_speed_mph - 10.0).abs() < 1e-3);
        assert_eq!(w.wind_direction_deg, 270.0);
        assert_eq!(w.temperature_f, 77.0);
        assert_eq!(w.humidity_pct, 62.0);
        // No pressure layer: standard atmosphere
        assert!((w.pressure_inhg - 29.92).abs() < 0.01);
        // Overcast, light wind
        assert_eq!(w.stability, StabilityClass::D);
    }

    #[tokio::test]
    async fn test_missing_wind_is_an_error() {
        let client = MockAsyncHttpClient::new()
            .with_route("/forecast/hourly", HOURLY)
            .with_route("/gridpoints/", r#"{ "properties": {} }"#)
            .with_route("/points/", POINTS);
        let provider = NwsProvider::new(client);

        let result = provider.fetch(Location::new(39.8, -98.5)).await;
        assert_eq!(result, Err(ProviderError::MissingField("wind speed")));
    }

    #[tokio::test]
    async fn test_outside_coverage_is_status_error() {
        let client = MockAsyncHttpClient::new();
        let provider = NwsProvider::new(client);

        let result = provider.fetch(Location::new(51.5, -0.12)).await;
        assert!(matches!(result, Err(ProviderError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_celsius_hourly_period() {
        let hourly_c = r#"{ "properties": { "periods": [
            { "temperature": 25, "temperatureUnit": "C" }
        ]}}"#;
        let client = MockAsyncHttpClient::new()
            .with_route("/forecast/hourly", hourly_c)
            .with_route("/gridpoints/", GRIDPOINT)
            .with_route("/points/", POINTS);
        let provider = NwsProvider::new(client);

        let w = provider.fetch(Location::new(39.8, -98.5)).await.unwrap();
        assert!((w.temperature_f - 77.0).abs() < 1e-9);
    }
}
