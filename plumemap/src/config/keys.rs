//! Addressable `section.key` configuration settings.

use std::path::PathBuf;
use std::str::FromStr;

use crate::logging;
use crate::provider::ProviderKind;

use super::file::{ConfigError, ConfigFile};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    WeatherProvider,
    WeatherTimeoutSecs,
    WeatherUserAgent,
    ModelBaseUrl,
    ModelTimeoutSecs,
    GeometryProjectionHours,
    GeometryRingIntervalHours,
    GeometryMarkerBaseRadiusPx,
    GeometryMarkerRadiusSpanPx,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::WeatherProvider,
            ConfigKey::WeatherTimeoutSecs,
            ConfigKey::WeatherUserAgent,
            ConfigKey::ModelBaseUrl,
            ConfigKey::ModelTimeoutSecs,
            ConfigKey::GeometryProjectionHours,
            ConfigKey::GeometryRingIntervalHours,
            ConfigKey::GeometryMarkerBaseRadiusPx,
            ConfigKey::GeometryMarkerRadiusSpanPx,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::WeatherProvider
            | ConfigKey::WeatherTimeoutSecs
            | ConfigKey::WeatherUserAgent => "weather",
            ConfigKey::ModelBaseUrl | ConfigKey::ModelTimeoutSecs => "model",
            ConfigKey::GeometryProjectionHours
            | ConfigKey::GeometryRingIntervalHours
            | ConfigKey::GeometryMarkerBaseRadiusPx
            | ConfigKey::GeometryMarkerRadiusSpanPx => "geometry",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::WeatherProvider => "provider",
            ConfigKey::WeatherTimeoutSecs | ConfigKey::ModelTimeoutSecs => "timeout_secs",
            ConfigKey::WeatherUserAgent => "user_agent",
            ConfigKey::ModelBaseUrl => "base_url",
            ConfigKey::GeometryProjectionHours => "projection_hours",
            ConfigKey::GeometryRingIntervalHours => "ring_interval_hours",
            ConfigKey::GeometryMarkerBaseRadiusPx => "marker_base_radius_px",
            ConfigKey::GeometryMarkerRadiusSpanPx => "marker_radius_span_px",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::WeatherProvider => config.weather.provider.to_string(),
            ConfigKey::WeatherTimeoutSecs => config.weather.timeout_secs.to_string(),
            ConfigKey::WeatherUserAgent => config.weather.user_agent.clone(),
            ConfigKey::ModelBaseUrl => config.model.base_url.clone(),
            ConfigKey::ModelTimeoutSecs => config.model.timeout_secs.to_string(),
            ConfigKey::GeometryProjectionHours => config.geometry.projection_hours.to_string(),
            ConfigKey::GeometryRingIntervalHours => {
                config.geometry.ring_interval_hours.to_string()
            }
            ConfigKey::GeometryMarkerBaseRadiusPx => {
                config.geometry.marker_base_radius_px.to_string()
            }
            ConfigKey::GeometryMarkerRadiusSpanPx => {
                config.geometry.marker_radius_span_px.to_string()
            }
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validates and stores `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::WeatherProvider => {
                config.weather.provider =
                    ProviderKind::from_str(value).map_err(|reason| self.invalid(value, reason))?;
            }
            ConfigKey::WeatherTimeoutSecs => {
                config.weather.timeout_secs = self.parse_secs(value)?;
            }
            ConfigKey::WeatherUserAgent => {
                if value.is_empty() {
                    return Err(self.invalid(value, "user agent cannot be empty"));
                }
                config.weather.user_agent = value.to_string();
            }
            ConfigKey::ModelBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "expected an http:// or https:// URL"));
                }
                config.model.base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::ModelTimeoutSecs => {
                config.model.timeout_secs = self.parse_secs(value)?;
            }
            ConfigKey::GeometryProjectionHours => {
                config.geometry.projection_hours = self.parse_positive(value)?;
            }
            ConfigKey::GeometryRingIntervalHours => {
                config.geometry.ring_interval_hours = self.parse_positive(value)?;
            }
            ConfigKey::GeometryMarkerBaseRadiusPx => {
                config.geometry.marker_base_radius_px = self.parse_non_negative(value)?;
            }
            ConfigKey::GeometryMarkerRadiusSpanPx => {
                config.geometry.marker_radius_span_px = self.parse_non_negative(value)?;
            }
            ConfigKey::LoggingLevel => {
                if !logging::is_valid_level(value) {
                    return Err(self.invalid(
                        value,
                        format!("expected one of {}", logging::LOG_LEVELS.join(", ")),
                    ));
                }
                config.logging.level = value.to_ascii_lowercase();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_secs(&self, value: &str) -> Result<u64, ConfigError> {
        match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(self.invalid(value, "expected a whole number of seconds greater than 0")),
        }
    }

    fn parse_positive(&self, value: &str) -> Result<f64, ConfigError> {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
            _ => Err(self.invalid(value, "expected a number greater than 0")),
        }
    }

    fn parse_non_negative(&self, value: &str) -> Result<f64, ConfigError> {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(self.invalid(value, "expected a number of 0 or more")),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
