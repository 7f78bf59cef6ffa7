//! INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::coordinator::CoordinatorConfig;
use crate::logging::LoggingConfig;
use crate::model::{ModelClientConfig, DEFAULT_MODEL_BASE_URL, DEFAULT_MODEL_TIMEOUT_SECS};
use crate::provider::{ProviderKind, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::scene::GeometryConfig;

use super::keys::ConfigKey;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[weather]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSettings {
    pub provider: ProviderKind,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[model]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
        }
    }
}

/// Settings persisted in `config.ini`.
///
/// Sections: `[weather]`, `[model]`, `[geometry]`, `[logging]`. Keys absent
/// from the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub weather: WeatherSettings,
    pub model: ModelSettings,
    pub geometry: GeometryConfig,
    pub logging: LoggingConfig,
}

/// Directory holding plumemap configuration.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plumemap")
}

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

impl ConfigFile {
    /// Loads from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Parses INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Saves to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Runtime coordinator settings.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default()
            .with_timeout(std::time::Duration::from_secs(self.weather.timeout_secs))
    }

    /// Runtime model client settings.
    pub fn model_client_config(&self) -> ModelClientConfig {
        ModelClientConfig::default()
            .with_base_url(self.model.base_url.clone())
            .with_timeout_secs(self.model.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.weather.provider = ProviderKind::Nws;
        config.model.base_url = "https://model.example.org/api".to_string();
        config.geometry.projection_hours = 2.0;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::parse(
            "[weather]\nprovider = nws\n\n[geometry]\nring_interval_hours = 1.0\n",
        )
        .unwrap();
        assert_eq!(config.weather.provider, ProviderKind::Nws);
        assert_eq!(config.weather.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.geometry.ring_interval_hours, 1.0);
        assert_eq!(config.geometry.projection_hours, 3.0);
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = ConfigFile::parse("[model]\ntimeout_secs = soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("model.timeout_secs"));
    }

    #[test]
    fn test_runtime_configs() {
        let mut config = ConfigFile::default();
        config.weather.timeout_secs = 4;
        config.model.base_url = "http://10.0.0.2:9000".into();

        assert_eq!(
            config.coordinator_config().timeout,
            std::time::Duration::from_secs(4)
        );
        assert_eq!(config.model_client_config().base_url, "http://10.0.0.2:9000");
    }
}
