//! Persistent configuration.
//!
//! Settings live in an INI file at `<config dir>/plumemap/config.ini`:
//!
//! ```ini
//! [weather]
//! provider = open-meteo
//! timeout_secs = 10
//!
//! [model]
//! base_url = http://localhost:8080/api
//! timeout_secs = 30
//!
//! [geometry]
//! projection_hours = 3
//! ring_interval_hours = 0.5
//! marker_base_radius_px = 8
//! marker_radius_span_px = 20
//!
//! [logging]
//! level = info
//! ```
//!
//! Individual settings are addressed as `section.key` through [`ConfigKey`].

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, ConfigError, ConfigFile, ModelSettings, WeatherSettings,
};
pub use keys::ConfigKey;
