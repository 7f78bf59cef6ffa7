//! plumemap - geospatial dispersion visualization engine
//!
//! Turns a weather snapshot, a release location and a dispersion model
//! output grid into geometry a map can draw:
//!
//! - a downwind hazard corridor ([`corridor`])
//! - time-of-arrival rings ([`rings`])
//! - colored concentration markers ([`field`])
//!
//! Weather for a selected location is resolved asynchronously by the
//! [`coordinator`], which talks to a [`provider`] and falls back to a fixed
//! snapshot when the provider fails. Model output comes from an external
//! service through the [`model`] client.
//!
//! All geometry builders are pure: the same inputs always produce the same
//! output, and out-of-range inputs are clamped rather than rejected.

pub mod config;
pub mod coordinator;
pub mod corridor;
pub mod field;
pub mod geo;
pub mod logging;
pub mod model;
pub mod provider;
pub mod render;
pub mod rings;
pub mod scene;
pub mod stability;
pub mod units;
pub mod weather;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
