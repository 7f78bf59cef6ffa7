//! CLI command implementations.

pub mod common;
pub mod config;
pub mod geometry;
pub mod markers;
pub mod model;
pub mod weather;
