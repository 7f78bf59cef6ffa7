//! Dispersion model output and service client.
//!
//! The physics lives in an external service. This module defines what comes
//! back from it ([`ModelResult`], [`GridPoint`]) and how to ask for it
//! ([`DispersionModelClient`]).
//!
//! Grid points arrive in one of two shapes, offset based or absolute. The
//! shape is inferred per point by [`GridPoint::representation`]; points that
//! fit neither are reported as [`InvalidGridPoint`] and never guessed.

mod client;
mod types;

pub use client::{
    DispersionModelClient, ModelClientConfig, DEFAULT_MODEL_BASE_URL, DEFAULT_MODEL_TIMEOUT_SECS,
    GRID_CROSSWIND_M, GRID_DOWNWIND_M,
};
pub use types::{
    EmissionParams, GridPoint, GridRepresentation, GridResult, InvalidGridPoint, ModelError,
    ModelKind, ModelResult, ModelRunParams,
};
