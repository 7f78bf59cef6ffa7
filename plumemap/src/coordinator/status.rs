//! Request tokens, fetch states and outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::geo::Location;
use crate::provider::ProviderError;
use crate::weather::WeatherSnapshot;

/// Identifies one location selection.
///
/// Ids increase monotonically per coordinator. Only the most recently issued
/// token may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestToken {
    pub id: u64,
    pub location: Location,
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.location)
    }
}

/// Lifecycle of the current selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A provider call is outstanding for this request.
    Fetching(RequestToken),
    /// Provider weather was applied.
    Resolved(RequestToken),
    /// The fallback snapshot was applied.
    FellBack { request: RequestToken, reason: String },
}

impl FetchState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, FetchState::Fetching(_))
    }

    /// Request the state refers to, if any.
    pub fn request(&self) -> Option<&RequestToken> {
        match self {
            FetchState::Idle => None,
            FetchState::Fetching(request) | FetchState::Resolved(request) => Some(request),
            FetchState::FellBack { request, .. } => Some(request),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Fetching(_) => "fetching",
            FetchState::Resolved(_) => "resolved",
            FetchState::FellBack { .. } => "fell back",
        }
    }
}

/// Why a fetch produced no provider weather.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("request {0} was superseded")]
    Superseded(u64),
}

/// Where applied weather came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WeatherSource {
    Provider { name: String },
    Fallback { reason: String },
}

/// Weather currently applied to the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedWeather {
    pub request: RequestToken,
    pub weather: WeatherSnapshot,
    pub source: WeatherSource,
    pub applied_at: DateTime<Utc>,
}

/// Result of completing a request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Provider weather was applied.
    Resolved(WeatherSnapshot),
    /// The provider failed; the fallback was applied.
    FellBack {
        weather: WeatherSnapshot,
        reason: String,
    },
    /// A newer request exists; nothing was applied.
    Stale,
}

impl FetchOutcome {
    /// Weather that was applied, or `None` for a stale result.
    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        match self {
            FetchOutcome::Resolved(weather) | FetchOutcome::FellBack { weather, .. } => {
                Some(weather)
            }
            FetchOutcome::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, FetchOutcome::Stale)
    }
}
