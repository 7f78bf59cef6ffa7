//! Weather provider abstraction
//!
//! This module provides the [`WeatherProvider`] trait and implementations
//! that resolve current surface weather for a coordinate from public APIs
//! (Open-Meteo, US National Weather Service).
//!
//! Every provider normalizes its payload through [`RawObservation`] so the
//! rest of the engine only ever sees a [`WeatherSnapshot`](crate::weather::WeatherSnapshot)
//! in display units with a derived stability class.
//!
//! # Factory Pattern
//!
//! ```ignore
//! use plumemap::provider::{AsyncReqwestClient, ProviderFactory, ProviderKind};
//!
//! let factory = ProviderFactory::new(AsyncReqwestClient::new()?);
//! let provider = factory.create(ProviderKind::OpenMeteo);
//! let weather = provider.fetch(location).await?;
//! ```

mod factory;
mod http;
mod nws;
mod open_meteo;
mod types;

pub use factory::{ProviderFactory, ProviderKind};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use nws::{NwsProvider, NWS_BASE_URL};
pub use open_meteo::{OpenMeteoProvider, OPEN_METEO_BASE_URL};
pub use types::{
    ProviderError, RawObservation, WeatherFuture, WeatherProvider, DEFAULT_HUMIDITY_PCT,
};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
