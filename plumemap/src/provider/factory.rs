//! Centralized weather provider construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::http::AsyncHttpClient;
use super::nws::NwsProvider;
use super::open_meteo::OpenMeteoProvider;
use super::types::WeatherProvider;

/// Which upstream weather service to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Open-Meteo, global coverage.
    #[default]
    OpenMeteo,
    /// US National Weather Service grid points.
    Nws,
}

impl ProviderKind {
    /// Configuration identifier for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenMeteo => "open-meteo",
            ProviderKind::Nws => "nws",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open-meteo" | "openmeteo" | "open_meteo" => Ok(ProviderKind::OpenMeteo),
            "nws" | "weather.gov" => Ok(ProviderKind::Nws),
            other => Err(format!(
                "Unknown weather provider '{}'. Valid providers: open-meteo, nws",
                other
            )),
        }
    }
}

/// Creates weather providers sharing one HTTP client.
///
/// # Example
///
/// ```ignore
/// use plumemap::provider::{AsyncReqwestClient, ProviderFactory, ProviderKind};
///
/// let factory = ProviderFactory::new(AsyncReqwestClient::new()?);
/// let provider = factory.create(ProviderKind::Nws);
/// ```
pub struct ProviderFactory<C> {
    http_client: C,
}

impl<C: AsyncHttpClient + Clone + 'static> ProviderFactory<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Creates a provider of the requested kind.
    pub fn create(&self, kind: ProviderKind) -> Arc<dyn WeatherProvider> {
        tracing::debug!(provider = %kind, "Creating weather provider");
        match kind {
            ProviderKind::OpenMeteo => Arc::new(OpenMeteoProvider::new(self.http_client.clone())),
            ProviderKind::Nws => Arc::new(NwsProvider::new(self.http_client.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    #[test]
    fn test_kind_parse() {
        assert_eq!("open-meteo".parse::<ProviderKind>(), Ok(ProviderKind::OpenMeteo));
        assert_eq!("Open_Meteo".parse::<ProviderKind>(), Ok(ProviderKind::OpenMeteo));
        assert_eq!(" NWS ".parse::<ProviderKind>(), Ok(ProviderKind::Nws));
        assert!("bing".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in [ProviderKind::OpenMeteo, ProviderKind::Nws] {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_factory_creates_named_providers() {
        let factory = ProviderFactory::new(MockAsyncHttpClient::new());
        assert_eq!(factory.create(ProviderKind::OpenMeteo).name(), "Open-Meteo");
        assert_eq!(factory.create(ProviderKind::Nws).name(), "NWS");
    }
}
