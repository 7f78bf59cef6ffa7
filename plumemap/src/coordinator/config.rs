//! Coordinator configuration.

use std::time::Duration;

use crate::weather::WeatherSnapshot;

/// Provider answers slower than this are abandoned in favour of the fallback.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`WeatherFetchCoordinator`](super::WeatherFetchCoordinator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    /// Snapshot applied when the provider fails or times out.
    pub fallback: WeatherSnapshot,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            fallback: WeatherSnapshot::fallback(),
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback: WeatherSnapshot) -> Self {
        self.fallback = fallback.sanitized();
        self
    }
}
