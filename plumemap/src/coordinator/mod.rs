//! Weather acquisition for location selections.
//!
//! Each selection is issued a [`RequestToken`] from a monotonically
//! increasing generation counter. A result is applied only while its token is
//! still the newest one, so a slow answer for an earlier click can never
//! overwrite the weather of a later click (last request wins).
//!
//! ```text
//!  begin(loc) ──► Fetching ──► fetch ──► complete ──┬─► Resolved   (provider ok)
//!                   │                               ├─► FellBack   (error / timeout)
//!                   │                               └─► Stale      (superseded, ignored)
//!  begin(loc') ─────┘ cancels the in-flight request
//! ```
//!
//! Provider failures never leave weather undefined: the configured fallback
//! snapshot is applied instead.
//!
//! # Example
//!
//! ```ignore
//! let coordinator = WeatherFetchCoordinator::new(provider, CoordinatorConfig::default());
//! let mut states = coordinator.subscribe();
//!
//! let (token, handle) = coordinator.select_location(Location::new(39.83, -98.58));
//! let outcome = handle.await?;
//! ```

mod config;
mod status;

pub use config::{CoordinatorConfig, DEFAULT_FETCH_TIMEOUT};
pub use status::{
    AppliedWeather, FetchError, FetchOutcome, FetchState, RequestToken, WeatherSource,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::geo::Location;
use crate::provider::{ProviderError, WeatherProvider};
use crate::weather::WeatherSnapshot;

/// Mutable selection state. Guarded by a single lock so that issuing a new
/// token and applying a result never interleave.
#[derive(Default)]
struct Selection {
    in_flight: Option<(u64, CancellationToken)>,
    applied: Option<AppliedWeather>,
}

struct Inner {
    provider: Arc<dyn WeatherProvider>,
    config: CoordinatorConfig,
    generation: AtomicU64,
    selection: Mutex<Selection>,
    state_tx: watch::Sender<FetchState>,
}

/// Resolves weather for the current selection with last-request-wins
/// semantics. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WeatherFetchCoordinator {
    inner: Arc<Inner>,
}

impl WeatherFetchCoordinator {
    pub fn new(provider: Arc<dyn WeatherProvider>, config: CoordinatorConfig) -> Self {
        let (state_tx, _) = watch::channel(FetchState::Idle);
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                generation: AtomicU64::new(0),
                selection: Mutex::new(Selection::default()),
                state_tx,
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn provider_name(&self) -> &str {
        self.inner.provider.name()
    }

    /// Observes state transitions.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state_tx.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> FetchState {
        self.inner.state_tx.borrow().clone()
    }

    /// Id of the newest request, 0 before the first selection.
    pub fn current_request_id(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Weather applied for the newest completed selection.
    pub fn current(&self) -> Option<AppliedWeather> {
        self.inner.selection.lock().applied.clone()
    }

    /// Applied snapshot. Never `None` once any request has completed.
    pub fn current_weather(&self) -> Option<WeatherSnapshot> {
        self.inner.selection.lock().applied.as_ref().map(|a| a.weather)
    }

    /// Starts a new selection, superseding any request in flight.
    pub fn begin(&self, location: Location) -> RequestToken {
        let location = location.clamped();
        let cancellation = CancellationToken::new();

        let token = {
            let mut selection = self.inner.selection.lock();
            let id = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            if let Some((previous, cancel)) = selection.in_flight.replace((id, cancellation)) {
                tracing::debug!(superseded = previous, by = id, "Cancelling superseded weather request");
                cancel.cancel();
            }
            let token = RequestToken { id, location };
            self.inner.state_tx.send_replace(FetchState::Fetching(token));
            token
        };

        tracing::info!(
            request = token.id,
            %location,
            provider = self.inner.provider.name(),
            "Weather fetch dispatched"
        );
        token
    }

    /// Calls the provider for `token`, bounded by the configured timeout.
    ///
    /// Returns [`FetchError::Superseded`] as soon as a newer request begins.
    pub async fn fetch(&self, token: &RequestToken) -> Result<WeatherSnapshot, FetchError> {
        let cancellation = {
            let selection = self.inner.selection.lock();
            match &selection.in_flight {
                Some((id, cancel)) if *id == token.id => cancel.clone(),
                _ => return Err(FetchError::Superseded(token.id)),
            }
        };

        let timeout = self.inner.config.timeout;
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => Err(FetchError::Superseded(token.id)),

            result = tokio::time::timeout(timeout, self.inner.provider.fetch(token.location)) => {
                match result {
                    Ok(Ok(weather)) => Ok(weather),
                    Ok(Err(e)) => Err(FetchError::Provider(e)),
                    Err(_) => Err(FetchError::Provider(ProviderError::Timeout(
                        timeout.as_millis() as u64,
                    ))),
                }
            }
        }
    }

    /// Applies a fetch result if `token` is still the newest request.
    pub fn complete(
        &self,
        token: &RequestToken,
        result: Result<WeatherSnapshot, FetchError>,
    ) -> FetchOutcome {
        let mut selection = self.inner.selection.lock();

        if self.inner.generation.load(Ordering::Acquire) != token.id {
            tracing::debug!(request = token.id, "Discarding stale weather result");
            return FetchOutcome::Stale;
        }

        let (outcome, source, state) = match result {
            Ok(weather) => {
                let weather = weather.sanitized();
                (
                    FetchOutcome::Resolved(weather),
                    WeatherSource::Provider {
                        name: self.inner.provider.name().to_string(),
                    },
                    FetchState::Resolved(*token),
                )
            }
            Err(FetchError::Superseded(_)) => {
                tracing::debug!(request = token.id, "Weather request cancelled");
                return FetchOutcome::Stale;
            }
            Err(FetchError::Provider(e)) => {
                let reason = e.to_string();
                tracing::warn!(
                    request = token.id,
                    location = %token.location,
                    provider = self.inner.provider.name(),
                    reason = %reason,
                    "Weather provider failed, applying fallback"
                );
                (
                    FetchOutcome::FellBack {
                        weather: self.inner.config.fallback,
                        reason: reason.clone(),
                    },
                    WeatherSource::Fallback {
                        reason: reason.clone(),
                    },
                    FetchState::FellBack {
                        request: *token,
                        reason,
                    },
                )
            }
        };

        if let Some(weather) = outcome.weather() {
            selection.applied = Some(AppliedWeather {
                request: *token,
                weather: *weather,
                source,
                applied_at: Utc::now(),
            });
        }
        selection.in_flight = None;
        self.inner.state_tx.send_replace(state);

        tracing::info!(request = token.id, outcome = ?outcome, "Weather applied");
        outcome
    }

    /// Begins, fetches and completes a selection inline.
    pub async fn resolve(&self, location: Location) -> (RequestToken, FetchOutcome) {
        let token = self.begin(location);
        let result = self.fetch(&token).await;
        let outcome = self.complete(&token, result);
        (token, outcome)
    }

    /// Begins a selection and runs the fetch on the tokio runtime.
    pub fn select_location(&self, location: Location) -> (RequestToken, JoinHandle<FetchOutcome>) {
        let token = self.begin(location);
        let coordinator = self.clone();
        let handle = tokio::spawn(async move {
            let result = coordinator.fetch(&token).await;
            coordinator.complete(&token, result)
        });
        (token, handle)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::provider::{MockAsyncHttpClient, OpenMeteoProvider, WeatherFuture};
    use crate::stability::StabilityClass;

    /// Provider answering after a per-location delay.
    struct StubProvider<F> {
        respond: F,
    }

    impl<F> WeatherProvider for StubProvider<F>
    where
        F: Fn(Location) -> (Duration, Result<WeatherSnapshot, ProviderError>) + Send + Sync,
    {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch(&self, location: Location) -> WeatherFuture<'_> {
            let (delay, result) = (self.respond)(location);
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                result
            })
        }
    }

    fn stub<F>(respond: F) -> Arc<dyn WeatherProvider>
    where
        F: Fn(Location) -> (Duration, Result<WeatherSnapshot, ProviderError>) + Send + Sync + 'static,
    {
        Arc::new(StubProvider { respond })
    }

    /// Weather whose wind speed encodes the requested latitude.
    fn weather_for(location: Location) -> WeatherSnapshot {
        WeatherSnapshot::with_wind(location.lat.abs(), 180.0, StabilityClass::B)
    }

    const FIRST: Location = Location { lat: 10.0, lon: 20.0 };
    const SECOND: Location = Location { lat: 30.0, lon: 40.0 };

    #[tokio::test]
    async fn test_provider_failure_applies_exact_fallback() {
        let http = MockAsyncHttpClient::new()
            .with_error("open-meteo", ProviderError::Http("connection refused".into()));
        let provider: Arc<dyn WeatherProvider> = Arc::new(OpenMeteoProvider::new(http));
        let coordinator = WeatherFetchCoordinator::new(provider, CoordinatorConfig::default());

        let (token, outcome) = coordinator.resolve(FIRST).await;

        let fallback = WeatherSnapshot::fallback();
        assert_eq!(outcome.weather(), Some(&fallback));
        assert_eq!(fallback.wind_speed_mph, 6.5);
        assert_eq!(fallback.wind_direction_deg, 270.0);
        assert_eq!(fallback.temperature_f, 70.0);
        assert_eq!(fallback.humidity_pct, 70.0);
        assert_eq!(fallback.pressure_inhg, 29.92);
        assert_eq!(fallback.stability, StabilityClass::D);
        assert_eq!(coordinator.current_weather(), Some(fallback));
        assert!(matches!(
            coordinator.state(),
            FetchState::FellBack { request, .. } if request == token
        ));
        assert!(matches!(
            coordinator.current().map(|a| a.source),
            Some(WeatherSource::Fallback { .. })
        ));
    }

    #[tokio::test]
    async fn test_provider_success_is_applied() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::ZERO, Ok(weather_for(loc)))),
            CoordinatorConfig::default(),
        );

        let (token, outcome) = coordinator.resolve(SECOND).await;

        assert_eq!(outcome, FetchOutcome::Resolved(weather_for(SECOND)));
        assert_eq!(coordinator.state(), FetchState::Resolved(token));
        let applied = coordinator.current().unwrap();
        assert_eq!(applied.request.location, SECOND);
        assert_eq!(
            applied.source,
            WeatherSource::Provider {
                name: "stub".into()
            }
        );
    }

    #[tokio::test]
    async fn test_out_of_order_completion_discards_older_request() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::ZERO, Ok(weather_for(loc)))),
            CoordinatorConfig::default(),
        );

        let first = coordinator.begin(FIRST);
        let second = coordinator.begin(SECOND);
        assert!(second.id > first.id);

        let outcome = coordinator.complete(&second, Ok(weather_for(SECOND)));
        assert_eq!(outcome, FetchOutcome::Resolved(weather_for(SECOND)));

        let outcome = coordinator.complete(&first, Ok(weather_for(FIRST)));
        assert_eq!(outcome, FetchOutcome::Stale);

        assert_eq!(coordinator.current_weather(), Some(weather_for(SECOND)));
        assert_eq!(coordinator.current().unwrap().request.location, SECOND);
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_fall_back() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::ZERO, Ok(weather_for(loc)))),
            CoordinatorConfig::default(),
        );

        let first = coordinator.begin(FIRST);
        let second = coordinator.begin(SECOND);
        coordinator.complete(&second, Ok(weather_for(SECOND)));
        let outcome = coordinator.complete(
            &first,
            Err(FetchError::Provider(ProviderError::Http("late".into()))),
        );

        assert!(outcome.is_stale());
        assert_eq!(coordinator.current_weather(), Some(weather_for(SECOND)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_selections_apply_only_the_latest() {
        // The first location answers slowly, the second quickly.
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| {
                let delay = if loc == FIRST {
                    Duration::from_secs(5)
                } else {
                    Duration::from_millis(100)
                };
                (delay, Ok(weather_for(loc)))
            }),
            CoordinatorConfig::default(),
        );

        let (_, first) = coordinator.select_location(FIRST);
        // Let the first request reach the provider before the second click.
        tokio::task::yield_now().await;
        let (second_token, second) = coordinator.select_location(SECOND);

        let second = second.await.unwrap();
        let first = first.await.unwrap();

        assert_eq!(second, FetchOutcome::Resolved(weather_for(SECOND)));
        assert_eq!(first, FetchOutcome::Stale);
        assert_eq!(coordinator.current_weather(), Some(weather_for(SECOND)));
        assert_eq!(coordinator.state(), FetchState::Resolved(second_token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::from_secs(60), Ok(weather_for(loc)))),
            CoordinatorConfig::default().with_timeout(Duration::from_secs(10)),
        );

        let (_, outcome) = coordinator.resolve(FIRST).await;

        match outcome {
            FetchOutcome::FellBack { weather, reason } => {
                assert_eq!(weather, WeatherSnapshot::fallback());
                assert!(reason.contains("Timed out after 10000 ms"), "{}", reason);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_fetching_then_result() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::ZERO, Ok(weather_for(loc)))),
            CoordinatorConfig::default(),
        );
        let mut states = coordinator.subscribe();
        assert_eq!(*states.borrow(), FetchState::Idle);

        let token = coordinator.begin(FIRST);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), FetchState::Fetching(token));

        let result = coordinator.fetch(&token).await;
        coordinator.complete(&token, result);
        states.changed().await.unwrap();
        assert_eq!(*states.borrow(), FetchState::Resolved(token));
    }

    #[tokio::test]
    async fn test_fetch_for_superseded_token_short_circuits() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|loc| (Duration::ZERO, Ok(weather_for(loc)))),
            CoordinatorConfig::default(),
        );
        let first = coordinator.begin(FIRST);
        coordinator.begin(SECOND);

        assert_eq!(
            coordinator.fetch(&first).await,
            Err(FetchError::Superseded(first.id))
        );
    }

    #[tokio::test]
    async fn test_sanitizes_provider_weather() {
        let coordinator = WeatherFetchCoordinator::new(
            stub(|_| {
                (
                    Duration::ZERO,
                    Ok(WeatherSnapshot {
                        wind_speed_mph: -3.0,
                        wind_direction_deg: 450.0,
                        ..WeatherSnapshot::fallback()
                    }),
                )
            }),
            CoordinatorConfig::default(),
        );

        let (_, outcome) = coordinator.resolve(FIRST).await;
        let w = outcome.weather().copied().unwrap();
        assert_eq!(w.wind_speed_mph, 0.0);
        assert_eq!(w.wind_direction_deg, 90.0);
    }
}
