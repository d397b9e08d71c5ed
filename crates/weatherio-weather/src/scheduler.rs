//! Periodic trigger for [`RefreshCycle`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::refresh::{RefreshCycle, RefreshOutcome};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Fires a refresh cycle every `period` until cancelled.
///
/// A tick that lands while a cycle is still running is skipped by the cycle
/// itself. Failed cycles are logged and retried on the next tick only.
pub struct RefreshScheduler {
    cycle: Arc<RefreshCycle>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(cycle: Arc<RefreshCycle>, period: Duration) -> Self {
        Self { cycle, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `cancel` fires, then wait for the in-flight cycle to finish.
    /// The first cycle runs immediately.
    pub async fn run(self, cancel: CancellationToken) {
        let tracker = TaskTracker::new();
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Weather refresh scheduled every {} minutes",
            self.period.as_secs() / 60
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let cycle = self.cycle.clone();
                    tracker.spawn(async move { Self::trigger(&cycle).await });
                }
            }
        }

        tracker.close();
        tracker.wait().await;
        tracing::info!("Weather refresh scheduler stopped");
    }

    async fn trigger(cycle: &RefreshCycle) {
        match cycle.run().await {
            Ok(RefreshOutcome::Completed(_)) => {}
            Ok(RefreshOutcome::Skipped) => tracing::debug!("Scheduled refresh skipped"),
            Err(e) => tracing::warn!("Scheduled refresh failed, next attempt on schedule: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::cache::{MemoryStore, SnapshotCache};
    use crate::geocode::Geocoder;
    use crate::location::FixedGeolocation;
    use crate::provider::WeatherSource;
    use crate::types::{
        Coordinates, Location, PollutantSnapshot, TelemetrySnapshot, WeatherError,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for CountingSource {
        async fn resolve_by_coordinates(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<Option<Location>, WeatherError> {
            Ok(None)
        }

        async fn resolve_by_query(&self, _query: &str) -> Result<Vec<Location>, WeatherError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl WeatherSource for CountingSource {
        async fn fetch_current_and_forecast(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<TelemetrySnapshot, WeatherError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Err(WeatherError::Parse("offline".into()))
        }

        async fn fetch_pollutants(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<PollutantSnapshot, WeatherError> {
            Ok(PollutantSnapshot::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycles_retry_on_next_tick() {
        let source = Arc::new(CountingSource::default());
        let cycle = Arc::new(RefreshCycle::new(
            Arc::new(FixedGeolocation::new(Some(Coordinates::new(1.0, 2.0)))),
            source.clone(),
            source.clone(),
            SnapshotCache::new(Arc::new(MemoryStore::new())),
        ));

        let cancel = CancellationToken::new();
        let scheduler = RefreshScheduler::new(cycle, DEFAULT_REFRESH_PERIOD);
        let handle = tokio::spawn(scheduler.run(cancel.clone()));

        // ticks at 0, 15 and 30 minutes
        tokio::time::sleep(Duration::from_secs(31 * 60)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    }
}
