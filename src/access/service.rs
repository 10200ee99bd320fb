//! The simulated backend the dashboard talks to.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::error::AccessError;
use super::latency::NetworkSimulator;
use super::signal::{Operation, StatusEvent, StatusSink};
use crate::cache::{MaintenanceUpdate, PanelCache};
use crate::fixtures::FixtureProvider;
use crate::model::{ConsumptionSample, EnvironmentalImpact, ForecastSample, MicrogridState, Panel};

/// Fixed latencies of the mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimings {
    pub maintenance_delay: Duration,
    pub optimize_delay: Duration,
}

impl Default for OperationTimings {
    fn default() -> Self {
        Self {
            maintenance_delay: Duration::from_millis(1500),
            optimize_delay: Duration::from_millis(3500),
        }
    }
}

/// Simulated remote access layer.
///
/// Wraps a [`FixtureProvider`] with random latency, random failure, a panel
/// cache and per-call status signals. Concurrent calls run independently;
/// two overlapping `get_panels` misses both hit the network and the one that
/// finishes last wins the cache.
pub struct ApiService {
    fixtures: Arc<dyn FixtureProvider>,
    network: NetworkSimulator,
    cache: PanelCache,
    sink: Arc<dyn StatusSink>,
    timings: OperationTimings,
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("network", &self.network)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl ApiService {
    pub fn new(
        fixtures: Arc<dyn FixtureProvider>,
        network: NetworkSimulator,
        cache: PanelCache,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            fixtures,
            network,
            cache,
            sink,
            timings: OperationTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: OperationTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn cache(&self) -> &PanelCache {
        &self.cache
    }

    /// Emits `Started` and crosses the network, emitting `Failed` on error.
    ///
    /// On success the caller emits `Succeeded` once its result is in place.
    async fn begin(&self, op: Operation) -> Result<(), AccessError> {
        self.sink.emit(StatusEvent::started(op));
        self.network.round_trip().await.inspect_err(|e| {
            self.sink.emit(StatusEvent::failed(op, e));
        })
    }

    /// Runs one uncached fetch: delay, failure draw, then fixture data.
    async fn fetch<T>(
        &self,
        op: Operation,
        produce: impl FnOnce(&dyn FixtureProvider) -> T,
    ) -> Result<T, AccessError> {
        self.begin(op).await?;
        let value = produce(self.fixtures.as_ref());
        self.sink.emit(StatusEvent::succeeded(op));
        Ok(value)
    }

    /// Today's 24 hourly samples. Never cached.
    pub async fn get_consumption(&self) -> Result<Vec<ConsumptionSample>, AccessError> {
        self.fetch(Operation::Consumption, |f| f.daily_consumption())
            .await
    }

    /// The 7-day forecast. Never cached.
    pub async fn get_forecast(&self) -> Result<Vec<ForecastSample>, AccessError> {
        self.fetch(Operation::Forecast, |f| f.week_forecast()).await
    }

    pub async fn get_environmental_impact(&self) -> Result<EnvironmentalImpact, AccessError> {
        self.fetch(Operation::EnvironmentalImpact, |f| f.environmental_impact())
            .await
    }

    pub async fn get_microgrid_state(&self) -> Result<MicrogridState, AccessError> {
        self.fetch(Operation::Microgrid, |f| f.microgrid_state())
            .await
    }

    /// All panels. Served from the cache when present, with no delay and no
    /// failure risk; otherwise fetched and written to the cache before
    /// `Succeeded` goes out.
    pub async fn get_panels(&self) -> Result<Vec<Panel>, AccessError> {
        if let Some(panels) = self.cache.load() {
            debug!(count = panels.len(), "panel cache hit");
            self.sink.emit(StatusEvent::started(Operation::Panels));
            self.sink.emit(StatusEvent::succeeded(Operation::Panels));
            return Ok(panels);
        }

        self.begin(Operation::Panels).await?;
        let panels = self.fixtures.panels();
        self.cache.store(&panels);
        self.sink.emit(StatusEvent::succeeded(Operation::Panels));
        Ok(panels)
    }

    /// Moves a panel's next maintenance to `date`.
    ///
    /// Takes a fixed delay and never fails. Only the cached copy is rewritten;
    /// with no cache present this is a successful no-op.
    pub async fn schedule_maintenance(
        &self,
        panel_id: &str,
        date: &str,
    ) -> Result<(), AccessError> {
        let op = Operation::ScheduleMaintenance;
        self.sink.emit(StatusEvent::started_with(
            op,
            format!("Scheduling maintenance for panel {panel_id}..."),
        ));
        tokio::time::sleep(self.timings.maintenance_delay).await;

        match self.cache.update_maintenance(panel_id, date) {
            MaintenanceUpdate::Updated => info!(panel_id, date, "maintenance rescheduled"),
            MaintenanceUpdate::NoCache => debug!(panel_id, "no panel cache, nothing to update"),
            MaintenanceUpdate::UnknownPanel => debug!(panel_id, "panel not in cache"),
        }

        self.sink.emit(StatusEvent::succeeded_with(
            op,
            format!("Maintenance scheduled for {date}"),
        ));
        Ok(())
    }

    /// Runs the (cosmetic) microgrid optimization. Has no effect on state.
    pub async fn optimize_microgrid(&self) -> Result<(), AccessError> {
        let op = Operation::OptimizeMicrogrid;
        self.sink.emit(StatusEvent::started(op));
        tokio::time::sleep(self.timings.optimize_delay).await;
        self.sink.emit(StatusEvent::succeeded(op));
        Ok(())
    }

    /// Drops the cached panel list so the next `get_panels` goes to the network.
    pub fn invalidate_panels(&self) {
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::latency::{LatencyProfile, ScriptedEntropy};
    use crate::access::signal::{RecordingSink, Signal};
    use crate::cache::MemoryStore;
    use crate::fixtures::StaticFixtures;

    fn service(draws: Vec<f64>) -> (ApiService, RecordingSink) {
        let sink = RecordingSink::new();
        let svc = ApiService::new(
            Arc::new(StaticFixtures),
            NetworkSimulator::new(LatencyProfile::default(), ScriptedEntropy::new(draws)),
            PanelCache::new(Arc::new(MemoryStore::new())),
            Arc::new(sink.clone()),
        );
        (svc, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_emits_started_then_failed() {
        let (svc, sink) = service(vec![0.0, 0.0]);
        let err = svc.get_forecast().await.expect_err("draw below error rate");
        assert!(err.is_retryable());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_started());
        assert!(events[1].is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_panel_fetch_leaves_cache_empty() {
        let (svc, _) = service(vec![0.0, 0.0]);
        assert!(svc.get_panels().await.is_err());
        assert!(svc.cache().load().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn maintenance_signals_carry_panel_and_date() {
        let (svc, sink) = service(vec![0.5]);
        svc.schedule_maintenance("panel-3", "2025-09-01")
            .await
            .expect("maintenance never fails");
        let events = sink.events();
        assert_eq!(
            events[0].signal,
            Signal::Started {
                message: "Scheduling maintenance for panel panel-3...".to_string(),
            }
        );
        assert_eq!(
            events[1].signal,
            Signal::Succeeded {
                message: "Maintenance scheduled for 2025-09-01".to_string(),
            }
        );
    }

    /// Records whether the panel cache was populated when each panel
    /// `Succeeded` arrived.
    struct CacheCheckingSink {
        cache: PanelCache,
        seen: parking_lot::Mutex<Vec<bool>>,
    }

    impl StatusSink for CacheCheckingSink {
        fn emit(&self, event: StatusEvent) {
            if event.operation == Operation::Panels && event.is_succeeded() {
                self.seen.lock().push(self.cache.load().is_some());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panel_success_is_signalled_after_the_cache_write() {
        let cache = PanelCache::new(Arc::new(MemoryStore::new()));
        let sink = Arc::new(CacheCheckingSink {
            cache: cache.clone(),
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let svc = ApiService::new(
            Arc::new(StaticFixtures),
            NetworkSimulator::new(LatencyProfile::default(), ScriptedEntropy::new([0.5])),
            cache,
            sink.clone(),
        );

        svc.get_panels().await.expect("fetch");
        assert_eq!(*sink.seen.lock(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_network_fetch() {
        let (svc, sink) = service(vec![0.5]);
        svc.get_panels().await.expect("first fetch");
        svc.invalidate_panels();
        sink.clear();

        let start = tokio::time::Instant::now();
        svc.get_panels().await.expect("second fetch");
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
