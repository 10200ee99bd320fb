//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use solar_dash::access::{
    ApiService, Entropy, LatencyProfile, NetworkSimulator, OperationTimings, RecordingSink,
    ScriptedEntropy, SeededEntropy,
};
use solar_dash::cache::{KeyValueStore, MemoryStore, PanelCache};
use solar_dash::fixtures::StaticFixtures;

/// Fixed seed shared by the statistical tests.
pub const SEED: u64 = 42;

/// Default latency window (300–1500 ms) and 10% failure rate.
pub fn default_profile() -> LatencyProfile {
    LatencyProfile::default()
}

/// Zero latency with a configurable failure rate.
pub fn instant_profile(error_rate: f64) -> LatencyProfile {
    LatencyProfile {
        error_rate,
        ..LatencyProfile::instant()
    }
}

/// Builds a service over static fixtures and the given store, recording
/// every status event.
pub fn build_service(
    profile: LatencyProfile,
    entropy: impl Entropy + 'static,
    store: Arc<dyn KeyValueStore>,
) -> (ApiService, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let service = ApiService::new(
        Arc::new(StaticFixtures),
        NetworkSimulator::new(profile, entropy),
        PanelCache::new(store),
        sink.clone(),
    );
    (service, sink)
}

/// Seeded service with default latency over an in-memory store.
pub fn seeded_service(seed: u64) -> (ApiService, Arc<RecordingSink>) {
    build_service(
        default_profile(),
        SeededEntropy::from_seed(seed),
        Arc::new(MemoryStore::new()),
    )
}

/// Service whose every call succeeds after a mid-window delay (900 ms).
pub fn reliable_service() -> (ApiService, Arc<RecordingSink>) {
    build_service(
        default_profile(),
        ScriptedEntropy::new([0.5]),
        Arc::new(MemoryStore::new()),
    )
}

/// Default maintenance (1.5 s) and optimization (3.5 s) delays.
pub fn default_timings() -> OperationTimings {
    OperationTimings {
        maintenance_delay: Duration::from_millis(1500),
        optimize_delay: Duration::from_millis(3500),
    }
}
