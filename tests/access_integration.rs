//! Integration tests for the simulated access layer.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use solar_dash::access::error::NETWORK_ERROR_MESSAGE;
use solar_dash::access::{
    AccessError, LatencyProfile, Operation, ScriptedEntropy, SeededEntropy, Signal,
};
use solar_dash::cache::{FileStore, MemoryStore};
use solar_dash::model::{PanelStatus, Weekday};

const MIN_DELAY: Duration = Duration::from_millis(300);
// Timer deadlines round up to the next millisecond.
const MAX_DELAY: Duration = Duration::from_millis(1501);

#[tokio::test(start_paused = true)]
async fn panel_cache_hit_returns_immediately_after_a_delayed_miss() {
    let (service, sink) = common::reliable_service();

    let start = Instant::now();
    let first = service.get_panels().await.expect("miss should fetch");
    let miss = start.elapsed();
    assert!(miss >= MIN_DELAY, "miss took {miss:?}");
    sink.clear();

    let start = Instant::now();
    let second = service.get_panels().await.expect("hit should not fail");
    let hit = start.elapsed();
    assert!(hit < Duration::from_millis(5), "hit took {hit:?}");
    assert_eq!(first, second);

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.operation == Operation::Panels));
    assert!(events[0].is_started());
    assert!(events[1].is_succeeded());
}

#[tokio::test(start_paused = true)]
async fn overlapping_panel_misses_both_pay_the_network_delay() {
    let (service, sink) = common::reliable_service();
    let timed = || async {
        let start = Instant::now();
        let panels = service.get_panels().await;
        (panels, start.elapsed())
    };

    let ((first, first_took), (second, second_took)) = tokio::join!(timed(), timed());
    assert!(first_took >= MIN_DELAY, "first took {first_took:?}");
    assert!(second_took >= MIN_DELAY, "second took {second_took:?}");
    assert_eq!(first.expect("first caller"), second.expect("second caller"));

    let events = sink.events_for(Operation::Panels);
    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().filter(|e| e.is_succeeded()).count(), 2);
    assert!(service.cache().load().is_some());
}

#[tokio::test(start_paused = true)]
async fn uncached_calls_stay_inside_the_latency_window() {
    let (service, _) = common::build_service(
        LatencyProfile {
            error_rate: 0.0,
            ..common::default_profile()
        },
        SeededEntropy::from_seed(common::SEED),
        Arc::new(MemoryStore::new()),
    );

    for _ in 0..50 {
        let start = Instant::now();
        service.get_consumption().await.expect("error rate is zero");
        let elapsed = start.elapsed();
        assert!(
            (MIN_DELAY..=MAX_DELAY).contains(&elapsed),
            "delay {elapsed:?} outside window"
        );
    }
}

#[tokio::test]
async fn failure_rate_converges_to_ten_percent() {
    let (service, sink) = common::build_service(
        common::instant_profile(0.1),
        SeededEntropy::from_seed(common::SEED),
        Arc::new(MemoryStore::new()),
    );

    let mut failures = 0usize;
    for _ in 0..1000 {
        if service.get_forecast().await.is_err() {
            failures += 1;
        }
    }

    let rate = failures as f64 / 1000.0;
    assert!((0.07..=0.13).contains(&rate), "failure rate {rate}");

    let failed_signals = sink.events().iter().filter(|e| e.is_failed()).count();
    assert_eq!(failed_signals, failures);
}

#[tokio::test(start_paused = true)]
async fn every_call_emits_started_then_one_terminal_signal() {
    let (service, sink) = common::seeded_service(common::SEED);

    for _ in 0..20 {
        let _ = service.get_environmental_impact().await;
    }

    let events = sink.events_for(Operation::EnvironmentalImpact);
    assert_eq!(events.len(), 40);
    for pair in events.chunks(2) {
        assert!(pair[0].is_started());
        assert!(pair[1].is_succeeded() || pair[1].is_failed());
    }
}

#[tokio::test(start_paused = true)]
async fn failed_panel_fetch_reports_network_error_and_leaves_cache_empty() {
    // delay draw, then a failure draw below the 10% rate
    let (service, sink) = common::build_service(
        common::default_profile(),
        ScriptedEntropy::new([0.5, 0.05]),
        Arc::new(MemoryStore::new()),
    );

    let err = service.get_panels().await.expect_err("0.05 should fail");
    assert_eq!(err, AccessError::transient());
    assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
    assert!(err.is_retryable());
    assert!(service.cache().load().is_none());

    let events = sink.events_for(Operation::Panels);
    assert_eq!(events.len(), 2);
    match &events[1].signal {
        Signal::Failed { error, .. } => assert_eq!(error, NETWORK_ERROR_MESSAGE),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn scheduling_maintenance_rewrites_the_cached_panel() {
    let (service, sink) = common::reliable_service();
    let service = service.with_timings(common::default_timings());

    let before = service.get_panels().await.expect("fetch");
    let original = before.iter().find(|p| p.id == "panel-5").expect("panel-5");
    assert_eq!(original.status, PanelStatus::Critical);

    let start = Instant::now();
    service
        .schedule_maintenance("panel-5", "2025-08-01")
        .await
        .expect("maintenance never fails");
    assert!(start.elapsed() >= Duration::from_millis(1500));

    let start = Instant::now();
    let after = service.get_panels().await.expect("cache hit");
    assert!(start.elapsed() < Duration::from_millis(5));

    for (old, new) in before.iter().zip(&after) {
        if new.id == "panel-5" {
            assert_eq!(new.next_maintenance, "2025-08-01");
            assert_eq!(new.status, old.status);
            assert_eq!(new.alerts, old.alerts);
        } else {
            assert_eq!(old, new);
        }
    }

    let messages: Vec<_> = sink
        .events_for(Operation::ScheduleMaintenance)
        .into_iter()
        .map(|e| match e.signal {
            Signal::Started { message } | Signal::Succeeded { message } => message,
            Signal::Failed { message, .. } => message,
        })
        .collect();
    assert_eq!(
        messages,
        vec![
            "Scheduling maintenance for panel panel-5...".to_string(),
            "Maintenance scheduled for 2025-08-01".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn scheduling_maintenance_without_cache_is_a_silent_success() {
    let (service, sink) = common::reliable_service();

    service
        .schedule_maintenance("panel-5", "2025-08-01")
        .await
        .expect("maintenance never fails");

    assert!(service.cache().load().is_none());
    let events = sink.events_for(Operation::ScheduleMaintenance);
    assert!(events.last().is_some_and(|e| e.is_succeeded()));
}

#[tokio::test(start_paused = true)]
async fn consumption_and_forecast_arrive_in_order() {
    let (service, _) = common::reliable_service();

    let consumption = service.get_consumption().await.expect("consumption");
    assert_eq!(consumption.len(), 24);
    for (hour, sample) in consumption.iter().enumerate() {
        assert_eq!(sample.timestamp, format!("{hour:02}:00"));
    }

    let forecast = service.get_forecast().await.expect("forecast");
    let days: Vec<Weekday> = forecast.iter().map(|s| s.day).collect();
    assert_eq!(days, Weekday::ALL.to_vec());
}

#[tokio::test(start_paused = true)]
async fn environmental_impact_is_stable_but_never_cached() {
    let (service, _) = common::reliable_service();

    let start = Instant::now();
    let first = service.get_environmental_impact().await.expect("first");
    assert!(start.elapsed() >= MIN_DELAY);

    let start = Instant::now();
    let second = service.get_environmental_impact().await.expect("second");
    assert!(start.elapsed() >= MIN_DELAY);

    assert_eq!(first, second);
    assert!(service.cache().load().is_none());
}

#[tokio::test(start_paused = true)]
async fn optimization_takes_its_delay_and_changes_nothing() {
    let (service, sink) = common::reliable_service();
    let service = service.with_timings(common::default_timings());

    let before = service.get_microgrid_state().await.expect("before");
    let start = Instant::now();
    service.optimize_microgrid().await.expect("optimize");
    assert!(start.elapsed() >= Duration::from_millis(3500));
    let after = service.get_microgrid_state().await.expect("after");

    assert_eq!(before, after);
    let events = sink.events_for(Operation::OptimizeMicrogrid);
    assert_eq!(events.len(), 2);
    assert!(events[1].is_succeeded());
}

#[tokio::test(start_paused = true)]
async fn invalidation_sends_the_next_panel_read_to_the_network() {
    let (service, _) = common::reliable_service();

    service.get_panels().await.expect("warm");
    service.invalidate_panels();
    assert!(service.cache().load().is_none());

    let start = Instant::now();
    service.get_panels().await.expect("refetch");
    assert!(start.elapsed() >= MIN_DELAY);
}

#[tokio::test(start_paused = true)]
async fn file_backed_cache_survives_a_new_service() {
    let dir = tempfile::tempdir().expect("tempdir");

    let (first, _) = common::build_service(
        common::default_profile(),
        ScriptedEntropy::new([0.5]),
        Arc::new(FileStore::new(dir.path())),
    );
    first.get_panels().await.expect("fetch");
    first
        .schedule_maintenance("panel-10", "2025-09-15")
        .await
        .expect("maintenance");
    drop(first);

    // every draw would fail; only the cache can answer
    let (second, _) = common::build_service(
        common::default_profile(),
        ScriptedEntropy::new([0.0]),
        Arc::new(FileStore::new(dir.path())),
    );
    let panels = second.get_panels().await.expect("served from disk");
    let panel = panels
        .iter()
        .find(|p| p.id == "panel-10")
        .expect("panel-10 is listed");
    assert_eq!(panel.next_maintenance, "2025-09-15");
}
