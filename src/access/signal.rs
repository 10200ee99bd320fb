//! Progress/status signals emitted once per access-layer call.
//!
//! Each call emits `Started` followed by exactly one of `Succeeded` or
//! `Failed`. The cache-hit fast path emits the pair back to back.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Every operation the access layer exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Consumption,
    Forecast,
    Panels,
    EnvironmentalImpact,
    Microgrid,
    ScheduleMaintenance,
    OptimizeMicrogrid,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Consumption => "get_consumption",
            Operation::Forecast => "get_forecast",
            Operation::Panels => "get_panels",
            Operation::EnvironmentalImpact => "get_environmental_impact",
            Operation::Microgrid => "get_microgrid_state",
            Operation::ScheduleMaintenance => "schedule_maintenance",
            Operation::OptimizeMicrogrid => "optimize_microgrid",
        }
    }

    /// Text shown while the call is in flight.
    pub fn loading_message(self) -> &'static str {
        match self {
            Operation::Consumption => "Analyzing energy consumption...",
            Operation::Forecast => "Generating energy forecasts...",
            Operation::Panels => "Loading solar panel data...",
            Operation::EnvironmentalImpact => "Calculating environmental impact...",
            Operation::Microgrid => "Connecting to microgrid...",
            Operation::ScheduleMaintenance => "Scheduling panel maintenance...",
            Operation::OptimizeMicrogrid => "Running microgrid optimization algorithms...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Operation::Consumption => "Energy consumption data updated",
            Operation::Forecast => "Energy forecast calculated",
            Operation::Panels => "Solar panel data loaded",
            Operation::EnvironmentalImpact => "Environmental impact calculated",
            Operation::Microgrid => "Microgrid connection established",
            Operation::ScheduleMaintenance => "Maintenance scheduled",
            Operation::OptimizeMicrogrid => "Microgrid optimized. Efficiency improved by 8%",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Consumption => "Failed to load consumption data",
            Operation::Forecast => "Failed to load forecast data",
            Operation::Panels => "Failed to load solar panel data",
            Operation::EnvironmentalImpact => "Failed to calculate environmental impact",
            Operation::Microgrid => "Failed to connect to microgrid",
            Operation::ScheduleMaintenance => "Failed to schedule maintenance",
            Operation::OptimizeMicrogrid => "Optimization failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle stage of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Started { message: String },
    Succeeded { message: String },
    Failed { message: String, error: String },
}

/// A signal tagged with the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub operation: Operation,
    #[serde(flatten)]
    pub signal: Signal,
}

impl StatusEvent {
    pub fn started(operation: Operation) -> Self {
        Self::started_with(operation, operation.loading_message())
    }

    pub fn started_with(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            signal: Signal::Started {
                message: message.into(),
            },
        }
    }

    pub fn succeeded(operation: Operation) -> Self {
        Self::succeeded_with(operation, operation.success_message())
    }

    pub fn succeeded_with(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            signal: Signal::Succeeded {
                message: message.into(),
            },
        }
    }

    pub fn failed(operation: Operation, error: impl fmt::Display) -> Self {
        Self {
            operation,
            signal: Signal::Failed {
                message: operation.failure_message().to_string(),
                error: error.to_string(),
            },
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self.signal, Signal::Started { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self.signal, Signal::Succeeded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.signal, Signal::Failed { .. })
    }
}

/// Consumer of status signals, typically a notification surface.
pub trait StatusSink: Send + Sync {
    fn emit(&self, event: StatusEvent);
}

/// Writes every signal to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn emit(&self, event: StatusEvent) {
        let op = event.operation.name();
        match &event.signal {
            Signal::Started { message } => info!(op, "{message}"),
            Signal::Succeeded { message } => info!(op, "{message}"),
            Signal::Failed { message, error } => warn!(op, error = %error, "{message}"),
        }
    }
}

/// Fans signals out to any number of subscribers.
///
/// Emitting with no live subscribers drops the event.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<StatusEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }
}

impl StatusSink for BroadcastSink {
    fn emit(&self, event: StatusEvent) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }
}

/// Outcome counts over the signals waiting on a broadcast receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl SignalTally {
    /// Consumes every event currently queued on `feed`.
    ///
    /// Stops at the first empty, closed or lagged read.
    pub fn drain(feed: &mut broadcast::Receiver<StatusEvent>) -> Self {
        let mut tally = Self::default();
        while let Ok(event) = feed.try_recv() {
            if event.is_succeeded() {
                tally.succeeded += 1;
            } else if event.is_failed() {
                tally.failed += 1;
            }
        }
        tally
    }
}

/// Keeps every signal in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, operation: Operation) -> Vec<StatusEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.operation == operation)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl StatusSink for RecordingSink {
    fn emit(&self, event: StatusEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards each signal to several sinks in order.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn StatusSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn StatusSink>>) -> Self {
        Self { sinks }
    }
}

impl StatusSink for FanoutSink {
    fn emit(&self, event: StatusEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
