//! Simulated remote access layer.
//!
//! Stands in for a real backend: every call is delayed, may fail, and
//! reports its progress through a [`StatusSink`].

pub mod error;
pub mod latency;
pub mod service;
pub mod signal;

pub use error::AccessError;
pub use latency::{Entropy, LatencyProfile, NetworkSimulator, ScriptedEntropy, SeededEntropy};
pub use service::{ApiService, OperationTimings};
pub use signal::{
    BroadcastSink, FanoutSink, Operation, RecordingSink, Signal, SignalTally, StatusEvent,
    StatusSink, TracingSink,
};
