//! Solar-installation monitoring backend with a simulated network layer.

/// Simulated remote access layer: latency, failure injection, status signals.
pub mod access;
#[cfg(feature = "api")]
pub mod api;
/// Route-level authorization gate.
pub mod auth;
pub mod cache;
pub mod config;
/// Deterministic fixture data served by the simulated backend.
pub mod fixtures;
pub mod io;
pub mod model;
pub mod observability;
pub mod report;
