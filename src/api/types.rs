//! API request and response bodies.

use serde::{Deserialize, Serialize};

use crate::auth::{GateState, SessionStatus};

/// Body of `POST /panels/{id}/maintenance`.
#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
}

/// Acknowledgement for mutating routes.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: String,
}

/// Placeholder returned while the session is unresolved.
#[derive(Debug, Serialize)]
pub struct LoadingResponse {
    pub status: &'static str,
}

/// `GET /session` body.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub gate: GateState,
    pub session: SessionStatus,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
