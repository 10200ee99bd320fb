//! REST API over the simulated access layer.
//!
//! Every data route sits behind the authorization gate:
//! - unresolved session: `503` with a loading placeholder
//! - signed out: `303` redirect to the sign-in path
//! - signed in: the handler runs
//!
//! `GET /session` is left open so clients can poll gate state.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::access::ApiService;
use crate::auth::{AuthGate, SessionStatus};

pub use types::{AckResponse, ErrorResponse, LoadingResponse, MaintenanceRequest, SessionResponse};

/// Application state shared across all request handlers.
pub struct AppState {
    /// Simulated backend.
    pub service: ApiService,
    /// Gate guarding every data route.
    pub gate: Mutex<AuthGate>,
    /// Reports from the identity provider.
    pub sessions: watch::Receiver<SessionStatus>,
}

impl AppState {
    pub fn new(
        service: ApiService,
        gate: AuthGate,
        sessions: watch::Receiver<SessionStatus>,
    ) -> Self {
        Self {
            service,
            gate: Mutex::new(gate),
            sessions,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/consumption", get(handlers::get_consumption))
        .route("/forecast", get(handlers::get_forecast))
        .route("/panels", get(handlers::get_panels))
        .route(
            "/panels/{id}/maintenance",
            post(handlers::schedule_maintenance),
        )
        .route("/environment", get(handlers::get_environmental_impact))
        .route("/microgrid", get(handlers::get_microgrid_state))
        .route("/microgrid/optimize", post(handlers::optimize_microgrid))
        .route("/report", get(handlers::get_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), handlers::require_session));

    Router::new()
        .route("/session", get(handlers::get_session))
        .merge(protected)
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
