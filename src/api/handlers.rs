//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::AppState;
use super::types::{
    AckResponse, ErrorResponse, LoadingResponse, MaintenanceRequest, SessionResponse,
};
use crate::access::AccessError;
use crate::auth::{GateState, TracingNavigator};
use crate::model::{ConsumptionSample, EnvironmentalImpact, ForecastSample, MicrogridState, Panel};
use crate::report::SystemReport;

/// Access-layer failures become `503` with the error message; clients decide
/// whether to retry.
pub struct ApiError(AccessError);

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Re-evaluates the gate against the latest session report.
fn evaluate_gate(state: &AppState) -> (GateState, String) {
    let status = *state.sessions.borrow();
    let mut gate = state.gate.lock();
    let gate_state = gate.observe(status, &TracingNavigator);
    (gate_state, gate.sign_in_path().to_string())
}

/// Route guard in front of every data endpoint.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (gate_state, sign_in_path) = evaluate_gate(&state);
    match gate_state {
        GateState::Unknown => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
            Json(LoadingResponse { status: "loading" }),
        )
            .into_response(),
        GateState::Unauthenticated => Redirect::to(&sign_in_path).into_response(),
        GateState::Authenticated => next.run(request).await,
    }
}

/// `GET /session` → 200 + gate state and latest session report.
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let (gate, _) = evaluate_gate(&state);
    Json(SessionResponse {
        gate,
        session: *state.sessions.borrow(),
    })
}

pub async fn get_consumption(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ConsumptionSample>> {
    Ok(Json(state.service.get_consumption().await?))
}

pub async fn get_forecast(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ForecastSample>> {
    Ok(Json(state.service.get_forecast().await?))
}

pub async fn get_panels(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Panel>> {
    Ok(Json(state.service.get_panels().await?))
}

pub async fn get_environmental_impact(
    State(state): State<Arc<AppState>>,
) -> ApiResult<EnvironmentalImpact> {
    Ok(Json(state.service.get_environmental_impact().await?))
}

pub async fn get_microgrid_state(State(state): State<Arc<AppState>>) -> ApiResult<MicrogridState> {
    Ok(Json(state.service.get_microgrid_state().await?))
}

/// `POST /panels/{id}/maintenance` with `{"date": "YYYY-MM-DD"}`.
///
/// An empty date is rejected with `400` before the access layer is called.
pub async fn schedule_maintenance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<MaintenanceRequest>,
) -> Response {
    let date = body.date.trim();
    if date.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "`date` must not be empty".to_string(),
            }),
        )
            .into_response();
    }
    match state.service.schedule_maintenance(&id, date).await {
        Ok(()) => Json(AckResponse {
            message: format!("Maintenance scheduled for {date}"),
        })
        .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn optimize_microgrid(State(state): State<Arc<AppState>>) -> ApiResult<AckResponse> {
    state.service.optimize_microgrid().await?;
    Ok(Json(AckResponse {
        message: "Microgrid optimized. Efficiency improved by 8%".to_string(),
    }))
}

/// `GET /report` fetches consumption, panels, impact and microgrid state
/// concurrently; any failure fails the whole report.
pub async fn get_report(State(state): State<Arc<AppState>>) -> ApiResult<SystemReport> {
    let (consumption, panels, impact, microgrid) = tokio::try_join!(
        state.service.get_consumption(),
        state.service.get_panels(),
        state.service.get_environmental_impact(),
        state.service.get_microgrid_state(),
    )?;
    Ok(Json(SystemReport::build(&consumption, &panels, &impact, &microgrid)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::access::RecordingSink;
    use crate::api::router;
    use crate::auth::{AuthGate, SimulatedIdentity};
    use crate::config::DashboardConfig;

    fn make_test_state(identity: &SimulatedIdentity) -> Arc<AppState> {
        let service = DashboardConfig::instant().build_service(Arc::new(RecordingSink::new()));
        Arc::new(AppState::new(service, AuthGate::new("/sign-in"), identity.subscribe()))
    }

    async fn get(state: Arc<AppState>, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router(state).oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn unresolved_session_returns_loading() {
        let identity = SimulatedIdentity::new();
        let resp = get(make_test_state(&identity), "/panels").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "loading");
    }

    #[tokio::test]
    async fn signed_out_redirects_to_sign_in() {
        let identity = SimulatedIdentity::new();
        identity.sign_out();
        let resp = get(make_test_state(&identity), "/consumption").await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/sign-in");
    }

    #[tokio::test]
    async fn signed_in_reaches_handler() {
        let identity = SimulatedIdentity::new();
        identity.sign_in();
        let resp = get(make_test_state(&identity), "/forecast").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 7);
        assert_eq!(json[0]["day"], "Mon");
    }

    #[tokio::test]
    async fn session_route_is_open() {
        let identity = SimulatedIdentity::new();
        let resp = get(make_test_state(&identity), "/session").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["gate"], "unknown");
        assert_eq!(json["session"]["resolved"], false);
    }

    #[test]
    fn access_error_maps_to_503() {
        let resp = ApiError::from(AccessError::transient()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
