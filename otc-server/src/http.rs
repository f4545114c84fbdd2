//! HTTP surface of the OTC service.
//!
//! Three routes: `POST /create` (admin-gated issuance), `POST /verify`
//! (open to anyone holding a key/code pair) and `GET /health`. The admin
//! check is an explicit guard at the top of the issuance handler; when it
//! fails, the engine is never touched.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use otc_core::{AdminPolicy, OtcError, OtcManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Header carrying the caller's claimed identity. Authenticating the claim
/// is the job of whatever sits in front of this service; here it is only
/// compared against the configured admin.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OtcManager>,
    pub admin: Arc<dyn AdminPolicy>,
}

/// Build the service router.
///
/// CORS is wide open: the service is called cross-origin by browser
/// clients and carries no cookies.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/create", post(create))
        .route("/verify", post(verify))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub key: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub key: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
}

// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// Issue a code for a key (admin only)
async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRequest>,
) -> Response {
    let claimed = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|value| value.to_str().ok());

    if !state.admin.is_admin(claimed) {
        warn!(
            "Rejected issuance request (identity header {})",
            if claimed.is_some() { "present" } else { "absent" }
        );
        return error_response(StatusCode::UNAUTHORIZED, "Only admin can access this route");
    }

    match state.manager.issue_default(&req.key).await {
        Ok(code) => (StatusCode::OK, Json(CreateResponse { key: req.key, code })).into_response(),
        Err(e) => engine_error(e),
    }
}

// Check a code against a key, consuming it on success
async fn verify(State(state): State<AppState>, Json(req): Json<VerifyRequest>) -> Response {
    match state.manager.verify(&req.key, &req.code).await {
        Ok(success) => (StatusCode::OK, Json(VerifyResponse { success })).into_response(),
        Err(e) => engine_error(e),
    }
}

/// Map engine errors onto the wire. A storage outage is 503, never a quiet
/// `success: false` -- callers must be able to tell the two apart.
fn engine_error(e: OtcError) -> Response {
    let status = match &e {
        OtcError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        OtcError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    if status == StatusCode::SERVICE_UNAVAILABLE {
        warn!("Backing store failure: {}", e);
    }
    error_response(status, &e.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
