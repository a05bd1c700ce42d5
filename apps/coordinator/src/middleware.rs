// [apps/coordinator/src/middleware.rs]
//! Perimeter guards applied ahead of every route.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// Rejects every request with `503` while the coordinator is in
/// maintenance mode, grounded on the teacher's `health_guard` gate.
pub async fn health_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Err(reason) = state.is_operational() {
        warn!(reason = %reason, "rejecting request: coordinator in maintenance mode");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "MAINTENANCE", "reason": reason })),
        )
            .into_response();
    }
    next.run(req).await
}
