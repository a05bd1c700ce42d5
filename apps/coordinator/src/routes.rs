// [apps/coordinator/src/routes.rs]
//! HTTP topology (spec.md §6): one `/api/v1` tree covering wallet
//! issuance, stake policy lookups, evidence submission, the
//! commit-reveal verification surface, resolution, bounty settlement,
//! audit publication, and the public-disclosure channels.

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{audit, bounty, projections, publication, resolution, stake, submission, verification, wallet};
use crate::middleware::health_guard;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let evidence_routes = Router::new()
        .route("/submit", post(submission::submit_evidence))
        .route("/:id", get(submission::get_evidence));

    let verification_routes = Router::new()
        .route("/register-inspector", post(verification::register_inspector))
        .route("/begin", post(verification::begin_verification))
        .route("/commit", post(verification::commit))
        .route("/advance-to-reveal", post(verification::advance_to_reveal))
        .route("/reveal", post(verification::reveal))
        .route("/finalize", post(verification::finalize))
        .route("/status/:id", get(verification::status))
        .route("/cases/:address", get(verification::cases_of));

    let resolution_routes = Router::new()
        .route("/resolve", post(resolution::resolve))
        .route("/", get(resolution::get_resolution));

    let bounty_routes = Router::new()
        .route("/process", post(bounty::process))
        .route("/", get(bounty::get_bounty));

    let audit_routes = Router::new()
        .route("/publish", post(audit::publish))
        .route("/", get(audit::get_audit))
        .route("/all", get(audit::list_audit));

    let publication_routes = Router::new()
        .route("/publish", post(publication::publish))
        .route("/schedule", post(publication::schedule))
        .route("/cancel", post(publication::cancel))
        .route("/due", get(publication::due))
        .route("/", get(publication::get_publication));

    let submission_projections = Router::new()
        .route("/", get(projections::list_submissions))
        .route("/by-wallet/:wallet", get(projections::submissions_by_wallet))
        .route("/by-status", get(projections::submissions_by_status));

    let api = Router::new()
        .route("/wallet/create", post(wallet::create_wallet))
        .route("/stake/info/:category", get(stake::stake_info))
        .nest("/evidence", evidence_routes)
        .nest("/verification", verification_routes)
        .nest("/resolution", resolution_routes)
        .nest("/bounty", bounty_routes)
        .nest("/audit", audit_routes)
        .nest("/publication", publication_routes)
        .nest("/submissions", submission_projections)
        .route("/inspectors", get(projections::list_inspectors))
        .route("/transparency", get(projections::transparency))
        .layer(middleware::from_fn_with_state(state.clone(), health_guard));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
