// [apps/coordinator/src/handlers/publication.rs]
//! `POST /publication/publish`, `/schedule`, `/cancel` and
//! `GET /publication/due` (spec.md §6, §4.12).

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;
use whistlechain_domain_models::{EvidenceId, PublicationRecord};
use whistlechain_publication::PublishRequest;

use crate::error::CoordinatorError;
use crate::handlers::verification::EvidenceIdQuery;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn publish(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<PublicationRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    let evidence = state.submissions.get(&evidence_id)?;
    let session = state.verification.get(&evidence_id)?;
    let verdict = session
        .final_verdict
        .ok_or_else(|| CoordinatorError::State(format!("evidence {evidence_id} has not been finalized")))?;

    let record = state.publication.publish_all(PublishRequest {
        evidence_id: &evidence_id,
        category: evidence.category,
        organization: &evidence.target_organization,
        description: &evidence.description,
        content_id: &evidence.content_id,
        verdict,
    })?;

    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub evidence_id: String,
    pub delay_seconds: i64,
}

#[instrument(skip(state))]
pub async fn schedule(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Json<PublicationRecord> {
    let evidence_id = EvidenceId::from(request.evidence_id);
    Json(state.publication.schedule(&evidence_id, request.delay_seconds))
}

#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<PublicationRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    state.publication.cancel(&evidence_id)?;
    Ok(Json(state.publication.get(&evidence_id)?))
}

#[instrument(skip(state))]
pub async fn due(State(state): State<AppState>) -> Json<Vec<PublicationRecord>> {
    Json(state.publication.due())
}

#[instrument(skip(state))]
pub async fn get_publication(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<PublicationRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    Ok(Json(state.publication.get(&evidence_id)?))
}
