// [apps/coordinator/src/handlers/resolution.rs]
//! `POST /resolution/resolve` (spec.md §6) — turns a finalized verdict
//! into the stake release/forfeit/lock action and marks the
//! submission `RESOLVED`.

use axum::extract::{Query, State};
use axum::Json;
use tracing::instrument;
use whistlechain_domain_models::{EvidenceId, LifecycleStatus, ResolutionRecord};

use crate::error::CoordinatorError;
use crate::handlers::verification::EvidenceIdQuery;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<ResolutionRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    let session = state.verification.get(&evidence_id)?;
    let verdict = session
        .final_verdict
        .ok_or_else(|| CoordinatorError::State(format!("evidence {evidence_id} has not been finalized")))?;

    let record = state
        .resolution
        .resolve(&evidence_id, verdict, &state.submissions, &state.ledger)
        .await?;

    state.submissions.advance_status(&evidence_id, LifecycleStatus::Resolved)?;

    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn get_resolution(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<ResolutionRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    Ok(Json(state.resolution.get(&evidence_id)?))
}
