// [apps/coordinator/src/handlers/audit.rs]
//! `POST /audit/publish` (spec.md §6, §4.11) — assembles the immutable
//! audit trail once a case is finalized and resolved, pins it, and
//! files an `AUD-` box on the ledger.

use axum::extract::{Query, State};
use axum::Json;
use tracing::{instrument, warn};
use whistlechain_domain_models::{AuditRecord, AuditTxReferences, EvidenceId};

use crate::error::CoordinatorError;
use crate::handlers::verification::EvidenceIdQuery;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn publish(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<AuditRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    let evidence = state.submissions.get(&evidence_id)?;
    let session = state.verification.get(&evidence_id)?;
    let resolution = state.resolution.get(&evidence_id)?;

    let tx_references = AuditTxReferences {
        submission_tx_id: evidence.submission_tx_id.clone(),
        verification_tx_id: None,
        finalize_tx_id: None,
        resolution_tx_id: resolution.ledger_tx_id.clone(),
        publish_tx_id: None,
        audit_summary_tx_id: None,
    };

    let record = state
        .audit
        .publish(&evidence, &session, &resolution, &state.inspectors, tx_references)?;

    let payload = serde_json::to_vec(&record)
        .map_err(|e| CoordinatorError::Validation(format!("could not serialize audit record: {e}")))?;
    match state.ledger.publish(&evidence_id, &payload).await {
        Ok(_) => {}
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "audit publish ledger call failed");
        }
    }

    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn get_audit(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<AuditRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    Ok(Json(state.audit.get(&evidence_id)?))
}

#[instrument(skip(state))]
pub async fn list_audit(State(state): State<AppState>) -> Json<Vec<AuditRecord>> {
    Json(state.audit.all())
}
