// [apps/coordinator/src/handlers/verification.rs]
//! The commit-reveal HTTP surface (spec.md §6): inspector registration,
//! panel assignment, commit/reveal submission, and finalization. All
//! business rules live in `whistlechain-verification` /
//! `whistlechain-inspector-registry`; this module only maps requests
//! onto those engines and the matching ledger calls.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{instrument, warn};
use whistlechain_domain_models::{Category, EvidenceId, FinalVerdict, Inspector, LifecycleStatus, Verdict, VerificationSession, WalletAddress};
use whistlechain_inspector_registry::NewInspector;

use crate::error::CoordinatorError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterInspectorRequest {
    pub address: String,
    pub display_name: String,
    pub specializations: Vec<String>,
    pub department: String,
    pub employee_id: String,
    pub jurisdiction: String,
    pub experience_years: u32,
}

#[instrument(skip(state))]
pub async fn register_inspector(
    State(state): State<AppState>,
    Json(request): Json<RegisterInspectorRequest>,
) -> Result<Json<Inspector>, CoordinatorError> {
    let specializations = request
        .specializations
        .iter()
        .map(|s| Category::parse(s).ok_or_else(|| CoordinatorError::Validation(format!("unknown category {s}"))))
        .collect::<Result<Vec<Category>, CoordinatorError>>()?;

    let inspector = state.inspectors.register(NewInspector {
        wallet: WalletAddress::from(request.address),
        display_name: request.display_name,
        specializations,
        department: request.department,
        employee_id: request.employee_id,
        jurisdiction: request.jurisdiction,
        experience_years: request.experience_years,
    })?;
    Ok(Json(inspector))
}

#[derive(Deserialize)]
pub struct BeginVerificationRequest {
    pub evidence_id: String,
    pub category: String,
}

#[instrument(skip(state))]
pub async fn begin_verification(
    State(state): State<AppState>,
    Json(request): Json<BeginVerificationRequest>,
) -> Result<Json<VerificationSession>, CoordinatorError> {
    let evidence_id = EvidenceId::from(request.evidence_id);
    let category = Category::parse(&request.category)
        .ok_or_else(|| CoordinatorError::Validation(format!("unknown category {}", request.category)))?;

    let session = state
        .verification
        .begin_verification(&evidence_id, category, &state.inspectors)?;

    match state.ledger.begin_verification(&evidence_id, &session.panel).await {
        Ok(_) => {}
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "begin_verification ledger call failed");
            state.verification.annotate_ledger_error(&evidence_id, err.to_string());
        }
    }
    state
        .submissions
        .advance_status(&evidence_id, LifecycleStatus::UnderVerification)?;

    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct CommitRequest {
    pub evidence_id: String,
    pub inspector_address: String,
    /// Hex-encoded 32-byte `SHA-256(be64(verdict) || nonce)`.
    pub commit_hash: String,
}

#[derive(Serialize)]
pub struct CommitResponse {
    pub auto_advanced_to_reveal: bool,
}

#[instrument(skip(state))]
pub async fn commit(
    State(state): State<AppState>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, CoordinatorError> {
    let evidence_id = EvidenceId::from(request.evidence_id);
    let inspector = WalletAddress::from(request.inspector_address);
    let hash_bytes = hex::decode(&request.commit_hash)
        .map_err(|_| CoordinatorError::Validation("commit_hash must be hex-encoded".into()))?;
    let hash: [u8; 32] = hash_bytes
        .try_into()
        .map_err(|_| CoordinatorError::Validation("commit_hash must be 32 bytes".into()))?;

    let auto_advanced = state
        .verification
        .commit(&evidence_id, &inspector, hash, Utc::now())?;

    match state.ledger.commit(&evidence_id, &inspector, &hash).await {
        Ok(_) => {}
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "commit ledger call failed");
            state.verification.annotate_ledger_error(&evidence_id, err.to_string());
        }
    }

    Ok(Json(CommitResponse {
        auto_advanced_to_reveal: auto_advanced,
    }))
}

#[derive(Deserialize)]
pub struct EvidenceIdQuery {
    pub evidence_id: String,
}

#[instrument(skip(state))]
pub async fn advance_to_reveal(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<VerificationSession>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    state.verification.advance_to_reveal(&evidence_id)?;
    Ok(Json(state.verification.get(&evidence_id)?))
}

#[derive(Deserialize)]
pub struct RevealRequest {
    pub evidence_id: String,
    pub inspector_address: String,
    pub verdict: u8,
    pub nonce: String,
    pub justification_ipfs: String,
}

#[instrument(skip(state, request), fields(evidence_id = %request.evidence_id))]
pub async fn reveal(
    State(state): State<AppState>,
    Json(request): Json<RevealRequest>,
) -> Result<Json<VerificationSession>, CoordinatorError> {
    let evidence_id = EvidenceId::from(request.evidence_id.clone());
    let inspector = WalletAddress::from(request.inspector_address);
    let verdict = Verdict::from_code(request.verdict as u64)
        .ok_or_else(|| CoordinatorError::Validation(format!("verdict must be 1, 2 or 3, got {}", request.verdict)))?;

    state.verification.reveal(
        &evidence_id,
        &inspector,
        verdict,
        &request.nonce,
        &request.justification_ipfs,
        Utc::now(),
    )?;

    match state.ledger.reveal(&evidence_id, &inspector, verdict.code(), &request.nonce).await {
        Ok(_) => {}
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "reveal ledger call failed");
            state.verification.annotate_ledger_error(&evidence_id, err.to_string());
        }
    }

    Ok(Json(state.verification.get(&evidence_id)?))
}

#[instrument(skip(state))]
pub async fn finalize(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<VerificationSession>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    let (session, verdict) = state.verification.finalize(&evidence_id, &state.inspectors)?;

    match state.ledger.finalize(&evidence_id, &verdict.to_string()).await {
        Ok(_) => {}
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "finalize ledger call failed");
            state.verification.annotate_ledger_error(&evidence_id, err.to_string());
        }
    }
    state
        .submissions
        .advance_status(&evidence_id, LifecycleStatus::Finalized { verdict })?;

    Ok(Json(session))
}

#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationSession>, CoordinatorError> {
    Ok(Json(state.verification.get(&EvidenceId::from(id))?))
}

#[derive(Serialize)]
pub struct InspectorCase {
    pub evidence_id: EvidenceId,
    pub committed: bool,
    pub revealed: bool,
    pub revealed_verdict: Option<FinalVerdict>,
}

/// `cases_of(inspector)` (spec.md §4.7), exposed as a read projection
/// so an inspector can see their own assignment history.
#[instrument(skip(state))]
pub async fn cases_of(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<HashMap<String, InspectorCase>> {
    let wallet = WalletAddress::from(address);
    let mut out = HashMap::new();
    for evidence in state.submissions.list_all() {
        let Ok(session) = state.verification.get(&evidence.id) else {
            continue;
        };
        if !session.is_panelist(&wallet) {
            continue;
        }
        out.insert(
            evidence.id.as_str().to_string(),
            InspectorCase {
                evidence_id: evidence.id.clone(),
                committed: session.commits.contains_key(&wallet),
                revealed: session.reveals.contains_key(&wallet),
                revealed_verdict: session.final_verdict,
            },
        );
    }
    Json(out)
}
