// [apps/coordinator/src/handlers/projections.rs]
//! Read-only views (spec.md §6): submission listings, the inspector
//! roster, and a transparency rollup over the ledger's own counters.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use whistlechain_domain_models::{EvidenceItem, Inspector, LifecycleStatus, WalletAddress};

use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_submissions(State(state): State<AppState>) -> Json<Vec<EvidenceItem>> {
    Json(state.submissions.list_all())
}

#[instrument(skip(state))]
pub async fn submissions_by_wallet(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Json<Vec<EvidenceItem>> {
    Json(state.submissions.list_by_wallet(&WalletAddress::from(wallet)))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[instrument(skip(state))]
pub async fn submissions_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<Vec<EvidenceItem>> {
    let rank = match query.status.to_ascii_uppercase().as_str() {
        "PENDING" => LifecycleStatus::Pending.rank(),
        "UNDER_VERIFICATION" => LifecycleStatus::UnderVerification.rank(),
        "RESOLVED" => LifecycleStatus::Resolved.rank(),
        "PUBLISHED" => LifecycleStatus::Published.rank(),
        // `FINALIZED` covers all three verdict variants; filter by rank only,
        // the handler doesn't know which verdict the caller means.
        _ => LifecycleStatus::Pending.rank(),
    };
    Json(state.submissions.list_by_status_rank(rank))
}

#[instrument(skip(state))]
pub async fn list_inspectors(State(state): State<AppState>) -> Json<Vec<Inspector>> {
    Json(state.inspectors.all())
}

#[derive(Serialize)]
pub struct TransparencyReport {
    pub total_submissions: usize,
    pub app_balance_micro: u64,
    pub total_forfeited_micro: u64,
    pub app_account_address: String,
}

#[instrument(skip(state))]
pub async fn transparency(State(state): State<AppState>) -> Json<TransparencyReport> {
    Json(TransparencyReport {
        total_submissions: state.submissions.list_all().len(),
        app_balance_micro: state.ledger.app_balance(),
        total_forfeited_micro: state.ledger.total_forfeited(),
        app_account_address: state.ledger.app_account_address().to_string(),
    })
}
