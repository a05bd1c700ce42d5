// [apps/coordinator/src/handlers/bounty.rs]
//! `POST /bounty/process` (spec.md §6, §4.10) — registers the bounty
//! record for a resolved case and attempts on-chain settlement.

use axum::extract::{Query, State};
use axum::Json;
use tracing::{instrument, warn};
use whistlechain_domain_models::{BountyRecord, EvidenceId};
use whistlechain_ledger_client::PayoutBuilder;

use crate::error::CoordinatorError;
use crate::handlers::verification::EvidenceIdQuery;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn process(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<BountyRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    let evidence = state.submissions.get(&evidence_id)?;
    let resolution = state.resolution.get(&evidence_id)?;

    let record = state.bounty.register(
        &evidence_id,
        evidence.submitter_wallet.clone(),
        evidence.category,
        resolution.verdict,
        evidence.stake_micro,
    )?;

    if record.payout_micro == 0 {
        return Ok(Json(record));
    }

    let builder = PayoutBuilder::default().with_inner_txns(1).bump_fee_for_inner_txns();
    let payout = state
        .ledger
        .pay_out(&evidence.submitter_wallet, record.payout_micro, builder)
        .await;

    let record = match payout {
        Ok(receipt) => state.bounty.mark_settled(&evidence_id, resolution.verdict, receipt.tx_id)?,
        Err(err) => {
            warn!(evidence_id = %evidence_id, error = %err, "bounty payout failed; marking insufficient for retry");
            state.bounty.mark_insufficient(&evidence_id)?
        }
    };

    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn get_bounty(
    State(state): State<AppState>,
    Query(query): Query<EvidenceIdQuery>,
) -> Result<Json<BountyRecord>, CoordinatorError> {
    let evidence_id = EvidenceId::from(query.evidence_id);
    Ok(Json(state.bounty.get(&evidence_id)?))
}
