// [libs/domain/bounty/src/lib.rs]
//! Bounty and stake settlement, per spec.md §4.10.
//!
//! `VERIFIED` pays the category bounty pool plus refunds the
//! submitter's stake. `REJECTED` forfeits the stake with no bounty.
//! `DISPUTED` pays nothing — the Resolution Engine already locked the
//! stake in place (`StakeLocked`, no transfer) rather than refunding
//! it, so there is nothing for the Bounty Engine to settle while the
//! case stays open for more evidence.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::instrument;
use whistlechain_domain_models::{BountyRecord, BountyStatus, Category, EvidenceId, FinalVerdict, WalletAddress};
use whistlechain_stake_policy::bounty_pool_micro;

#[derive(Debug, Error)]
pub enum BountyError {
    #[error("bounty record for evidence {0} already exists")]
    AlreadyExists(EvidenceId),
    #[error("no bounty record for evidence {0}")]
    NotFound(EvidenceId),
}

/// Computes the bounty-pool and total payout micro-amounts for
/// `verdict`, without touching ledger state.
pub fn compute_payout(verdict: FinalVerdict, category: Category, stake_micro: u64) -> (u64, u64) {
    match verdict {
        FinalVerdict::Verified => {
            let bounty = bounty_pool_micro(category);
            (bounty, bounty + stake_micro)
        }
        FinalVerdict::Rejected => (0, 0),
        FinalVerdict::Disputed => (0, 0),
    }
}

#[derive(Default)]
pub struct BountyEngine {
    records: RwLock<HashMap<EvidenceId, BountyRecord>>,
}

impl BountyEngine {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self))]
    pub fn register(
        &self,
        evidence_id: &EvidenceId,
        submitter: WalletAddress,
        category: Category,
        verdict: FinalVerdict,
        stake_micro: u64,
    ) -> Result<BountyRecord, BountyError> {
        let mut guard = self.records.write().expect("bounty records lock poisoned");
        if guard.contains_key(evidence_id) {
            return Err(BountyError::AlreadyExists(evidence_id.clone()));
        }

        let (bounty_micro, payout_micro) = compute_payout(verdict, category, stake_micro);
        let record = BountyRecord {
            evidence_id: evidence_id.clone(),
            submitter,
            stake_micro,
            bounty_micro,
            payout_micro,
            status: BountyStatus::Pending,
            settled_at: None,
            settlement_tx_id: None,
        };
        guard.insert(evidence_id.clone(), record.clone());
        Ok(record)
    }

    #[instrument(skip(self))]
    pub fn mark_settled(
        &self,
        evidence_id: &EvidenceId,
        verdict: FinalVerdict,
        tx_id: String,
    ) -> Result<BountyRecord, BountyError> {
        let mut guard = self.records.write().expect("bounty records lock poisoned");
        let record = guard
            .get_mut(evidence_id)
            .ok_or_else(|| BountyError::NotFound(evidence_id.clone()))?;
        record.status = match verdict {
            FinalVerdict::Verified => BountyStatus::Paid,
            FinalVerdict::Rejected => BountyStatus::Forfeited,
            FinalVerdict::Disputed => BountyStatus::StakeRefundOnly,
        };
        record.settled_at = Some(Utc::now());
        record.settlement_tx_id = Some(tx_id);
        Ok(record.clone())
    }

    /// Marks settlement as failed due to an insufficient application
    /// account balance — the payout stays owed and can be retried.
    #[instrument(skip(self))]
    pub fn mark_insufficient(&self, evidence_id: &EvidenceId) -> Result<BountyRecord, BountyError> {
        let mut guard = self.records.write().expect("bounty records lock poisoned");
        let record = guard
            .get_mut(evidence_id)
            .ok_or_else(|| BountyError::NotFound(evidence_id.clone()))?;
        record.status = BountyStatus::Insufficient;
        Ok(record.clone())
    }

    pub fn get(&self, evidence_id: &EvidenceId) -> Result<BountyRecord, BountyError> {
        self.records
            .read()
            .expect("bounty records lock poisoned")
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| BountyError::NotFound(evidence_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_pays_bounty_plus_stake_refund() {
        let (bounty, payout) = compute_payout(FinalVerdict::Verified, Category::Food, 25_000_000);
        assert_eq!(bounty, 150_000_000);
        assert_eq!(payout, 175_000_000);
    }

    #[test]
    fn rejected_forfeits_everything() {
        let (bounty, payout) = compute_payout(FinalVerdict::Rejected, Category::Food, 25_000_000);
        assert_eq!(bounty, 0);
        assert_eq!(payout, 0);
    }

    #[test]
    fn disputed_pays_nothing_the_stake_stays_locked_on_chain() {
        let (bounty, payout) = compute_payout(FinalVerdict::Disputed, Category::Food, 25_000_000);
        assert_eq!(bounty, 0);
        assert_eq!(payout, 0);
    }

    #[test]
    fn free_tier_submission_still_earns_full_bounty() {
        let (bounty, payout) = compute_payout(FinalVerdict::Verified, Category::Academic, 0);
        assert_eq!(bounty, 100_000_000);
        assert_eq!(payout, 100_000_000);
    }
}
