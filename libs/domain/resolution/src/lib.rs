// [libs/domain/resolution/src/lib.rs]
//! Turns a finalized verdict into a concrete resolution action and the
//! on-chain `resolve_evidence` call it implies (spec.md §4.9):
//! `VERIFIED` releases the submitter's stake, `REJECTED` forfeits it,
//! `DISPUTED` locks it in place pending further action.

use chrono::Utc;
use ed25519_dalek::VerifyingKey;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{instrument, warn};
use whistlechain_core_wallet::address_of;
use whistlechain_domain_models::{
    EvidenceId, FinalVerdict, ResolutionAction, ResolutionRecord, WalletAddress,
};
use whistlechain_ledger_client::{LedgerClient, LedgerError};
use whistlechain_submission_store::{SubmissionStore, SubmissionStoreError};

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("evidence {0} has already been resolved")]
    AlreadyResolved(EvidenceId),
    #[error("no resolution record for evidence {0}")]
    NotFound(EvidenceId),
    #[error("could not recover a submitter/stake record for {0} from the submission store or the chain")]
    UnrecoverableSubmission(EvidenceId),
    #[error(transparent)]
    Submission(#[from] SubmissionStoreError),
}

fn action_for(verdict: FinalVerdict) -> ResolutionAction {
    match verdict {
        FinalVerdict::Verified => ResolutionAction::StakeReleased,
        FinalVerdict::Rejected => ResolutionAction::StakeForfeited,
        FinalVerdict::Disputed => ResolutionAction::StakeLocked,
    }
}

struct RecoveredSubmission {
    submitter: WalletAddress,
    stake_micro: u64,
}

#[derive(Default)]
pub struct ResolutionEngine {
    records: RwLock<HashMap<EvidenceId, ResolutionRecord>>,
}

impl ResolutionEngine {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Recovers submitter address and stake amount for `evidence_id`,
    /// preferring the off-chain submission store and falling back to
    /// the on-chain evidence box — the box field layout in spec.md §6,
    /// `parts[4]` = submitter pubkey, `parts[7]` = stake amount —
    /// when the off-chain record is missing (the restart case).
    fn recover_submission(
        evidence_id: &EvidenceId,
        submissions: &SubmissionStore,
        ledger: &LedgerClient,
    ) -> Result<RecoveredSubmission, ResolutionError> {
        if let Ok(item) = submissions.get(evidence_id) {
            return Ok(RecoveredSubmission {
                submitter: item.submitter_wallet,
                stake_micro: item.stake_micro,
            });
        }

        let boxed = ledger
            .read_submission_box(evidence_id)
            .map_err(|_| ResolutionError::UnrecoverableSubmission(evidence_id.clone()))?;
        let pubkey_bytes: [u8; 32] = hex::decode(&boxed.submitter_pubkey_hex)
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| ResolutionError::UnrecoverableSubmission(evidence_id.clone()))?;
        let verifying_key = VerifyingKey::from_bytes(&pubkey_bytes)
            .map_err(|_| ResolutionError::UnrecoverableSubmission(evidence_id.clone()))?;

        Ok(RecoveredSubmission {
            submitter: address_of(&verifying_key),
            stake_micro: boxed.stake_micro,
        })
    }

    /// Resolves `evidence_id` against `verdict`. Idempotent
    /// re-resolution is rejected rather than silently overwritten,
    /// since a resolution can have already triggered downstream bounty
    /// settlement.
    #[instrument(skip(self, submissions, ledger))]
    pub async fn resolve(
        &self,
        evidence_id: &EvidenceId,
        verdict: FinalVerdict,
        submissions: &SubmissionStore,
        ledger: &LedgerClient,
    ) -> Result<ResolutionRecord, ResolutionError> {
        {
            let guard = self.records.read().expect("resolution records lock poisoned");
            if guard.contains_key(evidence_id) {
                return Err(ResolutionError::AlreadyResolved(evidence_id.clone()));
            }
        }

        let action = action_for(verdict);
        let recovered = Self::recover_submission(evidence_id, submissions, ledger)?;

        // `refund_micro` is what actually moves to the submitter —
        // nonzero only for `StakeReleased`. `ledger_stake_micro` is the
        // amount the ledger call itself carries: for `StakeForfeited` it
        // still needs the real stake amount so the application's
        // forfeited tally actually increases (spec.md §8 scenario 2),
        // even though nothing is refunded to anyone.
        let (refund_address, refund_micro, ledger_stake_micro) = match action {
            ResolutionAction::StakeReleased => {
                if recovered.stake_micro == 0 {
                    warn!(evidence_id = %evidence_id, "releasing a zero stake; refund amount is zero");
                }
                (Some(recovered.submitter.clone()), recovered.stake_micro, recovered.stake_micro)
            }
            ResolutionAction::StakeForfeited => (None, 0, recovered.stake_micro),
            ResolutionAction::StakeLocked => (None, 0, 0),
        };

        let call = ledger
            .resolve(
                evidence_id,
                action.status_code(),
                refund_address.as_ref(),
                ledger_stake_micro,
            )
            .await;

        let (ledger_tx_id, on_chain_error) = match call {
            Ok(receipt) => (Some(receipt.tx_id), None),
            Err(err) => (None, Some(ledger_error_message(&err))),
        };

        let record = ResolutionRecord {
            evidence_id: evidence_id.clone(),
            verdict,
            action,
            refund_address,
            refund_micro,
            resolved_at: Utc::now(),
            ledger_tx_id,
            on_chain_error,
        };

        self.records
            .write()
            .expect("resolution records lock poisoned")
            .insert(evidence_id.clone(), record.clone());
        Ok(record)
    }

    pub fn get(&self, evidence_id: &EvidenceId) -> Result<ResolutionRecord, ResolutionError> {
        self.records
            .read()
            .expect("resolution records lock poisoned")
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(evidence_id.clone()))
    }
}

fn ledger_error_message(err: &LedgerError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc as ChronoUtc;
    use whistlechain_domain_models::{Category, EvidenceItem, LifecycleStatus};

    fn seeded_submission(id: &EvidenceId, submitter: &WalletAddress, stake_micro: u64) -> EvidenceItem {
        EvidenceItem {
            id: id.clone(),
            category: Category::Food,
            target_organization: "Acme".into(),
            description: "desc".into(),
            submitter_wallet: submitter.clone(),
            stake_micro,
            content_id: "simCID-test".into(),
            content_id_is_real: false,
            submitted_at: ChronoUtc::now(),
            status: LifecycleStatus::Finalized {
                verdict: FinalVerdict::Verified,
            },
            submission_tx_id: None,
            on_chain_error: None,
        }
    }

    #[tokio::test]
    async fn double_resolve_is_rejected() {
        let engine = ResolutionEngine::new();
        let submissions = SubmissionStore::new();
        let ledger = LedgerClient::new(1);
        let id = EvidenceId::from_counter(2026, 1);
        let submitter = WalletAddress::from("SUBMITTERADDR");
        submissions.insert(seeded_submission(&id, &submitter, 25_000_000)).unwrap();

        engine.resolve(&id, FinalVerdict::Verified, &submissions, &ledger).await.unwrap();
        let err = engine
            .resolve(&id, FinalVerdict::Verified, &submissions, &ledger)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::AlreadyResolved(_)));
    }

    #[tokio::test]
    async fn disputed_locks_the_stake_with_no_refund() {
        let engine = ResolutionEngine::new();
        let submissions = SubmissionStore::new();
        let ledger = LedgerClient::new(1);
        let id = EvidenceId::from_counter(2026, 2);
        let submitter = WalletAddress::from("SUBMITTERADDR2");
        submissions.insert(seeded_submission(&id, &submitter, 25_000_000)).unwrap();

        let record = engine.resolve(&id, FinalVerdict::Disputed, &submissions, &ledger).await.unwrap();
        assert_eq!(record.action, ResolutionAction::StakeLocked);
        assert!(record.refund_address.is_none());
        assert_eq!(record.refund_micro, 0);
    }

    #[tokio::test]
    async fn verified_releases_stake_to_the_submitter() {
        let engine = ResolutionEngine::new();
        let submissions = SubmissionStore::new();
        let ledger = LedgerClient::new(1);
        let id = EvidenceId::from_counter(2026, 3);
        let submitter = WalletAddress::from("SUBMITTERADDR3");
        submissions.insert(seeded_submission(&id, &submitter, 25_000_000)).unwrap();

        let record = engine.resolve(&id, FinalVerdict::Verified, &submissions, &ledger).await.unwrap();
        assert_eq!(record.action, ResolutionAction::StakeReleased);
        assert_eq!(record.refund_address, Some(submitter));
        assert_eq!(record.refund_micro, 25_000_000);
    }

    #[tokio::test]
    async fn rejected_forfeits_the_stake_and_credits_total_forfeited() {
        let engine = ResolutionEngine::new();
        let submissions = SubmissionStore::new();
        let ledger = LedgerClient::new(1);
        let id = EvidenceId::from_counter(2026, 5);
        let submitter = WalletAddress::from("SUBMITTERADDR5");
        submissions.insert(seeded_submission(&id, &submitter, 25_000_000)).unwrap();

        let record = engine.resolve(&id, FinalVerdict::Rejected, &submissions, &ledger).await.unwrap();
        assert_eq!(record.action, ResolutionAction::StakeForfeited);
        assert!(record.refund_address.is_none());
        assert_eq!(record.refund_micro, 0);
        assert_eq!(ledger.total_forfeited(), 25_000_000);
    }

    #[tokio::test]
    async fn missing_submission_falls_back_to_the_chain_box() {
        let engine = ResolutionEngine::new();
        let submissions = SubmissionStore::new();
        let ledger = LedgerClient::new(1);
        let submitter = WalletAddress::from("RESTARTSUBMITTER");
        let pubkey = [11u8; 32];

        let receipt = ledger
            .submit_with_stake(2026, "FOOD", "simCID-restart", &submitter, &pubkey, 25_000_000, 1_700_000_000)
            .await
            .unwrap();
        let id = receipt.evidence_id;

        let record = engine.resolve(&id, FinalVerdict::Verified, &submissions, &ledger).await.unwrap();
        assert_eq!(record.action, ResolutionAction::StakeReleased);
        assert_eq!(record.refund_micro, 25_000_000);
    }
}
