// [libs/infra/submission-store/src/lib.rs]
//! In-memory table of submitted evidence. One `RwLock<HashMap<..>>`
//! guarding the whole table, matching the orchestrator's telemetry
//! state manager rather than reaching for a persistence layer: spec.md
//! §5 scopes this coordinator to in-process state and explicitly
//! excludes long-term storage as a non-goal (see DESIGN.md).

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, warn};
use whistlechain_domain_models::{EvidenceId, EvidenceItem, LifecycleStatus, WalletAddress};

#[derive(Debug, Error)]
pub enum SubmissionStoreError {
    #[error("no evidence record found for id {0}")]
    NotFound(EvidenceId),
    #[error("evidence {0} already exists")]
    AlreadyExists(EvidenceId),
    #[error("status transition rejected for {evidence_id}: cannot move to {attempted:?}")]
    InvalidTransition {
        evidence_id: EvidenceId,
        attempted: LifecycleStatus,
    },
}

#[derive(Default)]
pub struct SubmissionStore {
    records: RwLock<HashMap<EvidenceId, EvidenceItem>>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, item: EvidenceItem) -> Result<(), SubmissionStoreError> {
        let mut guard = self.records.write().expect("submission store lock poisoned");
        if guard.contains_key(&item.id) {
            return Err(SubmissionStoreError::AlreadyExists(item.id));
        }
        debug!(evidence_id = %item.id, "evidence inserted into submission store");
        guard.insert(item.id.clone(), item);
        Ok(())
    }

    pub fn get(&self, id: &EvidenceId) -> Result<EvidenceItem, SubmissionStoreError> {
        let guard = self.records.read().expect("submission store lock poisoned");
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SubmissionStoreError::NotFound(id.clone()))
    }

    /// Advances the status of an existing record. The absence of a
    /// record here is the caller's mistake, not a panic-worthy
    /// invariant violation — it surfaces as a normal client error.
    pub fn advance_status(
        &self,
        id: &EvidenceId,
        next: LifecycleStatus,
    ) -> Result<(), SubmissionStoreError> {
        let mut guard = self.records.write().expect("submission store lock poisoned");
        let record = guard
            .get_mut(id)
            .ok_or_else(|| SubmissionStoreError::NotFound(id.clone()))?;
        record.advance(next.clone()).map_err(|attempted| {
            warn!(evidence_id = %id, ?attempted, "rejected non-monotonic lifecycle transition");
            SubmissionStoreError::InvalidTransition {
                evidence_id: id.clone(),
                attempted,
            }
        })
    }

    pub fn set_submission_tx(&self, id: &EvidenceId, tx_id: Option<String>, on_chain_error: Option<String>) -> Result<(), SubmissionStoreError> {
        let mut guard = self.records.write().expect("submission store lock poisoned");
        let record = guard
            .get_mut(id)
            .ok_or_else(|| SubmissionStoreError::NotFound(id.clone()))?;
        record.submission_tx_id = tx_id;
        record.on_chain_error = on_chain_error;
        Ok(())
    }

    pub fn list_all(&self) -> Vec<EvidenceItem> {
        let guard = self.records.read().expect("submission store lock poisoned");
        guard.values().cloned().collect()
    }

    pub fn list_by_wallet(&self, wallet: &WalletAddress) -> Vec<EvidenceItem> {
        let guard = self.records.read().expect("submission store lock poisoned");
        guard
            .values()
            .filter(|item| &item.submitter_wallet == wallet)
            .cloned()
            .collect()
    }

    pub fn list_by_status_rank(&self, rank: u8) -> Vec<EvidenceItem> {
        let guard = self.records.read().expect("submission store lock poisoned");
        guard
            .values()
            .filter(|item| item.status.rank() == rank)
            .cloned()
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(id: &str) -> EvidenceItem {
        EvidenceItem {
            id: EvidenceId::from(id),
            category: whistlechain_domain_models::Category::Food,
            target_organization: "Acme".into(),
            description: "desc".into(),
            submitter_wallet: WalletAddress::from("WALLETA"),
            stake_micro: 0,
            content_id: "simCID-test".into(),
            content_id_is_real: false,
            submitted_at: Utc::now(),
            status: LifecycleStatus::Pending,
            submission_tx_id: None,
            on_chain_error: None,
        }
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = SubmissionStore::new();
        store.insert(sample("EVD-2026-00001")).unwrap();
        let err = store.insert(sample("EVD-2026-00001")).unwrap_err();
        assert!(matches!(err, SubmissionStoreError::AlreadyExists(_)));
    }

    #[test]
    fn missing_record_on_advance_is_a_client_error_not_a_panic() {
        let store = SubmissionStore::new();
        let err = store
            .advance_status(&EvidenceId::from("EVD-2026-99999"), LifecycleStatus::Resolved)
            .unwrap_err();
        assert!(matches!(err, SubmissionStoreError::NotFound(_)));
    }

    #[test]
    fn lifecycle_cannot_regress() {
        let store = SubmissionStore::new();
        let mut item = sample("EVD-2026-00002");
        item.status = LifecycleStatus::Resolved;
        store.insert(item).unwrap();
        let err = store
            .advance_status(&EvidenceId::from("EVD-2026-00002"), LifecycleStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, SubmissionStoreError::InvalidTransition { .. }));
    }
}
