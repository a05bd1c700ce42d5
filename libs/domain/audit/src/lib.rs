// [libs/domain/audit/src/lib.rs]
//! Assembles the immutable audit trail for a finalized case (spec.md
//! §4.11): a timeline, a verification summary, one anonymized entry
//! per revealing inspector, the resolution outcome, and the on-chain
//! transaction references accumulated along the way.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::instrument;
use whistlechain_domain_models::{
    AuditRecord, AuditTimeline, AuditTxReferences, AuditVerificationSummary, EvidenceId,
    EvidenceItem, InspectorVoteSummary, ResolutionRecord, VerificationSession, WalletAddress,
};
use whistlechain_inspector_registry::InspectorRegistry;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("an audit record for evidence {0} has already been published")]
    AlreadyPublished(EvidenceId),
    #[error("no audit record for evidence {0}")]
    NotFound(EvidenceId),
    #[error("evidence {0} has not finalized its verification session")]
    NotFinalized(EvidenceId),
}

/// `addr[:8] + "..." + addr[-4:]` — the exact anonymization rule
/// (spec.md §4.11) applied to every inspector address that appears in
/// a published record.
pub fn anonymize(wallet: &WalletAddress) -> String {
    let addr = wallet.as_str();
    if addr.chars().count() <= 12 {
        return addr.to_string();
    }
    let head: String = addr.chars().take(8).collect();
    let tail: String = addr.chars().rev().take(4).collect::<String>().chars().rev().collect();
    format!("{head}...{tail}")
}

#[derive(Default)]
pub struct AuditEngine {
    records: RwLock<HashMap<EvidenceId, AuditRecord>>,
}

impl AuditEngine {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Builds and stores the audit record for `evidence`. Publishing
    /// twice is rejected rather than overwriting a record that may
    /// already have been filed downstream.
    #[instrument(skip(self, evidence, session, resolution, inspectors))]
    pub fn publish(
        &self,
        evidence: &EvidenceItem,
        session: &VerificationSession,
        resolution: &ResolutionRecord,
        inspectors: &InspectorRegistry,
        tx_references: AuditTxReferences,
    ) -> Result<AuditRecord, AuditError> {
        {
            let guard = self.records.read().expect("audit records lock poisoned");
            if guard.contains_key(&evidence.id) {
                return Err(AuditError::AlreadyPublished(evidence.id.clone()));
            }
        }

        let final_verdict = session
            .final_verdict
            .ok_or_else(|| AuditError::NotFinalized(evidence.id.clone()))?;
        let tally = session.tally.unwrap_or_default();
        let total_weight = if tally.total_weight > 0.0 { tally.total_weight } else { 1.0 };

        let verification = AuditVerificationSummary {
            panel_size: session.panel.len(),
            commit_count: session.commits.len(),
            reveal_count: session.reveals.len(),
            consensus_threshold_label: "67%".to_string(),
            authentic_share: tally.authentic_weight / total_weight,
            fake_share: tally.fake_weight / total_weight,
            inconclusive_share: tally.inconclusive_weight / total_weight,
            final_verdict,
        };

        let mut votes: Vec<InspectorVoteSummary> = Vec::with_capacity(session.reveals.len());
        for wallet in &session.panel {
            if let Some(reveal) = session.reveals.get(wallet) {
                let weight = inspectors.credibility_of(wallet).unwrap_or(1.0);
                votes.push(InspectorVoteSummary {
                    inspector_label: anonymize(wallet),
                    verdict_code: reveal.verdict.code(),
                    weight,
                    justification_content_id: reveal.justification_content_id.clone(),
                });
            }
        }

        let timeline = AuditTimeline {
            submitted_at: evidence.submitted_at,
            verification_started_at: Some(session.opened_at),
            verification_deadline: Some(session.reveal_deadline),
            finalized_at: session.finalized_at,
            resolved_at: Some(resolution.resolved_at),
            published_at: None,
        };

        let record = AuditRecord {
            evidence_id: evidence.id.clone(),
            category: evidence.category,
            target_organization: evidence.target_organization.clone(),
            timeline,
            verification,
            votes,
            resolution: resolution.clone(),
            tx_references,
            created_at: Utc::now(),
        };

        self.records
            .write()
            .expect("audit records lock poisoned")
            .insert(evidence.id.clone(), record.clone());
        Ok(record)
    }

    pub fn get(&self, evidence_id: &EvidenceId) -> Result<AuditRecord, AuditError> {
        self.records
            .read()
            .expect("audit records lock poisoned")
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| AuditError::NotFound(evidence_id.clone()))
    }

    /// Marks the record's timeline as published, called once the
    /// publication engine has actually posted it out.
    pub fn mark_published(&self, evidence_id: &EvidenceId) -> Result<AuditRecord, AuditError> {
        let mut guard = self.records.write().expect("audit records lock poisoned");
        let record = guard
            .get_mut(evidence_id)
            .ok_or_else(|| AuditError::NotFound(evidence_id.clone()))?;
        record.timeline.published_at = Some(Utc::now());
        Ok(record.clone())
    }

    pub fn all(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .expect("audit records lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}
