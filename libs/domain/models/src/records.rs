// [libs/domain/models/src/records.rs]
//! Downstream record types produced once a verification session
//! finalizes: resolution, bounty payout, audit trail, and publication
//! (spec.md §3, §4.9-§4.12).

use crate::evidence::{Category, FinalVerdict};
use crate::ids::{EvidenceId, WalletAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The on-chain effect a resolution triggers. A function of
/// `final_verdict` alone (spec.md §8): `VERIFIED -> release`,
/// `REJECTED -> forfeit`, `DISPUTED -> none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionAction {
    StakeReleased,
    StakeForfeited,
    StakeLocked,
}

impl ResolutionAction {
    /// The on-chain `resolve_evidence` status code, per spec.md §4.9.
    pub fn status_code(self) -> u8 {
        match self {
            ResolutionAction::StakeReleased => 1,
            ResolutionAction::StakeLocked => 2,
            ResolutionAction::StakeForfeited => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub evidence_id: EvidenceId,
    pub verdict: FinalVerdict,
    pub action: ResolutionAction,
    pub refund_address: Option<WalletAddress>,
    pub refund_micro: u64,
    pub resolved_at: DateTime<Utc>,
    pub ledger_tx_id: Option<String>,
    /// Set when the on-chain call failed but the off-chain record was
    /// still written (spec.md §7, `LedgerFailure` annotate-not-block).
    pub on_chain_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BountyStatus {
    Paid,
    Forfeited,
    /// Stake refunded but no bounty paid — the `DISPUTED` path, and,
    /// per spec.md §4.10 / §9, reachable as a direct manual override
    /// distinct from the auto-finalize paths.
    StakeRefundOnly,
    Insufficient,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BountyRecord {
    pub evidence_id: EvidenceId,
    pub submitter: WalletAddress,
    pub stake_micro: u64,
    pub bounty_micro: u64,
    pub payout_micro: u64,
    pub status: BountyStatus,
    pub settled_at: Option<DateTime<Utc>>,
    pub settlement_tx_id: Option<String>,
}

/// One revealing inspector's contribution to the final tally, with
/// the address anonymized per spec.md §4.11: first 8 + "..." + last 4
/// characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorVoteSummary {
    pub inspector_label: String,
    pub verdict_code: u64,
    pub weight: f64,
    pub justification_content_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTimeline {
    pub submitted_at: DateTime<Utc>,
    pub verification_started_at: Option<DateTime<Utc>>,
    pub verification_deadline: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditVerificationSummary {
    pub panel_size: usize,
    pub commit_count: usize,
    pub reveal_count: usize,
    pub consensus_threshold_label: String,
    pub authentic_share: f64,
    pub fake_share: f64,
    pub inconclusive_share: f64,
    pub final_verdict: FinalVerdict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditTxReferences {
    pub submission_tx_id: Option<String>,
    pub verification_tx_id: Option<String>,
    pub finalize_tx_id: Option<String>,
    pub resolution_tx_id: Option<String>,
    pub publish_tx_id: Option<String>,
    pub audit_summary_tx_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub evidence_id: EvidenceId,
    pub category: Category,
    pub target_organization: String,
    pub timeline: AuditTimeline,
    pub verification: AuditVerificationSummary,
    pub votes: Vec<InspectorVoteSummary>,
    pub resolution: ResolutionRecord,
    pub tx_references: AuditTxReferences,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Media,
    Government,
    Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub address: String,
    pub kind: ContactKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationChannel {
    Microblog,
    Broadcast,
    Email,
    StatutoryFiling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPost {
    pub channel: PublicationChannel,
    pub body: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRecord {
    pub evidence_id: EvidenceId,
    /// Right-to-information reference, e.g. `RTI/2026/WC/00042`.
    pub rti_reference: String,
    pub posts: Vec<ChannelPost>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
}
