// [libs/domain/models/src/verification.rs]
//! The commit-reveal verification session, the heart of the coordinator
//! per spec.md §4.8.

use crate::evidence::{Category, FinalVerdict};
use crate::ids::{EvidenceId, WalletAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Commit,
    Reveal,
    Finalized,
}

/// An inspector's raw vote. `1 = AUTHENTIC`, `2 = FAKE`, `3 = INCONCLUSIVE`
/// — the numeric encoding the on-chain program hashes, per spec.md §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Authentic = 1,
    Fake = 2,
    Inconclusive = 3,
}

impl Verdict {
    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Verdict::Authentic),
            2 => Some(Verdict::Fake),
            3 => Some(Verdict::Inconclusive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub inspector: WalletAddress,
    pub hash: [u8; 32],
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reveal {
    pub inspector: WalletAddress,
    pub verdict: Verdict,
    pub nonce: String,
    /// Content id of the inspector's written justification; required
    /// to be at least 5 characters (spec.md §3) and surfaced,
    /// anonymized alongside the inspector, in the published audit
    /// record (spec.md §4.11).
    pub justification_content_id: String,
    pub revealed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VoteBreakdown {
    pub authentic_weight: f64,
    pub fake_weight: f64,
    pub inconclusive_weight: f64,
    pub total_weight: f64,
}

impl VoteBreakdown {
    pub fn add(&mut self, verdict: Verdict, weight: f64) {
        match verdict {
            Verdict::Authentic => self.authentic_weight += weight,
            Verdict::Fake => self.fake_weight += weight,
            Verdict::Inconclusive => self.inconclusive_weight += weight,
        }
        self.total_weight += weight;
    }

    /// `67%` weighted-consensus threshold from spec.md §4.8; ties and
    /// near-misses fall through to `FinalVerdict::Disputed`.
    pub fn consensus(&self, threshold: f64) -> FinalVerdict {
        if self.total_weight <= 0.0 {
            return FinalVerdict::Disputed;
        }
        let authentic_share = self.authentic_weight / self.total_weight;
        let fake_share = self.fake_weight / self.total_weight;
        if authentic_share >= threshold {
            FinalVerdict::Verified
        } else if fake_share >= threshold {
            FinalVerdict::Rejected
        } else {
            FinalVerdict::Disputed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    pub evidence_id: EvidenceId,
    pub category: Category,
    pub panel: Vec<WalletAddress>,
    pub phase: Phase,
    pub opened_at: DateTime<Utc>,
    pub reveal_deadline: DateTime<Utc>,
    pub commits: HashMap<WalletAddress, Commit>,
    pub reveals: HashMap<WalletAddress, Reveal>,
    pub tally: Option<VoteBreakdown>,
    pub final_verdict: Option<FinalVerdict>,
    pub finalized_at: Option<DateTime<Utc>>,
    /// Non-fatal annotation when a ledger call tied to this session
    /// failed; off-chain state still advances (spec.md §4.8, §7).
    pub on_chain_error: Option<String>,
}

impl VerificationSession {
    pub fn all_committed(&self) -> bool {
        self.panel.iter().all(|w| self.commits.contains_key(w))
    }

    pub fn all_revealed(&self) -> bool {
        self.panel.iter().all(|w| self.reveals.contains_key(w))
    }

    pub fn is_panelist(&self, wallet: &WalletAddress) -> bool {
        self.panel.contains(wallet)
    }
}
