// [libs/domain/models/src/evidence.rs]
//! The evidence item and its lifecycle status, per spec.md §3.

use crate::ids::{EvidenceId, WalletAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Financial,
    Construction,
    Food,
    Academic,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Financial,
        Category::Construction,
        Category::Food,
        Category::Academic,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "FINANCIAL" => Some(Category::Financial),
            "CONSTRUCTION" => Some(Category::Construction),
            "FOOD" => Some(Category::Food),
            "ACADEMIC" => Some(Category::Academic),
            _ => None,
        }
    }

    /// Verification window, per spec.md §4.8.
    pub fn verification_window_hours(self) -> i64 {
        match self {
            Category::Financial => 72,
            Category::Construction => 168,
            Category::Food => 48,
            Category::Academic => 72,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Financial => "FINANCIAL",
            Category::Construction => "CONSTRUCTION",
            Category::Food => "FOOD",
            Category::Academic => "ACADEMIC",
        };
        write!(f, "{s}")
    }
}

/// The three-value adjudication outcome, used both as the verdict label
/// on a `VerificationSession` and to key the resolution/bounty logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalVerdict {
    Verified,
    Rejected,
    Disputed,
}

impl fmt::Display for FinalVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinalVerdict::Verified => "VERIFIED",
            FinalVerdict::Rejected => "REJECTED",
            FinalVerdict::Disputed => "DISPUTED",
        };
        write!(f, "{s}")
    }
}

/// Ordered, monotonic lifecycle status — `spec.md` §3 forbids regression.
/// The ordinal returned by `rank` is what callers compare to enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    Pending,
    UnderVerification,
    Finalized { verdict: FinalVerdict },
    Resolved,
    Published,
}

impl LifecycleStatus {
    pub fn rank(&self) -> u8 {
        match self {
            LifecycleStatus::Pending => 0,
            LifecycleStatus::UnderVerification => 1,
            LifecycleStatus::Finalized { .. } => 2,
            LifecycleStatus::Resolved => 3,
            LifecycleStatus::Published => 4,
        }
    }

    /// `true` if moving from `self` to `next` does not regress rank.
    pub fn can_advance_to(&self, next: &LifecycleStatus) -> bool {
        next.rank() >= self.rank()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EvidenceId,
    pub category: Category,
    pub target_organization: String,
    pub description: String,
    pub submitter_wallet: WalletAddress,
    /// Micro-units; zero is the free-tier carve-out.
    pub stake_micro: u64,
    pub content_id: String,
    /// `false` if the object store was unreachable and `content_id` is a
    /// simulated identifier substituted per spec.md §4.2 / §7.
    pub content_id_is_real: bool,
    pub submitted_at: DateTime<Utc>,
    pub status: LifecycleStatus,
    pub submission_tx_id: Option<String>,
    pub on_chain_error: Option<String>,
}

impl EvidenceItem {
    /// Applies `next`, enforcing the monotonic lifecycle invariant.
    ///
    /// Returns `Err(next)` (the rejected status, unapplied) on regression
    /// so the caller can surface a `StateError` without losing context.
    pub fn advance(&mut self, next: LifecycleStatus) -> Result<(), LifecycleStatus> {
        if self.status.can_advance_to(&next) {
            self.status = next;
            Ok(())
        } else {
            Err(next)
        }
    }
}
