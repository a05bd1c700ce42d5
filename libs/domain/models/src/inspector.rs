// [libs/domain/models/src/inspector.rs]
//! Inspector registry entities, per spec.md §4.7. Field set and the
//! three-state availability enum are supplemented from
//! `original_source/backend/services/verification.py::register_inspector`,
//! which the distilled spec.md compresses to "an availability flag".

use crate::evidence::Category;
use crate::ids::WalletAddress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `AVAILABLE`/`BUSY`/`ON_LEAVE` in the original service; only
/// `Available` inspectors are drawn into a new panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Busy,
    OnLeave,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reputation {
    pub total_votes: u32,
    pub consensus_matches: u32,
    pub outlier_votes: u32,
}

impl Default for Reputation {
    fn default() -> Self {
        Self {
            total_votes: 0,
            consensus_matches: 0,
            outlier_votes: 0,
        }
    }
}

impl Reputation {
    const MIN_SAMPLE: u32 = 3;
    const FLOOR: f64 = 0.1;
    const DECAY_RATE: f64 = 0.5;

    pub fn outlier_rate(&self) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            self.outlier_votes as f64 / self.total_votes as f64
        }
    }

    /// `matches / total`, `0.0` on a completely fresh inspector.
    pub fn consistency_score(&self) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            self.consensus_matches as f64 / self.total_votes as f64
        }
    }

    /// `credibility_weight = max(0.1, 1 - 0.5 * outlier_rate)`, active
    /// only once `total_votes >= 3` — below that a new inspector votes
    /// at full weight rather than being penalized on a thin sample.
    pub fn credibility_weight(&self) -> f64 {
        if self.total_votes < Self::MIN_SAMPLE {
            1.0
        } else {
            (1.0 - Self::DECAY_RATE * self.outlier_rate()).max(Self::FLOOR)
        }
    }

    pub fn record_vote(&mut self, was_outlier: bool) {
        self.total_votes += 1;
        if was_outlier {
            self.outlier_votes += 1;
        } else {
            self.consensus_matches += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inspector {
    pub wallet: WalletAddress,
    pub display_name: String,
    pub specializations: Vec<Category>,
    pub department: String,
    pub employee_id: String,
    pub jurisdiction: String,
    pub experience_years: u32,
    pub registered_at: DateTime<Utc>,
    pub availability: Availability,
    pub reputation: Reputation,
    pub cases_assigned: u32,
}

impl Inspector {
    pub fn is_eligible_for_draw(&self) -> bool {
        matches!(self.availability, Availability::Available)
    }

    pub fn specializes_in(&self, category: Category) -> bool {
        self.specializations.contains(&category)
    }
}

/// Patch applied by `update_profile`; `None` fields are left unchanged.
/// Mirrors `update_inspector_profile`'s `allowed_fields` subset — wallet,
/// reputation and case history are never editable through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectorProfilePatch {
    pub display_name: Option<String>,
    pub specializations: Option<Vec<Category>>,
    pub department: Option<String>,
    pub employee_id: Option<String>,
    pub jurisdiction: Option<String>,
    pub experience_years: Option<u32>,
    pub availability: Option<Availability>,
}
