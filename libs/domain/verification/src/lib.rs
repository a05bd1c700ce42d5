// [libs/domain/verification/src/lib.rs]
//! The commit-reveal verification engine — the heart of the
//! coordinator (spec.md §4.8). A panel of inspectors is drawn without
//! replacement, each commits to a hash binding their verdict and a
//! private nonce, and only once at least three panelists have
//! revealed is the weighted tally computed.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{instrument, warn};
use whistlechain_domain_models::{
    Category, Commit, EvidenceId, FinalVerdict, Phase, Reveal, Verdict, VerificationSession,
    VoteBreakdown, WalletAddress,
};
use whistlechain_inspector_registry::{InspectorRegistry, InspectorRegistryError};
use whistlechain_stake_policy::{CONSENSUS_THRESHOLD, MIN_INSPECTORS};

/// Minimum length, in characters, a reveal's justification content id
/// must satisfy (spec.md §3 / §4.8).
pub const MIN_JUSTIFICATION_LEN: usize = 5;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("no verification session for evidence {0}")]
    NotFound(EvidenceId),
    #[error("a verification session already exists for evidence {0}")]
    AlreadyExists(EvidenceId),
    #[error("session for {evidence_id} is in phase {phase:?}, not the phase this call requires")]
    WrongPhase {
        evidence_id: EvidenceId,
        phase: Phase,
    },
    #[error("{0} is not a panelist on this session")]
    NotPanelist(WalletAddress),
    #[error("{0} has already committed")]
    AlreadyCommitted(WalletAddress),
    #[error("{0} has already revealed")]
    AlreadyRevealed(WalletAddress),
    #[error("{0} has no recorded commit to reveal against")]
    NoCommitFound(WalletAddress),
    #[error("revealed verdict/nonce does not match the committed hash for {0}")]
    HashMismatch(WalletAddress),
    #[error("justification must be at least {MIN_JUSTIFICATION_LEN} characters")]
    JustificationTooShort,
    #[error("the verification window for evidence {0} has closed")]
    DeadlinePassed(EvidenceId),
    #[error("only {committed} of {required} panelists have committed, need at least {required}")]
    InsufficientCommits { committed: usize, required: usize },
    #[error("only {revealed} of {required} panelists have revealed, need at least {required}")]
    InsufficientReveals { revealed: usize, required: usize },
    #[error("only {available} eligible inspectors in the pool, need at least {required}")]
    InsufficientPanel { available: usize, required: usize },
    #[error(transparent)]
    Registry(#[from] InspectorRegistryError),
}

/// `SHA-256(be64(verdict) ‖ utf8(nonce))` — the binding every commit
/// hash must satisfy at reveal time. Big-endian encoding of the
/// verdict integer is deliberate: it must match byte-for-byte what an
/// on-chain verifier would compute over the same inputs.
pub fn generate_commit_hash(verdict: Verdict, nonce: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(verdict.code().to_be_bytes());
    hasher.update(nonce.as_bytes());
    hasher.finalize().into()
}

#[derive(Default)]
pub struct VerificationEngine {
    sessions: RwLock<HashMap<EvidenceId, VerificationSession>>,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Draws the panel for `category`: the specialized pool first,
    /// falling back to the full eligible pool when fewer than
    /// `MIN_INSPECTORS` specialists are registered (spec.md §4.8).
    #[instrument(skip(self, inspectors))]
    pub fn begin_verification(
        &self,
        evidence_id: &EvidenceId,
        category: Category,
        inspectors: &InspectorRegistry,
    ) -> Result<VerificationSession, VerificationError> {
        {
            let guard = self.sessions.read().expect("verification sessions lock poisoned");
            if guard.contains_key(evidence_id) {
                return Err(VerificationError::AlreadyExists(evidence_id.clone()));
            }
        }

        let mut pool = inspectors.eligible_pool(Some(category));
        if pool.len() < MIN_INSPECTORS {
            pool = inspectors.eligible_pool(None);
        }
        if pool.len() < MIN_INSPECTORS {
            return Err(VerificationError::InsufficientPanel {
                available: pool.len(),
                required: MIN_INSPECTORS,
            });
        }

        let panel_size = MIN_INSPECTORS.min(pool.len());
        let mut rng = rand::thread_rng();
        let panel: Vec<WalletAddress> = pool
            .choose_multiple(&mut rng, panel_size)
            .map(|i| i.wallet.clone())
            .collect();

        for wallet in &panel {
            inspectors.increment_cases_assigned(wallet)?;
        }

        let opened_at = Utc::now();
        let session = VerificationSession {
            evidence_id: evidence_id.clone(),
            category,
            panel,
            phase: Phase::Commit,
            opened_at,
            reveal_deadline: opened_at + Duration::hours(category.verification_window_hours()),
            commits: HashMap::new(),
            reveals: HashMap::new(),
            tally: None,
            final_verdict: None,
            finalized_at: None,
            on_chain_error: None,
        };

        self.sessions
            .write()
            .expect("verification sessions lock poisoned")
            .insert(evidence_id.clone(), session.clone());
        Ok(session)
    }

    pub fn get(&self, evidence_id: &EvidenceId) -> Result<VerificationSession, VerificationError> {
        self.sessions
            .read()
            .expect("verification sessions lock poisoned")
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))
    }

    /// Records a non-fatal ledger-call failure on the session without
    /// touching its phase — off-chain state stays authoritative for
    /// coordination even when the matching on-chain call failed
    /// (spec.md §4.8, §7).
    pub fn annotate_ledger_error(&self, evidence_id: &EvidenceId, error: String) {
        if let Some(session) = self
            .sessions
            .write()
            .expect("verification sessions lock poisoned")
            .get_mut(evidence_id)
        {
            session.on_chain_error = Some(error);
        }
    }

    #[instrument(skip(self))]
    pub fn commit(
        &self,
        evidence_id: &EvidenceId,
        inspector: &WalletAddress,
        hash: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<bool, VerificationError> {
        let mut guard = self.sessions.write().expect("verification sessions lock poisoned");
        let session = guard
            .get_mut(evidence_id)
            .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))?;

        if session.phase != Phase::Commit {
            return Err(VerificationError::WrongPhase {
                evidence_id: evidence_id.clone(),
                phase: session.phase,
            });
        }
        if now > session.reveal_deadline {
            return Err(VerificationError::DeadlinePassed(evidence_id.clone()));
        }
        if !session.is_panelist(inspector) {
            return Err(VerificationError::NotPanelist(inspector.clone()));
        }
        if session.commits.contains_key(inspector) {
            return Err(VerificationError::AlreadyCommitted(inspector.clone()));
        }

        session.commits.insert(
            inspector.clone(),
            Commit {
                inspector: inspector.clone(),
                hash,
                committed_at: now,
            },
        );

        let auto_advanced = session.all_committed();
        if auto_advanced {
            session.phase = Phase::Reveal;
        }
        Ok(auto_advanced)
    }

    /// Operator tool: moves the session from commit to reveal phase
    /// once at least `MIN_INSPECTORS` have committed, without waiting
    /// for the full panel (spec.md §4.8).
    #[instrument(skip(self))]
    pub fn advance_to_reveal(&self, evidence_id: &EvidenceId) -> Result<(), VerificationError> {
        let mut guard = self.sessions.write().expect("verification sessions lock poisoned");
        let session = guard
            .get_mut(evidence_id)
            .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))?;
        if session.phase != Phase::Commit {
            return Err(VerificationError::WrongPhase {
                evidence_id: evidence_id.clone(),
                phase: session.phase,
            });
        }
        if session.commits.len() < MIN_INSPECTORS {
            return Err(VerificationError::InsufficientCommits {
                committed: session.commits.len(),
                required: MIN_INSPECTORS,
            });
        }
        session.phase = Phase::Reveal;
        Ok(())
    }

    #[instrument(skip(self, nonce, justification_content_id))]
    pub fn reveal(
        &self,
        evidence_id: &EvidenceId,
        inspector: &WalletAddress,
        verdict: Verdict,
        nonce: &str,
        justification_content_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        if justification_content_id.chars().count() < MIN_JUSTIFICATION_LEN {
            return Err(VerificationError::JustificationTooShort);
        }

        let mut guard = self.sessions.write().expect("verification sessions lock poisoned");
        let session = guard
            .get_mut(evidence_id)
            .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))?;

        if session.phase != Phase::Reveal {
            return Err(VerificationError::WrongPhase {
                evidence_id: evidence_id.clone(),
                phase: session.phase,
            });
        }
        if now > session.reveal_deadline {
            return Err(VerificationError::DeadlinePassed(evidence_id.clone()));
        }
        if !session.is_panelist(inspector) {
            return Err(VerificationError::NotPanelist(inspector.clone()));
        }
        if session.reveals.contains_key(inspector) {
            return Err(VerificationError::AlreadyRevealed(inspector.clone()));
        }
        let commit = session
            .commits
            .get(inspector)
            .ok_or_else(|| VerificationError::NoCommitFound(inspector.clone()))?;

        let expected = generate_commit_hash(verdict, nonce);
        if expected != commit.hash {
            warn!(
                inspector = %inspector,
                evidence_id = %evidence_id,
                expected = %hex::encode(expected),
                committed = %hex::encode(commit.hash),
                "reveal does not match committed hash; this attempt has been logged as a tamper event"
            );
            return Err(VerificationError::HashMismatch(inspector.clone()));
        }

        session.reveals.insert(
            inspector.clone(),
            Reveal {
                inspector: inspector.clone(),
                verdict,
                nonce: nonce.to_string(),
                justification_content_id: justification_content_id.to_string(),
                revealed_at: now,
            },
        );
        Ok(())
    }

    /// Tallies revealed votes weighted by each panelist's current
    /// credibility, applies the consensus threshold, and updates
    /// reputations — mutated only here, at finalization, never
    /// mid-session (spec.md §4.8).
    #[instrument(skip(self, inspectors))]
    pub fn finalize(
        &self,
        evidence_id: &EvidenceId,
        inspectors: &InspectorRegistry,
    ) -> Result<(VerificationSession, FinalVerdict), VerificationError> {
        let (panel, reveals) = {
            let guard = self.sessions.read().expect("verification sessions lock poisoned");
            let session = guard
                .get(evidence_id)
                .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))?;
            if session.phase != Phase::Reveal {
                return Err(VerificationError::WrongPhase {
                    evidence_id: evidence_id.clone(),
                    phase: session.phase,
                });
            }
            if session.reveals.len() < MIN_INSPECTORS {
                return Err(VerificationError::InsufficientReveals {
                    revealed: session.reveals.len(),
                    required: MIN_INSPECTORS,
                });
            }
            (session.panel.clone(), session.reveals.clone())
        };

        let mut breakdown = VoteBreakdown::default();
        let mut weight_by_inspector = HashMap::new();
        for wallet in &panel {
            if let Some(reveal) = reveals.get(wallet) {
                let weight = inspectors.credibility_of(wallet)?;
                breakdown.add(reveal.verdict, weight);
                weight_by_inspector.insert(wallet.clone(), (reveal.verdict, weight));
            }
        }

        let final_verdict = breakdown.consensus(CONSENSUS_THRESHOLD);

        // The decision's numeric verdict: VERIFIED/REJECTED carry an
        // explicit one (AUTHENTIC/FAKE); DISPUTED has none by
        // definition, so the plurality vote by weight stands in as
        // the reference a DISPUTED reputation update compares against
        // (an Open Question resolution, recorded in DESIGN.md).
        let decision_verdict = match final_verdict {
            FinalVerdict::Verified => Some(Verdict::Authentic),
            FinalVerdict::Rejected => Some(Verdict::Fake),
            FinalVerdict::Disputed => plurality_vote(&weight_by_inspector),
        };

        for (wallet, (verdict, _)) in &weight_by_inspector {
            let was_outlier = decision_verdict.map(|d| d != *verdict).unwrap_or(false);
            inspectors.record_finalized_vote(wallet, was_outlier)?;
        }

        let mut guard = self.sessions.write().expect("verification sessions lock poisoned");
        let session = guard
            .get_mut(evidence_id)
            .ok_or_else(|| VerificationError::NotFound(evidence_id.clone()))?;
        session.phase = Phase::Finalized;
        session.tally = Some(breakdown);
        session.final_verdict = Some(final_verdict);
        session.finalized_at = Some(Utc::now());

        Ok((session.clone(), final_verdict))
    }
}

fn plurality_vote(weights: &HashMap<WalletAddress, (Verdict, f64)>) -> Option<Verdict> {
    let mut totals: HashMap<u64, f64> = HashMap::new();
    for (verdict, weight) in weights.values() {
        *totals.entry(verdict.code()).or_insert(0.0) += weight;
    }
    totals
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .and_then(|(code, _)| Verdict::from_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use whistlechain_inspector_registry::NewInspector;

    fn pool_of(n: usize) -> InspectorRegistry {
        let registry = InspectorRegistry::new();
        for i in 0..n {
            registry
                .register(NewInspector {
                    wallet: WalletAddress::from(format!("INSPECTOR{i}")),
                    display_name: format!("Inspector {i}"),
                    specializations: vec![Category::Financial],
                    department: "Oversight".into(),
                    employee_id: format!("EMP-{i}"),
                    jurisdiction: "National".into(),
                    experience_years: 2,
                })
                .unwrap();
        }
        registry
    }

    #[test]
    fn tampered_reveal_does_not_match_and_is_rejected() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 1);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let inspector = session.panel[0].clone();
        let now = Utc::now();

        let hash = generate_commit_hash(Verdict::Authentic, "nonce-1");
        engine.commit(&evidence_id, &inspector, hash, now).unwrap();
        engine.advance_to_reveal(&evidence_id).unwrap();

        let err = engine
            .reveal(&evidence_id, &inspector, Verdict::Fake, "nonce-1", "cid-justify", now)
            .unwrap_err();
        assert!(matches!(err, VerificationError::HashMismatch(_)));
    }

    #[test]
    fn matching_reveal_is_accepted() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 2);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let inspector = session.panel[0].clone();
        let now = Utc::now();

        let hash = generate_commit_hash(Verdict::Authentic, "nonce-2");
        engine.commit(&evidence_id, &inspector, hash, now).unwrap();
        engine.advance_to_reveal(&evidence_id).unwrap();
        assert!(engine
            .reveal(&evidence_id, &inspector, Verdict::Authentic, "nonce-2", "cid-justify", now)
            .is_ok());
    }

    #[test]
    fn reveal_rejects_short_justification() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 10);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let inspector = session.panel[0].clone();
        let now = Utc::now();
        let hash = generate_commit_hash(Verdict::Authentic, "n");
        engine.commit(&evidence_id, &inspector, hash, now).unwrap();
        engine.advance_to_reveal(&evidence_id).unwrap();

        let err = engine
            .reveal(&evidence_id, &inspector, Verdict::Authentic, "n", "cid", now)
            .unwrap_err();
        assert!(matches!(err, VerificationError::JustificationTooShort));
    }

    #[test]
    fn commit_past_deadline_is_rejected() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 11);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let inspector = session.panel[0].clone();
        let past_deadline = session.reveal_deadline + Duration::seconds(1);

        let hash = generate_commit_hash(Verdict::Authentic, "n12345");
        let err = engine
            .commit(&evidence_id, &inspector, hash, past_deadline)
            .unwrap_err();
        assert!(matches!(err, VerificationError::DeadlinePassed(_)));
    }

    #[test]
    fn panel_is_drawn_without_replacement() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(5);
        let evidence_id = EvidenceId::from_counter(2026, 3);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let mut panel = session.panel.clone();
        panel.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        panel.dedup();
        assert_eq!(panel.len(), session.panel.len());
    }

    #[test]
    fn insufficient_pool_is_rejected() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(2);
        let evidence_id = EvidenceId::from_counter(2026, 4);
        let err = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap_err();
        assert!(matches!(err, VerificationError::InsufficientPanel { .. }));
    }

    #[test]
    fn unanimous_authentic_vote_reaches_verified() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 5);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let now = Utc::now();

        for (i, wallet) in session.panel.iter().enumerate() {
            let nonce = format!("nonce-{i}");
            let hash = generate_commit_hash(Verdict::Authentic, &nonce);
            engine.commit(&evidence_id, wallet, hash, now).unwrap();
        }
        engine.advance_to_reveal(&evidence_id).unwrap();
        for (i, wallet) in session.panel.iter().enumerate() {
            let nonce = format!("nonce-{i}");
            engine
                .reveal(&evidence_id, wallet, Verdict::Authentic, &nonce, "cid-justify", now)
                .unwrap();
        }

        let (_, verdict) = engine.finalize(&evidence_id, &inspectors).unwrap();
        assert_eq!(verdict, FinalVerdict::Verified);
    }

    #[test]
    fn split_panel_is_disputed() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 6);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let now = Utc::now();

        let verdicts = [Verdict::Authentic, Verdict::Fake, Verdict::Inconclusive];
        for (i, wallet) in session.panel.iter().enumerate() {
            let nonce = format!("nonce-{i}");
            let hash = generate_commit_hash(verdicts[i], &nonce);
            engine.commit(&evidence_id, wallet, hash, now).unwrap();
        }
        engine.advance_to_reveal(&evidence_id).unwrap();
        for (i, wallet) in session.panel.iter().enumerate() {
            let nonce = format!("nonce-{i}");
            engine
                .reveal(&evidence_id, wallet, verdicts[i], &nonce, "cid-justify", now)
                .unwrap();
        }

        let (_, verdict) = engine.finalize(&evidence_id, &inspectors).unwrap();
        assert_eq!(verdict, FinalVerdict::Disputed);
    }

    #[test]
    fn finalize_requires_at_least_three_reveals() {
        let engine = VerificationEngine::new();
        let inspectors = pool_of(3);
        let evidence_id = EvidenceId::from_counter(2026, 7);
        let session = engine
            .begin_verification(&evidence_id, Category::Financial, &inspectors)
            .unwrap();
        let now = Utc::now();

        for (i, wallet) in session.panel.iter().enumerate() {
            let nonce = format!("nonce-{i}");
            let hash = generate_commit_hash(Verdict::Authentic, &nonce);
            engine.commit(&evidence_id, wallet, hash, now).unwrap();
        }
        engine.advance_to_reveal(&evidence_id).unwrap();
        for (i, wallet) in session.panel.iter().take(2).enumerate() {
            let nonce = format!("nonce-{i}");
            engine
                .reveal(&evidence_id, wallet, Verdict::Authentic, &nonce, "cid-justify", now)
                .unwrap();
        }

        let err = engine.finalize(&evidence_id, &inspectors).unwrap_err();
        assert!(matches!(err, VerificationError::InsufficientReveals { .. }));
    }
}
