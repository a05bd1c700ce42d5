// [apps/coordinator/src/handlers/submission.rs]
//! `POST /evidence/submit` and `GET /evidence/{id}` (spec.md §6) — the
//! submission pipeline: seal the uploaded files, pin the bundle, lock
//! the stake on-chain, and mint the off-chain evidence record keyed by
//! the id the ledger mints for the submission (spec.md §2, §4.1).

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Serialize;
use tracing::instrument;
use whistlechain_core_wallet::Wallet;
use whistlechain_domain_models::{Category, EvidenceId, EvidenceItem, LifecycleStatus};
use whistlechain_sealed_bundle::{seal, SealedFile};
use whistlechain_stake_policy::validate_stake;

use crate::error::CoordinatorError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub evidence: EvidenceItem,
    /// Present only when the caller did not supply a mnemonic: this is
    /// the only copy of the generated submitter wallet's seed phrase,
    /// and the coordinator does not retain it after this response.
    pub generated_mnemonic: Option<String>,
}

/// A single multipart "files" part collected before sealing.
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

#[instrument(skip(state, multipart))]
pub async fn submit_evidence(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, CoordinatorError> {
    let mut category_raw: Option<String> = None;
    let mut organization: Option<String> = None;
    let mut description: Option<String> = None;
    let mut mnemonic: Option<String> = None;
    let mut stake_micro: u64 = 0;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoordinatorError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "category" => category_raw = Some(field_text(field).await?),
            "organization" => organization = Some(field_text(field).await?),
            "description" => description = Some(field_text(field).await?),
            "mnemonic" => mnemonic = Some(field_text(field).await?),
            "stake" => {
                let raw = field_text(field).await?;
                stake_micro = raw
                    .parse()
                    .map_err(|_| CoordinatorError::Validation(format!("stake must be a non-negative integer, got {raw}")))?;
            }
            "files" | "files[]" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| CoordinatorError::Validation(format!("could not read file part: {e}")))?;
                files.push(UploadedFile {
                    name: filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let category_raw = category_raw.ok_or_else(|| CoordinatorError::Validation("category is required".into()))?;
    let category = Category::parse(&category_raw)
        .ok_or_else(|| CoordinatorError::Validation(format!("unknown category {category_raw}")))?;
    let organization = organization.ok_or_else(|| CoordinatorError::Validation("organization is required".into()))?;
    let description = description.ok_or_else(|| CoordinatorError::Validation("description is required".into()))?;
    validate_stake(category, stake_micro)?;

    let (wallet, generated_mnemonic) = match mnemonic {
        Some(phrase) => (Wallet::from_mnemonic(&phrase)?, None),
        None => {
            let wallet = Wallet::generate();
            let phrase = wallet.mnemonic_phrase();
            (wallet, Some(phrase))
        }
    };
    let submitter = wallet.address();

    let sealed_files: Vec<SealedFile> = files
        .into_iter()
        .map(|f| SealedFile {
            name: f.name,
            content: f.bytes,
        })
        .collect();
    let key = whistlechain_sealed_bundle::new_key();
    let bundle = seal(&key, &sealed_files)?;
    let pin = state.object_store.put("evidence-bundle.bin", &bundle).await;

    let submitted_at = Utc::now();

    // The ledger mints the evidence id as part of this call (spec.md
    // §3 Ownership); without a successful call there is no id to key
    // an off-chain record by, so a ledger failure here fails the whole
    // submission rather than being annotated and continued past.
    let receipt = state
        .ledger
        .submit_with_stake(
            submitted_at.year(),
            &category.to_string(),
            &pin.content_id,
            &submitter,
            wallet.verifying_key().as_bytes(),
            stake_micro,
            submitted_at.timestamp(),
        )
        .await?;
    let evidence_id = receipt.evidence_id;

    let evidence = EvidenceItem {
        id: evidence_id,
        category,
        target_organization: organization,
        description,
        submitter_wallet: submitter,
        stake_micro,
        content_id: pin.content_id,
        content_id_is_real: pin.is_real,
        submitted_at,
        status: LifecycleStatus::Pending,
        submission_tx_id: Some(receipt.tx_id),
        on_chain_error: None,
    };
    state.submissions.insert(evidence.clone())?;

    Ok(Json(SubmissionResponse {
        evidence,
        generated_mnemonic,
    }))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, CoordinatorError> {
    field
        .text()
        .await
        .map_err(|e| CoordinatorError::Validation(format!("malformed field: {e}")))
}

#[derive(Serialize)]
pub struct EvidenceView {
    #[serde(flatten)]
    pub evidence: EvidenceItem,
    pub verification: Option<whistlechain_domain_models::VerificationSession>,
}

#[instrument(skip(state))]
pub async fn get_evidence(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EvidenceView>, CoordinatorError> {
    let evidence_id = EvidenceId::from(id);
    let evidence = state.submissions.get(&evidence_id)?;
    let verification = state.verification.get(&evidence_id).ok();
    Ok(Json(EvidenceView { evidence, verification }))
}
