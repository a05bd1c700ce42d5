// [apps/coordinator/src/error.rs]
//! Maps every engine error onto the four-kind HTTP error model of
//! spec.md §7: `ValidationError`/`StateError`/`CryptoError` surface as
//! 4xx with no state change, `NotFound` as 404, and `LedgerFailure`/
//! `DependencyFailure` are handled inline by the call sites that can
//! annotate-and-continue — this enum only covers the paths where a
//! ledger or object-store failure must still fail the request (e.g. a
//! read-only projection with nothing to annotate).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use whistlechain_audit::AuditError;
use whistlechain_bounty::BountyError;
use whistlechain_core_wallet::WalletError;
use whistlechain_inspector_registry::InspectorRegistryError;
use whistlechain_ledger_client::LedgerError;
use whistlechain_publication::PublicationError;
use whistlechain_resolution::ResolutionError;
use whistlechain_sealed_bundle::SealError;
use whistlechain_stake_policy::StakePolicyError;
use whistlechain_submission_store::SubmissionStoreError;
use whistlechain_verification::VerificationError;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    State(String),
    #[error("hash mismatch: expected {expected}, committed {committed}")]
    Crypto { expected: String, committed: String },
    #[error("{0}")]
    NotFound(String),
    #[error("ledger call failed: {0}")]
    LedgerFailure(String),
    #[error("dependency unavailable: {0}")]
    DependencyFailure(String),
}

impl From<StakePolicyError> for CoordinatorError {
    fn from(err: StakePolicyError) -> Self {
        CoordinatorError::Validation(err.to_string())
    }
}

impl From<WalletError> for CoordinatorError {
    fn from(err: WalletError) -> Self {
        CoordinatorError::Validation(err.to_string())
    }
}

impl From<SealError> for CoordinatorError {
    fn from(err: SealError) -> Self {
        CoordinatorError::Validation(err.to_string())
    }
}

impl From<InspectorRegistryError> for CoordinatorError {
    fn from(err: InspectorRegistryError) -> Self {
        match err {
            InspectorRegistryError::NotFound(_) => CoordinatorError::NotFound(err.to_string()),
            InspectorRegistryError::AlreadyRegistered(_) => CoordinatorError::State(err.to_string()),
            InspectorRegistryError::InsufficientPool { .. } => CoordinatorError::Validation(err.to_string()),
        }
    }
}

impl From<VerificationError> for CoordinatorError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::NotFound(_) => CoordinatorError::NotFound(err.to_string()),
            VerificationError::HashMismatch(_) => CoordinatorError::Crypto {
                expected: "see server log".to_string(),
                committed: "see server log".to_string(),
            },
            VerificationError::JustificationTooShort | VerificationError::NotPanelist(_) => {
                CoordinatorError::Validation(err.to_string())
            }
            VerificationError::InsufficientCommits { .. }
            | VerificationError::InsufficientReveals { .. }
            | VerificationError::InsufficientPanel { .. } => CoordinatorError::Validation(err.to_string()),
            VerificationError::Registry(inner) => inner.into(),
            VerificationError::AlreadyExists(_)
            | VerificationError::WrongPhase { .. }
            | VerificationError::AlreadyCommitted(_)
            | VerificationError::AlreadyRevealed(_)
            | VerificationError::NoCommitFound(_)
            | VerificationError::DeadlinePassed(_) => CoordinatorError::State(err.to_string()),
        }
    }
}

impl From<SubmissionStoreError> for CoordinatorError {
    fn from(err: SubmissionStoreError) -> Self {
        match err {
            SubmissionStoreError::NotFound(_) => CoordinatorError::NotFound(err.to_string()),
            SubmissionStoreError::AlreadyExists(_) | SubmissionStoreError::InvalidTransition { .. } => {
                CoordinatorError::State(err.to_string())
            }
        }
    }
}

impl From<ResolutionError> for CoordinatorError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NotFound(_) | ResolutionError::UnrecoverableSubmission(_) => {
                CoordinatorError::NotFound(err.to_string())
            }
            ResolutionError::AlreadyResolved(_) => CoordinatorError::State(err.to_string()),
            ResolutionError::Submission(inner) => inner.into(),
        }
    }
}

impl From<BountyError> for CoordinatorError {
    fn from(err: BountyError) -> Self {
        match err {
            BountyError::NotFound(_) => CoordinatorError::NotFound(err.to_string()),
            BountyError::AlreadyExists(_) => CoordinatorError::State(err.to_string()),
        }
    }
}

impl From<AuditError> for CoordinatorError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::NotFound(_) => CoordinatorError::NotFound(err.to_string()),
            AuditError::AlreadyPublished(_) | AuditError::NotFinalized(_) => CoordinatorError::State(err.to_string()),
        }
    }
}

impl From<PublicationError> for CoordinatorError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::NotFound(_) | PublicationError::NotScheduled(_) => CoordinatorError::NotFound(err.to_string()),
            PublicationError::NotVerified(_) => CoordinatorError::Validation(err.to_string()),
            PublicationError::AlreadyPublished(_) | PublicationError::PastScheduledTime(_) => {
                CoordinatorError::State(err.to_string())
            }
        }
    }
}

impl From<LedgerError> for CoordinatorError {
    fn from(err: LedgerError) -> Self {
        CoordinatorError::LedgerFailure(err.to_string())
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            CoordinatorError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CoordinatorError::State(_) => (StatusCode::CONFLICT, "STATE_ERROR"),
            CoordinatorError::Crypto { .. } => (StatusCode::BAD_REQUEST, "CRYPTO_ERROR"),
            CoordinatorError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CoordinatorError::LedgerFailure(_) => (StatusCode::BAD_GATEWAY, "LEDGER_FAILURE"),
            CoordinatorError::DependencyFailure(_) => (StatusCode::BAD_GATEWAY, "DEPENDENCY_FAILURE"),
        };
        let body = match &self {
            CoordinatorError::Crypto { expected, committed } => json!({
                "error": kind,
                "message": self.to_string(),
                "expected_hash": expected,
                "committed_hash": committed,
            }),
            _ => json!({
                "error": kind,
                "message": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
