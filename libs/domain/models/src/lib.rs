// [libs/domain/models/src/lib.rs]
//! Shared entity types for the evidence-custody and adjudication
//! coordinator. Every other crate in the workspace depends on this one
//! for its vocabulary; it has no outbound dependency on the rest of the
//! workspace.

pub mod evidence;
pub mod ids;
pub mod inspector;
pub mod records;
pub mod verification;

pub use evidence::{Category, EvidenceItem, FinalVerdict, LifecycleStatus};
pub use ids::{EvidenceId, WalletAddress};
pub use inspector::{Availability, Inspector, InspectorProfilePatch, Reputation};
pub use records::{
    AuditRecord, AuditTimeline, AuditTxReferences, AuditVerificationSummary, BountyRecord,
    BountyStatus, ChannelPost, Contact, ContactKind, InspectorVoteSummary, PublicationChannel,
    PublicationRecord, ResolutionAction, ResolutionRecord,
};
pub use verification::{Commit, Phase, Reveal, Verdict, VerificationSession, VoteBreakdown};
