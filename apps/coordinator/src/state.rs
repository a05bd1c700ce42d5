// [apps/coordinator/src/state.rs]
//! Composition root: one `Arc`-wrapped engine per component (C1-C12),
//! shared behind `axum::extract::State`. Each engine owns its own
//! per-table lock (spec.md §5); `AppState` itself adds only the
//! process-wide liveness flag a health-check middleware reads.

use std::sync::{Arc, RwLock};

use whistlechain_audit::AuditEngine;
use whistlechain_bounty::BountyEngine;
use whistlechain_inspector_registry::InspectorRegistry;
use whistlechain_ledger_client::LedgerClient;
use whistlechain_object_store::ObjectStoreClient;
use whistlechain_publication::PublicationEngine;
use whistlechain_resolution::ResolutionEngine;
use whistlechain_submission_store::SubmissionStore;
use whistlechain_verification::VerificationEngine;

use crate::config::Config;

/// Liveness gate read by [`crate::middleware::health_guard`]. The
/// coordinator starts `Operational`; an operator can flip it to
/// `Maintenance` to drain in-flight work without killing the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMode {
    Operational,
    Maintenance(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<LedgerClient>,
    pub object_store: Arc<ObjectStoreClient>,
    pub submissions: Arc<SubmissionStore>,
    pub inspectors: Arc<InspectorRegistry>,
    pub verification: Arc<VerificationEngine>,
    pub resolution: Arc<ResolutionEngine>,
    pub bounty: Arc<BountyEngine>,
    pub audit: Arc<AuditEngine>,
    pub publication: Arc<PublicationEngine>,
    mode: Arc<RwLock<SystemMode>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            ledger: Arc::new(LedgerClient::new(config.evidence_registry_app_id)),
            object_store: Arc::new(ObjectStoreClient::new(config.pinata_jwt.clone())),
            submissions: Arc::new(SubmissionStore::new()),
            inspectors: Arc::new(InspectorRegistry::new()),
            verification: Arc::new(VerificationEngine::new()),
            resolution: Arc::new(ResolutionEngine::new()),
            bounty: Arc::new(BountyEngine::new()),
            audit: Arc::new(AuditEngine::new()),
            publication: Arc::new(PublicationEngine::new()),
            mode: Arc::new(RwLock::new(SystemMode::Operational)),
            config,
        }
    }

    pub fn is_operational(&self) -> Result<(), String> {
        match &*self.mode.read().expect("system mode lock poisoned") {
            SystemMode::Operational => Ok(()),
            SystemMode::Maintenance(reason) => Err(reason.clone()),
        }
    }

    pub fn set_mode(&self, mode: SystemMode) {
        *self.mode.write().expect("system mode lock poisoned") = mode;
    }
}
