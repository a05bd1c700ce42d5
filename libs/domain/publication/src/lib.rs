// [libs/domain/publication/src/lib.rs]
//! Fans a verified case out across four channels (spec.md §4.12): a
//! microblog post, a broadcast-channel post, an email fan-out to a
//! compiled contact list, and a statutory right-to-information filing.
//! The base implementation only records the posts it would send — the
//! channel connectors are pluggable and never called from here.

use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::instrument;
use whistlechain_domain_models::{
    Category, ChannelPost, Contact, ContactKind, EvidenceId, FinalVerdict, PublicationChannel,
    PublicationRecord,
};

#[derive(Debug, Error)]
pub enum PublicationError {
    #[error("evidence {0} has already been published")]
    AlreadyPublished(EvidenceId),
    #[error("no publication record for evidence {0}")]
    NotFound(EvidenceId),
    #[error("publish_all requires a VERIFIED verdict, got {0}")]
    NotVerified(FinalVerdict),
    #[error("evidence {0} is not scheduled for deferred publication")]
    NotScheduled(EvidenceId),
    #[error("evidence {0} cannot be cancelled: its scheduled publish time has already elapsed")]
    PastScheduledTime(EvidenceId),
}

fn media_contacts() -> Vec<Contact> {
    vec![
        Contact {
            name: "National Press Wire".into(),
            address: "tips@nationalpresswire.example".into(),
            kind: ContactKind::Media,
        },
        Contact {
            name: "Open Ledger Desk".into(),
            address: "desk@openledger.example".into(),
            kind: ContactKind::Media,
        },
    ]
}

fn government_contacts() -> Vec<Contact> {
    vec![
        Contact {
            name: "Office of the Inspector General".into(),
            address: "filings@oig.example.gov".into(),
            kind: ContactKind::Government,
        },
        Contact {
            name: "Right to Information Registrar".into(),
            address: "registrar@rti.example.gov".into(),
            kind: ContactKind::Government,
        },
    ]
}

fn category_contacts(category: Category) -> Vec<Contact> {
    let (name, address) = match category {
        Category::Financial => ("Financial Conduct Desk", "conduct@fincomply.example.gov"),
        Category::Construction => ("Building Standards Authority", "standards@buildsafe.example.gov"),
        Category::Food => ("Food Safety Authority", "alerts@foodsafety.example.gov"),
        Category::Academic => ("Research Integrity Office", "integrity@research.example.gov"),
    };
    vec![Contact {
        name: name.to_string(),
        address: address.to_string(),
        kind: ContactKind::Category,
    }]
}

/// `MEDIA_CONTACTS ∪ GOVERNMENT_CONTACTS ∪ CATEGORY_CONTACTS[category]`.
pub fn contacts_for(category: Category) -> Vec<Contact> {
    let mut contacts = media_contacts();
    contacts.extend(government_contacts());
    contacts.extend(category_contacts(category));
    contacts
}

pub struct PublishRequest<'a> {
    pub evidence_id: &'a EvidenceId,
    pub category: Category,
    pub organization: &'a str,
    pub description: &'a str,
    pub content_id: &'a str,
    pub verdict: FinalVerdict,
}

pub struct PublicationEngine {
    records: RwLock<HashMap<EvidenceId, PublicationRecord>>,
    rti_counter: RwLock<u64>,
}

impl Default for PublicationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicationEngine {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            rti_counter: RwLock::new(0),
        }
    }

    fn next_rti_reference(&self) -> String {
        let mut counter = self.rti_counter.write().expect("rti counter lock poisoned");
        *counter += 1;
        format!("RTI/{}/WC/{:05}", Utc::now().year(), *counter)
    }

    /// Builds and stores the four channel posts for a verified case.
    /// Already-published evidence is rejected outright; evidence with a
    /// prior schedule entry is published in place, replacing it.
    #[instrument(skip(self, description))]
    pub fn publish_all(&self, request: PublishRequest<'_>) -> Result<PublicationRecord, PublicationError> {
        if request.verdict != FinalVerdict::Verified {
            return Err(PublicationError::NotVerified(request.verdict));
        }
        {
            let guard = self.records.read().expect("publication records lock poisoned");
            if let Some(existing) = guard.get(request.evidence_id) {
                if existing.published_at.is_some() {
                    return Err(PublicationError::AlreadyPublished(request.evidence_id.clone()));
                }
            }
        }

        let contacts = contacts_for(request.category);
        let rti_reference = self.next_rti_reference();

        let microblog_body = format!(
            "Evidence {} against {} in category {} has been independently verified. Details: {}",
            request.evidence_id, request.organization, request.category, request.content_id
        );
        let broadcast_body = format!(
            "VERIFIED: {} ({}) — {}",
            request.organization, request.category, request.description
        );
        let email_body = format!(
            "A whistleblower submission concerning {} has been verified and filed under {}. Evidence reference: {}.",
            request.organization, rti_reference, request.content_id
        );
        let filing_body = format!(
            "Statutory filing {rti_reference}: verified evidence against {} ({}).",
            request.organization, request.category
        );

        let posts = vec![
            ChannelPost {
                channel: PublicationChannel::Microblog,
                body: microblog_body,
                recipients: Vec::new(),
            },
            ChannelPost {
                channel: PublicationChannel::Broadcast,
                body: broadcast_body,
                recipients: Vec::new(),
            },
            ChannelPost {
                channel: PublicationChannel::Email,
                body: email_body,
                recipients: contacts.iter().map(|c| c.address.clone()).collect(),
            },
            ChannelPost {
                channel: PublicationChannel::StatutoryFiling,
                body: filing_body,
                recipients: contacts
                    .iter()
                    .filter(|c| c.kind == ContactKind::Government)
                    .map(|c| c.address.clone())
                    .collect(),
            },
        ];

        let record = PublicationRecord {
            evidence_id: request.evidence_id.clone(),
            rti_reference,
            posts,
            scheduled_for: None,
            published_at: Some(Utc::now()),
            cancelled: false,
        };

        self.records
            .write()
            .expect("publication records lock poisoned")
            .insert(request.evidence_id.clone(), record.clone());
        Ok(record)
    }

    /// Records a deferred publication; the posts themselves are built
    /// when `due()` is drained and `publish_all` is actually invoked by
    /// the caller, not here.
    pub fn schedule(&self, evidence_id: &EvidenceId, delay_seconds: i64) -> PublicationRecord {
        let record = PublicationRecord {
            evidence_id: evidence_id.clone(),
            rti_reference: String::new(),
            posts: Vec::new(),
            scheduled_for: Some(Utc::now() + Duration::seconds(delay_seconds)),
            published_at: None,
            cancelled: false,
        };
        self.records
            .write()
            .expect("publication records lock poisoned")
            .insert(evidence_id.clone(), record.clone());
        record
    }

    /// Refuses cancellation once `scheduled_for` has already elapsed —
    /// the publication may already be in flight by then.
    pub fn cancel(&self, evidence_id: &EvidenceId) -> Result<(), PublicationError> {
        let mut guard = self.records.write().expect("publication records lock poisoned");
        let record = guard
            .get_mut(evidence_id)
            .ok_or_else(|| PublicationError::NotFound(evidence_id.clone()))?;
        let scheduled_for = record
            .scheduled_for
            .ok_or_else(|| PublicationError::NotScheduled(evidence_id.clone()))?;
        if Utc::now() >= scheduled_for {
            return Err(PublicationError::PastScheduledTime(evidence_id.clone()));
        }
        record.cancelled = true;
        Ok(())
    }

    /// The subset of scheduled, not-yet-published, not-cancelled
    /// records whose `scheduled_for` has elapsed.
    pub fn due(&self) -> Vec<PublicationRecord> {
        let now: DateTime<Utc> = Utc::now();
        self.records
            .read()
            .expect("publication records lock poisoned")
            .values()
            .filter(|r| !r.cancelled && r.published_at.is_none())
            .filter(|r| r.scheduled_for.map(|t| t <= now).unwrap_or(false))
            .cloned()
            .collect()
    }

    pub fn get(&self, evidence_id: &EvidenceId) -> Result<PublicationRecord, PublicationError> {
        self.records
            .read()
            .expect("publication records lock poisoned")
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| PublicationError::NotFound(evidence_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_all_requires_a_verified_verdict() {
        let engine = PublicationEngine::new();
        let id = EvidenceId::from_counter(2026, 1);
        let err = engine
            .publish_all(PublishRequest {
                evidence_id: &id,
                category: Category::Food,
                organization: "Acme",
                description: "desc",
                content_id: "simCID-1",
                verdict: FinalVerdict::Disputed,
            })
            .unwrap_err();
        assert!(matches!(err, PublicationError::NotVerified(_)));
    }

    #[test]
    fn publish_all_builds_four_channel_posts() {
        let engine = PublicationEngine::new();
        let id = EvidenceId::from_counter(2026, 2);
        let record = engine
            .publish_all(PublishRequest {
                evidence_id: &id,
                category: Category::Food,
                organization: "Acme",
                description: "desc",
                content_id: "simCID-2",
                verdict: FinalVerdict::Verified,
            })
            .unwrap();
        assert_eq!(record.posts.len(), 4);
        assert!(record.rti_reference.contains("RTI/"));
        assert!(record.published_at.is_some());
    }

    #[test]
    fn rti_counter_increments_across_publications() {
        let engine = PublicationEngine::new();
        let id1 = EvidenceId::from_counter(2026, 3);
        let id2 = EvidenceId::from_counter(2026, 4);
        let first = engine
            .publish_all(PublishRequest {
                evidence_id: &id1,
                category: Category::Food,
                organization: "Acme",
                description: "desc",
                content_id: "simCID-3",
                verdict: FinalVerdict::Verified,
            })
            .unwrap();
        let second = engine
            .publish_all(PublishRequest {
                evidence_id: &id2,
                category: Category::Food,
                organization: "Acme",
                description: "desc",
                content_id: "simCID-4",
                verdict: FinalVerdict::Verified,
            })
            .unwrap();
        assert_ne!(first.rti_reference, second.rti_reference);
    }

    #[test]
    fn scheduled_publication_is_cancellable_before_it_elapses() {
        let engine = PublicationEngine::new();
        let id = EvidenceId::from_counter(2026, 5);
        engine.schedule(&id, 3600);
        assert!(engine.cancel(&id).is_ok());
        assert!(engine.get(&id).unwrap().cancelled);
    }

    #[test]
    fn past_due_schedule_cannot_be_cancelled() {
        let engine = PublicationEngine::new();
        let id = EvidenceId::from_counter(2026, 6);
        engine.schedule(&id, -10);
        let err = engine.cancel(&id).unwrap_err();
        assert!(matches!(err, PublicationError::PastScheduledTime(_)));
    }

    #[test]
    fn due_returns_only_elapsed_unpublished_schedules() {
        let engine = PublicationEngine::new();
        let elapsed = EvidenceId::from_counter(2026, 7);
        let future = EvidenceId::from_counter(2026, 8);
        engine.schedule(&elapsed, -5);
        engine.schedule(&future, 3600);
        let due = engine.due();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].evidence_id, elapsed);
    }
}
