// [libs/domain/inspector-registry/src/lib.rs]
//! The pool of registered inspectors, from which verification panels
//! are drawn (spec.md §4.7). Field set and the register/update-profile
//! split are grounded on
//! `original_source/backend/services/verification.py`'s
//! `register_inspector`/`update_inspector_profile` pair.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, instrument};
use whistlechain_domain_models::{
    Availability, Category, Inspector, InspectorProfilePatch, Reputation, WalletAddress,
};

#[derive(Debug, Error)]
pub enum InspectorRegistryError {
    #[error("inspector {0} is already registered")]
    AlreadyRegistered(WalletAddress),
    #[error("no inspector registered at {0}")]
    NotFound(WalletAddress),
    #[error("only {available} eligible inspectors available, need at least {required}")]
    InsufficientPool { available: usize, required: usize },
}

pub struct NewInspector {
    pub wallet: WalletAddress,
    pub display_name: String,
    pub specializations: Vec<Category>,
    pub department: String,
    pub employee_id: String,
    pub jurisdiction: String,
    pub experience_years: u32,
}

#[derive(Default)]
pub struct InspectorRegistry {
    inspectors: RwLock<HashMap<WalletAddress, Inspector>>,
}

impl InspectorRegistry {
    pub fn new() -> Self {
        Self {
            inspectors: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self, new_inspector), fields(wallet = %new_inspector.wallet))]
    pub fn register(&self, new_inspector: NewInspector) -> Result<Inspector, InspectorRegistryError> {
        let mut guard = self.inspectors.write().expect("inspector registry lock poisoned");
        if guard.contains_key(&new_inspector.wallet) {
            return Err(InspectorRegistryError::AlreadyRegistered(new_inspector.wallet));
        }
        debug!("registering new inspector");
        let inspector = Inspector {
            wallet: new_inspector.wallet.clone(),
            display_name: new_inspector.display_name,
            specializations: new_inspector.specializations,
            department: new_inspector.department,
            employee_id: new_inspector.employee_id,
            jurisdiction: new_inspector.jurisdiction,
            experience_years: new_inspector.experience_years,
            registered_at: Utc::now(),
            availability: Availability::Available,
            reputation: Reputation::default(),
            cases_assigned: 0,
        };
        guard.insert(new_inspector.wallet, inspector.clone());
        Ok(inspector)
    }

    /// Applies the editable subset of an inspector's profile. Wallet,
    /// reputation and case history are not reachable through a patch.
    pub fn update_profile(
        &self,
        wallet: &WalletAddress,
        patch: InspectorProfilePatch,
    ) -> Result<Inspector, InspectorRegistryError> {
        let mut guard = self.inspectors.write().expect("inspector registry lock poisoned");
        let inspector = guard
            .get_mut(wallet)
            .ok_or_else(|| InspectorRegistryError::NotFound(wallet.clone()))?;
        if let Some(name) = patch.display_name {
            inspector.display_name = name;
        }
        if let Some(specializations) = patch.specializations {
            inspector.specializations = specializations;
        }
        if let Some(department) = patch.department {
            inspector.department = department;
        }
        if let Some(employee_id) = patch.employee_id {
            inspector.employee_id = employee_id;
        }
        if let Some(jurisdiction) = patch.jurisdiction {
            inspector.jurisdiction = jurisdiction;
        }
        if let Some(experience_years) = patch.experience_years {
            inspector.experience_years = experience_years;
        }
        if let Some(availability) = patch.availability {
            inspector.availability = availability;
        }
        Ok(inspector.clone())
    }

    pub fn get(&self, wallet: &WalletAddress) -> Result<Inspector, InspectorRegistryError> {
        self.inspectors
            .read()
            .expect("inspector registry lock poisoned")
            .get(wallet)
            .cloned()
            .ok_or_else(|| InspectorRegistryError::NotFound(wallet.clone()))
    }

    /// The eligible draw pool: available inspectors, optionally
    /// filtered to a category specialization (`pool(category?)`, spec.md
    /// §4.7).
    pub fn eligible_pool(&self, category: Option<Category>) -> Vec<Inspector> {
        self.inspectors
            .read()
            .expect("inspector registry lock poisoned")
            .values()
            .filter(|i| i.is_eligible_for_draw())
            .filter(|i| category.map(|c| i.specializes_in(c)).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn credibility_of(&self, wallet: &WalletAddress) -> Result<f64, InspectorRegistryError> {
        Ok(self.get(wallet)?.reputation.credibility_weight())
    }

    pub fn increment_cases_assigned(&self, wallet: &WalletAddress) -> Result<(), InspectorRegistryError> {
        let mut guard = self.inspectors.write().expect("inspector registry lock poisoned");
        let inspector = guard
            .get_mut(wallet)
            .ok_or_else(|| InspectorRegistryError::NotFound(wallet.clone()))?;
        inspector.cases_assigned += 1;
        Ok(())
    }

    /// Reputation is mutated only at finalization time (spec.md §4.8) —
    /// never mid-session, so a disputed or still-open case can't shift
    /// an inspector's standing before the tally is final.
    pub fn record_finalized_vote(
        &self,
        wallet: &WalletAddress,
        was_outlier: bool,
    ) -> Result<(), InspectorRegistryError> {
        let mut guard = self.inspectors.write().expect("inspector registry lock poisoned");
        let inspector = guard
            .get_mut(wallet)
            .ok_or_else(|| InspectorRegistryError::NotFound(wallet.clone()))?;
        inspector.reputation.record_vote(was_outlier);
        Ok(())
    }

    pub fn all(&self) -> Vec<Inspector> {
        self.inspectors
            .read()
            .expect("inspector registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(wallet: &str) -> NewInspector {
        NewInspector {
            wallet: WalletAddress::from(wallet),
            display_name: "Inspector".into(),
            specializations: vec![Category::Food],
            department: "Oversight".into(),
            employee_id: "EMP-1".into(),
            jurisdiction: "National".into(),
            experience_years: 4,
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = InspectorRegistry::new();
        registry.register(sample("INSPECTOR1")).unwrap();
        let err = registry.register(sample("INSPECTOR1")).unwrap_err();
        assert!(matches!(err, InspectorRegistryError::AlreadyRegistered(_)));
    }

    #[test]
    fn on_leave_inspectors_are_excluded_from_draw_pool() {
        let registry = InspectorRegistry::new();
        let wallet = WalletAddress::from("INSPECTOR2");
        registry.register(sample("INSPECTOR2")).unwrap();
        registry
            .update_profile(
                &wallet,
                InspectorProfilePatch {
                    availability: Some(Availability::OnLeave),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(registry.eligible_pool(None).is_empty());
    }

    #[test]
    fn specialization_filter_narrows_the_pool() {
        let registry = InspectorRegistry::new();
        registry.register(sample("INSPECTOR3")).unwrap();
        assert_eq!(registry.eligible_pool(Some(Category::Food)).len(), 1);
        assert_eq!(registry.eligible_pool(Some(Category::Academic)).len(), 0);
    }
}
