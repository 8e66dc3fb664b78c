//! Session-scoped consent storage.

use super::grant::{Capability, ConsentGrant};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Grants given by the human during one session.
///
/// The store is owned by the session and passed to the broker by reference.
/// Wrap it in an `Arc` to share it read-only with a UI layer.
#[derive(Debug, Default)]
pub struct ConsentStore {
    grants: RwLock<BTreeMap<Capability, ConsentGrant>>,
}

impl ConsentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether standing consent exists for `capability`.
    pub fn has_consent(&self, capability: Capability) -> bool {
        self.grants.read().contains_key(&capability)
    }

    /// Record consent for `capability`.
    ///
    /// Idempotent: a repeated grant returns the original one unchanged,
    /// including its timestamp.
    pub fn grant(&self, capability: Capability) -> ConsentGrant {
        let mut grants = self.grants.write();
        grants
            .entry(capability)
            .or_insert_with(|| {
                log::info!("Consent granted for {}", capability);
                ConsentGrant::new(capability)
            })
            .clone()
    }

    /// The grant recorded for `capability`, if any.
    pub fn grant_for(&self, capability: Capability) -> Option<ConsentGrant> {
        self.grants.read().get(&capability).cloned()
    }

    /// All grants, ordered by capability.
    pub fn grants(&self) -> Vec<ConsentGrant> {
        self.grants.read().values().cloned().collect()
    }
}
