//! Per-provider write serialization.
//!
//! The consistency check reads the store and the write follows it; holding
//! the provider's lock across both keeps two concurrent writers from passing
//! the check against the same snapshot. Only covers a single process.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct ProviderLocks {
    inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

/// Holds every acquired provider lock until dropped.
#[must_use]
pub struct ProviderGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
    providers: Vec<Uuid>,
}

impl ProviderGuard {
    pub fn providers(&self) -> &[Uuid] { &self.providers }
}

impl ProviderLocks {
    pub fn new() -> Self { Self::default() }

    fn slot(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.inner.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Lock all `providers` in ascending id order, so two writers touching
    /// the same pair cannot deadlock.
    pub async fn acquire(&self, providers: &[Uuid]) -> ProviderGuard {
        let mut ids = providers.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in &ids {
            guards.push(self.slot(*id).lock_owned().await);
        }
        ProviderGuard { _guards: guards, providers: ids }
    }

    /// Drop the lock entry of a deleted provider.
    pub fn forget(&self, id: Uuid) {
        self.inner.remove_if(&id, |_, m| Arc::strong_count(m) == 1);
    }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}
