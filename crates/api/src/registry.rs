//! In-memory registry of opted-in Destiny membership IDs.
//!
//! Process-local and unpersisted; entries live until restart.

use indexmap::IndexSet;
use tokio::sync::RwLock;

/// Insertion-ordered set of membership IDs shared across requests.
#[derive(Debug, Default)]
pub struct OptInRegistry {
    members: RwLock<IndexSet<String>>,
}

impl OptInRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one membership ID. Returns `false` if it was already present.
    pub async fn add(&self, membership_id: impl Into<String>) -> bool {
        self.members.write().await.insert(membership_id.into())
    }

    /// Record several IDs under a single write lock; returns how many were new.
    pub async fn add_all<I>(&self, membership_ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut members = self.members.write().await;
        membership_ids
            .into_iter()
            .filter(|id| members.insert(id.clone()))
            .count()
    }

    /// Snapshot of all IDs in first-seen order.
    pub async fn list(&self) -> Vec<String> {
        self.members.read().await.iter().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.members.read().await.len()
    }
}
