use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::models::{CachedScan, ImageIdentity};

/// Session-scoped de-duplication map from image identity to its most recent
/// recognition result. Write-once per key; an explicit reset is the only
/// invalidation. No eviction, no size bound, no expiry: entries live until
/// the session is cleared or the process exits.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, HashMap<ImageIdentity, CachedScan>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: Uuid, identity: &ImageIdentity) -> Option<CachedScan> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .and_then(|entries| entries.get(identity))
            .cloned()
    }

    /// Stores `scan` unless the identity already has a result, and returns
    /// the entry that ended up in the cache. An existing entry is never
    /// recomputed or overwritten.
    pub async fn put(
        &self,
        session_id: Uuid,
        identity: ImageIdentity,
        scan: CachedScan,
    ) -> CachedScan {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id)
            .or_default()
            .entry(identity)
            .or_insert(scan)
            .clone()
    }

    /// Discards every entry of the session; returns how many were dropped.
    pub async fn clear(&self, session_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&session_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// All entries of the session, ordered by scan time.
    pub async fn snapshot(&self, session_id: Uuid) -> Vec<(ImageIdentity, CachedScan)> {
        let sessions = self.sessions.read().await;
        let mut entries: Vec<(ImageIdentity, CachedScan)> = sessions
            .get(&session_id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(identity, scan)| (identity.clone(), scan.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|(_, scan)| scan.scanned_at);
        entries
    }
}
