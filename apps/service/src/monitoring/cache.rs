use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::TargetStatus;

/// Shared table of the most recent status per target id.
///
/// Probe tasks insert whole values under the write lock and readers clone
/// the map under the read lock, so a snapshot can never observe a
/// half-applied entry. The handle is cheap to clone and is shared between
/// the scheduler and the HTTP layer.
///
/// Entries are never pruned: a target deleted or disabled upstream keeps its
/// last status until it is probed again.
#[derive(Clone, Default)]
pub struct StatusCache {
    entries: Arc<RwLock<HashMap<i64, TargetStatus>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest result for a target, replacing any previous entry.
    pub async fn set(&self, id: i64, status: TargetStatus) {
        self.entries.write().await.insert(id, status);
    }

    /// Point-in-time copy of every entry.
    pub async fn snapshot(&self) -> HashMap<i64, TargetStatus> {
        self.entries.read().await.clone()
    }
}
