use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::time::Instant;

use super::Severity;

/// One visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub text: String,
    pub expires_at: Instant,
}

/// Visible notifications. Inserts from concurrent interactions each get their
/// own slot; nothing is ever overwritten.
pub struct NotificationStack {
    items: DashMap<u64, Notification>,
    next_id: AtomicU64,
}

impl Default for NotificationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStack {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn push(&self, severity: Severity, text: String, expires_at: Instant) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.items.insert(
            id,
            Notification {
                id,
                severity,
                text,
                expires_at,
            },
        );
        id
    }

    /// Remove `id`; false when it was already gone.
    pub fn remove(&self, id: u64) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Visible notifications, oldest first.
    pub fn visible(&self) -> Vec<Notification> {
        let mut v: Vec<Notification> = self.items.iter().map(|r| r.value().clone()).collect();
        v.sort_by_key(|n| n.id);
        v
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
