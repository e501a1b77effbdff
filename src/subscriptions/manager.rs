//! Subscription manager for broadcasting store events.

use crate::types::ChangeMap;
use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{
    DropReason, EventKind, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};

/// Internal subscription state.
struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<StoreEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if buffer is full (subscriber will be dropped).
    ///
    /// The last slot of a bounded channel is kept for the `Dropped` notice.
    fn try_send(&self, event: StoreEvent) -> bool {
        if let Some(capacity) = self.sender.capacity() {
            if self.sender.len() + 1 >= capacity {
                return false;
            }
        }

        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(crossbeam_channel::TrySendError::Full(_)) => false,
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => false,
        }
    }

    fn wants(&self, kind: EventKind) -> bool {
        self.config.filter.matches(kind)
    }
}

/// Manages subscriptions and broadcasts events.
///
/// Each store owns one manager; subscriptions never leak between stores.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription.
    ///
    /// Without a `buffer_size` the channel is unbounded and the subscriber is
    /// never dropped for being slow.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = match config.buffer_size {
            Some(size) => bounded(size + 1),
            None => unbounded(),
        };

        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Send dropped event (best effort)
            let _ = sub.sender.try_send(StoreEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Remove every subscription.
    pub fn unsubscribe_all(&self) {
        let drained: Vec<Subscription> =
            self.subscriptions.write().drain().map(|(_, s)| s).collect();
        for sub in drained {
            let _ = sub.sender.try_send(StoreEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    // --- Broadcasting ---

    /// Broadcast a batch of created paths.
    pub fn broadcast_created(&self, changes: ChangeMap) {
        self.broadcast(EventKind::Create, StoreEvent::Created { changes });
    }

    /// Broadcast a batch of updated paths.
    pub fn broadcast_updated(&self, changes: ChangeMap) {
        self.broadcast(EventKind::Update, StoreEvent::Updated { changes });
    }

    /// Broadcast a batch of deleted paths.
    pub fn broadcast_deleted(&self, changes: ChangeMap) {
        self.broadcast(EventKind::Delete, StoreEvent::Deleted { changes });
    }

    /// Broadcast that a path segment gained its first entry.
    pub fn broadcast_path_created(&self, path: &str) {
        let event = StoreEvent::PathCreated {
            path: path.to_string(),
        };
        self.broadcast(EventKind::PathCreate, event);
    }

    /// Broadcast that a path segment lost its last entry.
    pub fn broadcast_path_deleted(&self, path: &str) {
        let event = StoreEvent::PathDeleted {
            path: path.to_string(),
        };
        self.broadcast(EventKind::PathDelete, event);
    }

    /// Internal broadcast helper. Drops subscribers that fail to receive.
    fn broadcast(&self, kind: EventKind, event: StoreEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.wants(kind) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        // Remove dropped subscriptions
        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    tracing::warn!(subscription = id.0, event = %kind, "dropping slow subscriber");
                    // Lands in the slot reserved by `try_send`.
                    let _ = sub.sender.try_send(StoreEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
