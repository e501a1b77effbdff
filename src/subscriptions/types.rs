//! Subscription types for store change notifications.

use crate::types::ChangeMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: None (unbounded, never dropped)
    pub buffer_size: Option<usize>,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: None,
            filter: SubscriptionFilter::all(),
        }
    }
}

impl SubscriptionConfig {
    /// Subscribe to the given event kinds with the default buffer.
    pub fn kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            filter: SubscriptionFilter::kinds(kinds),
            ..Default::default()
        }
    }
}

/// The named events a store emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "_create")]
    PathCreate,
    #[serde(rename = "_delete")]
    PathDelete,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Create,
        EventKind::Update,
        EventKind::Delete,
        EventKind::PathCreate,
        EventKind::PathDelete,
    ];

    /// Event name as seen by observers.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Create => "create",
            EventKind::Update => "update",
            EventKind::Delete => "delete",
            EventKind::PathCreate => "_create",
            EventKind::PathDelete => "_delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Event kinds to deliver (None = every kind).
    pub kinds: Option<Vec<EventKind>>,
}

impl SubscriptionFilter {
    /// Subscribe to everything.
    pub fn all() -> Self {
        Self { kinds: None }
    }

    /// Subscribe to specific event kinds.
    pub fn kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
        }
    }

    /// Batched value changes only: `create`, `update`, `delete`.
    pub fn changes() -> Self {
        Self::kinds([EventKind::Create, EventKind::Update, EventKind::Delete])
    }

    /// Structural segment events only: `_create`, `_delete`.
    pub fn segments() -> Self {
        Self::kinds([EventKind::PathCreate, EventKind::PathDelete])
    }

    /// Wrap in a config with the default buffer size.
    pub fn into_config(self) -> SubscriptionConfig {
        SubscriptionConfig {
            filter: self,
            ..Default::default()
        }
    }

    pub fn matches(&self, kind: EventKind) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }
}

/// Events emitted to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// Paths that went from absent to present in one batch.
    #[serde(rename = "create")]
    Created { changes: ChangeMap },

    /// Paths whose value changed in one batch (creations and deletions included).
    #[serde(rename = "update")]
    Updated { changes: ChangeMap },

    /// Paths that went from present to absent in one batch.
    #[serde(rename = "delete")]
    Deleted { changes: ChangeMap },

    /// A path segment gained its first entry.
    #[serde(rename = "_create")]
    PathCreated { path: String },

    /// A path segment lost its last entry.
    #[serde(rename = "_delete")]
    PathDeleted { path: String },

    /// Subscription was dropped.
    #[serde(rename = "dropped")]
    Dropped { reason: DropReason },
}

impl StoreEvent {
    /// The named kind of this event (None for lifecycle events).
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            StoreEvent::Created { .. } => Some(EventKind::Create),
            StoreEvent::Updated { .. } => Some(EventKind::Update),
            StoreEvent::Deleted { .. } => Some(EventKind::Delete),
            StoreEvent::PathCreated { .. } => Some(EventKind::PathCreate),
            StoreEvent::PathDeleted { .. } => Some(EventKind::PathDelete),
            StoreEvent::Dropped { .. } => None,
        }
    }

    /// The change payload of a batched event.
    pub fn changes(&self) -> Option<&ChangeMap> {
        match self {
            StoreEvent::Created { changes }
            | StoreEvent::Updated { changes }
            | StoreEvent::Deleted { changes } => Some(changes),
            _ => None,
        }
    }

    /// The segment path of a structural event.
    pub fn path(&self) -> Option<&str> {
        match self {
            StoreEvent::PathCreated { path } | StoreEvent::PathDeleted { path } => Some(path),
            _ => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Every event queued so far, without blocking.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.receiver.try_iter().collect()
    }
}
