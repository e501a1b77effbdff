//! Subscription system for store change notifications.
//!
//! Each store emits five named events:
//! - `create`, `update`, `delete`: one batch per mutating call, carrying a
//!   path -> value map
//! - `_create`, `_delete`: one per path segment that gains its first entry
//!   or loses its last one
//!
//! Subscriptions support:
//! - Filtering by event kind
//! - Unbounded delivery by default; optional bounded buffers with
//!   slow-subscriber dropping
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig::kinds([EventKind::Create]));
//!
//! store.set_value_for_path(Scalar::from("bar"), "foo", false);
//!
//! match handle.recv() {
//!     Ok(StoreEvent::Created { changes }) => println!("created: {:?}", changes),
//!     Ok(StoreEvent::Dropped { reason }) => println!("dropped: {:?}", reason),
//!     _ => {}
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, EventKind, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
