//! # Key-Path Store
//!
//! A nested tree of values held as a flat map from delimited paths
//! (`man.name`) to scalar leaves, with batched change notifications.
//!
//! ## Core Concepts
//!
//! - **Paths**: Segments joined by a delimiter; the empty path is the whole tree
//! - **Flat map**: Only scalar leaves are stored; records are flattened on write
//! - **Sub-tree writes**: Replacing a sub-tree deletes leaves it no longer defines
//! - **Notifications**: `create`/`update`/`delete` batches per mutating call,
//!   plus `_create`/`_delete` whenever a path segment appears or disappears
//!
//! ## Example
//!
//! ```ignore
//! use keypath_store::{Scalar, Store, SubscriptionConfig};
//! use serde_json::json;
//!
//! let mut store = Store::new();
//! let handle = store.subscribe(SubscriptionConfig::default());
//!
//! store.set_object(json!({"foo": "bar", "man": {"name": "johnny"}}), false);
//! store.set_object_for_path(json!({"name": "jimmy"}), "man", false);
//!
//! assert_eq!(store.get_value_for_path("man.name"), Some(&Scalar::from("jimmy")));
//!
//! for event in handle.drain() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod changes;
pub mod error;
pub mod path;
pub mod store;
pub mod subscriptions;
pub mod transform;
pub mod types;

// Re-exports
pub use changes::{Changeset, WriteKind};
pub use error::{Result, StoreError};
pub use path::{is_superpath, prefix_path, split_path, unprefix_path, DEFAULT_DELIMITER};
pub use store::{Store, StoreConfig};
pub use subscriptions::{
    DropReason, EventKind, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use transform::{flatten, inflate};
pub use types::*;
