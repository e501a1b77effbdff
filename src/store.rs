//! Main Store struct tying all components together.

use crate::changes::{Changeset, WriteKind};
use crate::error::{Result, StoreError};
use crate::path::{ancestors, is_superpath, prefix_path, unprefix_path, DEFAULT_DELIMITER};
use crate::subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::transform::{flatten, inflate};
use crate::types::{FlatMap, Scalar, Value};
use serde::{Deserialize, Serialize};
use std::ops::Bound;

/// Store configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Segment delimiter. Must be non-empty.
    pub delimiter: String,

    /// Fixed prefix applied to every path before it is stored.
    /// Empty means paths are stored as given.
    pub prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            prefix: String::new(),
        }
    }
}

impl StoreConfig {
    /// Read options from a JSON object. Missing options take their defaults
    /// and unknown options are ignored.
    pub fn from_json(options: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(options.clone())?)
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(StoreError::InvalidArgument(
                "delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A nested value tree held as a flat map of paths to scalars.
///
/// Every mutation records created/updated/deleted paths into a pending
/// changeset. Non-silent calls flush that changeset to subscribers as one
/// batch per category. Segment events (`_create`/`_delete`) are sent as
/// soon as they happen, silent or not.
///
/// Paths handed to and reported by the store are logical paths; the
/// configured prefix only shows up in [`Store::entries`].
pub struct Store {
    /// Store configuration.
    config: StoreConfig,

    /// Stored path -> leaf value.
    entries: FlatMap,

    /// Changes since the last flush.
    changes: Changeset,

    /// Subscribers of this store only.
    subscriptions: SubscriptionManager,
}

impl Store {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            entries: FlatMap::new(),
            changes: Changeset::new(),
            subscriptions: SubscriptionManager::new(),
        }
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(delimiter = %config.delimiter, prefix = %config.prefix, "store created");

        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The flat map, keyed by stored (prefixed) path.
    pub fn entries(&self) -> &FlatMap {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // --- Reads ---

    /// The whole tree.
    pub fn get_object(&self) -> Value {
        self.get_object_for_path("")
    }

    /// The sub-tree under `path`, relative to `path`.
    ///
    /// A missing sub-tree is an empty record.
    pub fn get_object_for_path(&self, path: &str) -> Value {
        inflate(&self.entries, &self.stored_path(path), &self.config.delimiter)
    }

    /// The leaf value at `path`, or `None` if there is none.
    pub fn get_value_for_path(&self, path: &str) -> Option<&Scalar> {
        self.entries.get(&self.stored_path(path))
    }

    // --- Writes ---

    /// Replace the whole tree.
    pub fn set_object(&mut self, value: impl Into<Value>, silent: bool) {
        self.set_object_for_path(value, "", silent);
    }

    /// Replace the sub-tree under `path` with `value`.
    ///
    /// Leaves under `path` that `value` does not define are deleted, so this
    /// is a replace rather than a merge. All resulting changes go out as a
    /// single batch.
    pub fn set_object_for_path(&mut self, value: impl Into<Value>, path: &str, silent: bool) {
        let target = self.stored_path(path);
        let fragment = flatten(&value.into(), &target, &self.config.delimiter);

        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|stored| is_superpath(stored, &target, &self.config.delimiter))
            .filter(|stored| !fragment.contains_key(*stored))
            .cloned()
            .collect();

        for stored in stale {
            self.write(stored, None);
        }

        for (stored, scalar) in fragment {
            self.write(stored, Some(scalar));
        }

        if !silent {
            self.flush();
        }
    }

    /// Set the leaf at `path`. Passing `None` deletes it.
    ///
    /// Writing the value already held records nothing.
    pub fn set_value_for_path(
        &mut self,
        value: impl Into<Option<Scalar>>,
        path: &str,
        silent: bool,
    ) {
        let stored = self.stored_path(path);
        self.write(stored, value.into());

        if !silent {
            self.flush();
        }
    }

    /// Send accumulated changes to subscribers and start a new batch.
    ///
    /// The pending changeset is reset before anything is sent, so changes
    /// made in response to these events form a batch of their own.
    pub fn flush(&mut self) {
        let Changeset {
            created,
            updated,
            deleted,
        } = self.changes.take();

        if created.is_empty() && updated.is_empty() && deleted.is_empty() {
            return;
        }

        tracing::debug!(
            created = created.len(),
            updated = updated.len(),
            deleted = deleted.len(),
            "flushing changes"
        );

        if !created.is_empty() {
            self.subscriptions.broadcast_created(created);
        }
        if !updated.is_empty() {
            self.subscriptions.broadcast_updated(updated);
        }
        if !deleted.is_empty() {
            self.subscriptions.broadcast_deleted(deleted);
        }
    }

    // --- Subscriptions ---

    /// Subscribe to this store's events.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    pub fn unsubscribe_all(&self) {
        self.subscriptions.unsubscribe_all();
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    // --- Internals ---

    fn stored_path(&self, path: &str) -> String {
        prefix_path(path, &self.config.prefix, &self.config.delimiter)
    }

    fn logical_path<'a>(&self, stored: &'a str) -> &'a str {
        unprefix_path(stored, &self.config.prefix, &self.config.delimiter)
    }

    /// Apply one write at a stored path and record its effects. Never flushes.
    fn write(&mut self, stored: String, value: Option<Scalar>) {
        let prior = self.entries.get(&stored).cloned();
        let kind = WriteKind::classify(prior.as_ref(), value.as_ref());

        if kind == WriteKind::Unchanged {
            return;
        }

        // Segments that have no entry yet and are about to gain one.
        let emerging: Vec<String> = if kind == WriteKind::Created {
            self.segments(&stored)
                .into_iter()
                .filter(|segment| !self.has_entry_under(segment))
                .collect()
        } else {
            Vec::new()
        };

        match &value {
            Some(scalar) => {
                self.entries.insert(stored.clone(), scalar.clone());
            }
            None => {
                self.entries.remove(&stored);
            }
        }

        let vanished: Vec<String> = if kind == WriteKind::Deleted {
            self.segments(&stored)
                .into_iter()
                .filter(|segment| !self.has_entry_under(segment))
                .collect()
        } else {
            Vec::new()
        };

        for segment in &emerging {
            let path = self.logical_path(segment);
            tracing::trace!(path, "segment created");
            self.subscriptions.broadcast_path_created(path);
        }
        for segment in &vanished {
            let path = self.logical_path(segment);
            tracing::trace!(path, "segment deleted");
            self.subscriptions.broadcast_path_deleted(path);
        }

        let logical = self.logical_path(&stored).to_string();
        self.changes.record(&logical, kind, self.entries.get(&stored));
    }

    /// Stored paths of every segment of `stored` below the prefix,
    /// shortest first.
    fn segments(&self, stored: &str) -> Vec<String> {
        let prefix = &self.config.prefix;
        let delimiter = &self.config.delimiter;

        ancestors(stored, delimiter)
            .into_iter()
            .filter(|segment| prefix.is_empty() || !is_superpath(prefix, segment, delimiter))
            .map(str::to_string)
            .collect()
    }

    /// Whether any entry lives at or below the stored path `segment`.
    fn has_entry_under(&self, segment: &str) -> bool {
        self.entries
            .range::<str, _>((Bound::Included(segment), Bound::Unbounded))
            .take_while(|(stored, _)| stored.starts_with(segment))
            .any(|(stored, _)| is_superpath(stored, segment, &self.config.delimiter))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::{EventKind, StoreEvent};
    use serde_json::json;

    fn flat(store: &Store) -> serde_json::Value {
        serde_json::Value::Object(
            store
                .entries()
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn rooted() -> Store {
        Store::with_config(StoreConfig {
            prefix: "root".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let store = Store::new();
        assert_eq!(store.config().delimiter, ".");
        assert_eq!(store.config().prefix, "");
        assert!(store.is_empty());
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = StoreConfig::from_json(&json!({"delimiter": "/"})).unwrap();
        assert_eq!(config.delimiter, "/");
        assert_eq!(config.prefix, "");

        let config = StoreConfig::from_json(&json!({"prefix": "foo", "colour": "blue"})).unwrap();
        assert_eq!(config.delimiter, ".");
        assert_eq!(config.prefix, "foo");
    }

    #[test]
    fn test_config_from_json_wrong_type() {
        let result = StoreConfig::from_json(&json!({"delimiter": 5}));
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        let result = Store::with_config(StoreConfig {
            delimiter: String::new(),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_prefixed_storage() {
        let mut store = rooted();

        store.set_value_for_path(Scalar::from("bar"), "", false);
        assert_eq!(flat(&store), json!({"root": "bar"}));

        store.set_value_for_path(None, "", false);
        store.set_value_for_path(Scalar::from("bar"), "foo", false);
        assert_eq!(flat(&store), json!({"root.foo": "bar"}));

        store.set_value_for_path(Scalar::from("hello"), "foo.bar", false);
        store.set_value_for_path(Scalar::from("world"), "foo.bar", false);
        assert_eq!(flat(&store), json!({"root.foo": "bar", "root.foo.bar": "world"}));
    }

    #[test]
    fn test_prefixed_set_object_for_path() {
        let mut store = rooted();

        store.set_object_for_path(json!({"bar": "Hello"}), "foo", false);
        assert_eq!(flat(&store), json!({"root.foo.bar": "Hello"}));

        store.set_object_for_path(json!({"bar": "Hello", "man": {"name": "johnny"}}), "foo", false);
        assert_eq!(
            flat(&store),
            json!({"root.foo.bar": "Hello", "root.foo.man.name": "johnny"})
        );

        store.set_object_for_path(json!({"name": "jimmy"}), "foo.man", false);
        assert_eq!(
            flat(&store),
            json!({"root.foo.bar": "Hello", "root.foo.man.name": "jimmy"})
        );

        store.set_object_for_path(json!({"foo": "bar", "man": {"name": "johnny"}}), "", false);
        assert_eq!(flat(&store), json!({"root.foo": "bar", "root.man.name": "johnny"}));
    }

    #[test]
    fn test_prefixed_events_use_logical_paths() {
        let mut store = rooted();
        let handle = store.subscribe(SubscriptionConfig::default());

        store.set_object(json!({"man": {"name": "johnny"}}), false);

        let events = handle.drain();
        assert_eq!(
            events,
            vec![
                StoreEvent::PathCreated { path: "man".to_string() },
                StoreEvent::PathCreated { path: "man.name".to_string() },
                StoreEvent::Created {
                    changes: [("man.name".to_string(), Some(Scalar::from("johnny")))].into()
                },
                StoreEvent::Updated {
                    changes: [("man.name".to_string(), Some(Scalar::from("johnny")))].into()
                },
            ]
        );
    }

    #[test]
    fn test_has_entry_under_respects_segments() {
        let mut store = Store::new();
        store.set_value_for_path(Scalar::from("x"), "foobar", true);

        assert!(store.has_entry_under("foobar"));
        assert!(!store.has_entry_under("foo"));
    }

    #[test]
    fn test_silent_writes_accumulate_until_flush() {
        let mut store = Store::new();
        let handle = store.subscribe(SubscriptionConfig::kinds([EventKind::Create]));

        store.set_value_for_path(Scalar::from("a"), "x", true);
        store.set_value_for_path(Scalar::from("b"), "y", true);
        assert!(handle.drain().is_empty());

        store.flush();
        let events = handle.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].changes().unwrap().len(), 2);

        // Nothing left to send.
        store.flush();
        assert!(handle.drain().is_empty());
    }
}
