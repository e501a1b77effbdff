//! Accumulation of value changes between flushes.

use crate::types::{ChangeMap, Scalar};

/// How a single write changed the value at its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteKind {
    /// Absent before, present after.
    Created,
    /// Present before and after, with a different value.
    Updated,
    /// Present before, absent after.
    Deleted,
    /// Nothing observable changed.
    Unchanged,
}

impl WriteKind {
    /// Classify a write from the values before and after it.
    pub fn classify(prior: Option<&Scalar>, current: Option<&Scalar>) -> Self {
        match (prior, current) {
            (None, Some(_)) => WriteKind::Created,
            (Some(_), None) => WriteKind::Deleted,
            (Some(a), Some(b)) if a != b => WriteKind::Updated,
            _ => WriteKind::Unchanged,
        }
    }
}

/// Pending created/updated/deleted entries, keyed by logical path.
///
/// Every recorded change also lands in `updated`, so a creation shows up in
/// both `created` and `updated`. Within one batch the latest write to a path
/// decides whether it is reported as created or deleted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Changeset {
    pub created: ChangeMap,
    pub updated: ChangeMap,
    pub deleted: ChangeMap,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one write. `current` is the value after the write.
    pub fn record(&mut self, path: &str, kind: WriteKind, current: Option<&Scalar>) {
        let current = current.cloned();

        match kind {
            WriteKind::Unchanged => return,
            WriteKind::Created => {
                self.deleted.remove(path);
                self.created.insert(path.to_string(), current.clone());
            }
            WriteKind::Deleted => {
                self.created.remove(path);
                self.deleted.insert(path.to_string(), current.clone());
            }
            WriteKind::Updated => {
                if let Some(entry) = self.created.get_mut(path) {
                    *entry = current.clone();
                }
            }
        }

        self.updated.insert(path.to_string(), current);
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Take the accumulated changes, leaving this changeset empty.
    pub fn take(&mut self) -> Changeset {
        std::mem::take(self)
    }
}
