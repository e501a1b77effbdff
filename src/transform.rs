//! Conversion between nested value trees and flat path maps.

use crate::path::{is_superpath, join_path, split_path, unprefix_path};
use crate::types::{FlatMap, Record, Scalar, Value};

/// Flatten `value` into path -> scalar entries rooted at `base`.
///
/// Empty records and `Absent` leaves produce no entries.
pub fn flatten(value: &Value, base: &str, delimiter: &str) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into(value, base, delimiter, &mut out);
    out
}

fn flatten_into(value: &Value, base: &str, delimiter: &str, out: &mut FlatMap) {
    match value {
        Value::Absent => {}
        Value::Scalar(scalar) => {
            out.insert(base.to_string(), scalar.clone());
        }
        Value::Record(record) => {
            for (key, child) in record {
                flatten_into(child, &join_path(base, key, delimiter), delimiter, out);
            }
        }
    }
}

/// Rebuild the tree of every entry under `prefix`, relative to `prefix`.
///
/// When one path holds a scalar and also has descendants, the descendants
/// win and the scalar is dropped from the result, whatever the entry order.
/// A lone scalar stored at `prefix` itself is returned as that scalar.
pub fn inflate<'a, I>(entries: I, prefix: &str, delimiter: &str) -> Value
where
    I: IntoIterator<Item = (&'a String, &'a Scalar)>,
{
    let mut root = Value::record();

    for (path, scalar) in entries {
        if !is_superpath(path, prefix, delimiter) {
            continue;
        }

        let segments = split_path(unprefix_path(path, prefix, delimiter), delimiter);
        insert_at(&mut root, &segments, scalar);
    }

    root
}

fn insert_at(node: &mut Value, segments: &[&str], scalar: &Scalar) {
    let Some((last, parents)) = segments.split_last() else {
        if let Value::Record(record) = node {
            if record.is_empty() {
                *node = Value::Scalar(scalar.clone());
            }
        }
        return;
    };

    let mut node = node;
    for segment in parents {
        let Some(record) = promote_to_record(node) else {
            return;
        };
        node = record
            .entry((*segment).to_string())
            .or_insert_with(Value::record);
    }

    let Some(record) = promote_to_record(node) else {
        return;
    };
    if !matches!(record.get(*last), Some(Value::Record(_))) {
        record.insert((*last).to_string(), Value::Scalar(scalar.clone()));
    }
}

/// Turn `node` into a record, discarding any scalar it held.
fn promote_to_record(node: &mut Value) -> Option<&mut Record> {
    if !matches!(node, Value::Record(_)) {
        *node = Value::record();
    }
    match node {
        Value::Record(record) => Some(record),
        _ => None,
    }
}
