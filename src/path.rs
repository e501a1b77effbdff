//! Path arithmetic over delimited key paths.
//!
//! A path is a sequence of segments joined by a delimiter (`.` by default).
//! The empty path names the whole tree. All containment tests here are
//! segment-aware: `foo` contains `foo.bar` but not `foobar`.

/// Default segment delimiter.
pub const DEFAULT_DELIMITER: &str = ".";

/// Whether `ancestor` is `path` itself, an ancestor of it, or the root.
pub fn is_superpath(path: &str, ancestor: &str, delimiter: &str) -> bool {
    if ancestor.is_empty() || path == ancestor {
        return true;
    }

    path.strip_prefix(ancestor)
        .map_or(false, |rest| rest.starts_with(delimiter))
}

/// Place `path` under `prefix`.
///
/// Paths already under `prefix` are returned unchanged, so prefixing is
/// idempotent.
pub fn prefix_path(path: &str, prefix: &str, delimiter: &str) -> String {
    if is_superpath(path, prefix, delimiter) {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}{}{}", prefix, delimiter, path)
    }
}

/// Strip one leading `prefix` (and the delimiter after it) from `path`.
///
/// Only the first occurrence is removed: `root.root` under `root` becomes
/// `root`. Paths not under `prefix` are returned unchanged.
pub fn unprefix_path<'a>(path: &'a str, prefix: &str, delimiter: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }

    match path.strip_prefix(prefix) {
        Some("") => "",
        Some(rest) => rest.strip_prefix(delimiter).unwrap_or(path),
        None => path,
    }
}

/// Split a path into its segments. The empty path has no segments.
pub fn split_path<'a>(path: &'a str, delimiter: &str) -> Vec<&'a str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split(delimiter).collect()
    }
}

/// Append `key` to `base`, omitting the delimiter when `base` is the root.
pub fn join_path(base: &str, key: &str, delimiter: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", base, delimiter, key)
    }
}

/// Every non-empty leading run of segments, shortest first, ending with
/// `path` itself: `a.b.c` yields `a`, `a.b`, `a.b.c`.
pub fn ancestors<'a>(path: &'a str, delimiter: &str) -> Vec<&'a str> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut out: Vec<&str> = path
        .match_indices(delimiter)
        .map(|(idx, _)| &path[..idx])
        .filter(|ancestor| !ancestor.is_empty())
        .collect();
    out.push(path);
    out
}
