//! Path navigation over transformed fixtures
//!
//! A path such as `Login/Case/0/user` names the root tag first, then one
//! entry per level. Group members are addressed by their index.

use super::value::{ResultMap, Value};
use crate::error::{Error, Result};
use std::borrow::Cow;

/// Split a lookup path into segments
///
/// `/` separates segments; a path without any `/` is split on `\`
/// instead. Trailing empty segments are dropped.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.trim().is_empty() {
        return Err(Error::InvalidPath);
    }
    let separator = if path.contains('/') { '/' } else { '\\' };
    let mut segments: Vec<&str> = path.split(separator).collect();
    while segments.last().map_or(false, |s| s.is_empty()) {
        segments.pop();
    }
    if segments.is_empty() {
        return Err(Error::InvalidPath);
    }
    Ok(segments)
}

/// Walk `root`, the fixture built for the path's first segment
pub fn navigate<'a>(root: &'a ResultMap, path: &str) -> Result<Cow<'a, Value>> {
    let segments = split_path(path)?;
    navigate_segments(root, &segments, path)
}

/// Walk already split segments; `path` is only used in errors
///
/// An empty fixture is `NoDataFound`. A single segment returns the entry
/// stored under the root tag. Longer paths descend one entry per segment
/// and the final entry must exist and hold data, otherwise the lookup is
/// `NodeNotFound`.
pub fn navigate_segments<'a>(root: &'a ResultMap, segments: &[&str], path: &str) -> Result<Cow<'a, Value>> {
    let not_found = || Error::NodeNotFound { path: path.to_string() };
    let (first, rest) = segments.split_first().ok_or(Error::InvalidPath)?;

    if root.is_empty() {
        return Err(Error::NoDataFound { root: first.to_string() });
    }

    let mut current = Cow::Borrowed(root.get(*first).ok_or_else(not_found)?);
    for segment in rest {
        current = descend(current, segment).ok_or_else(not_found)?;
    }

    if !rest.is_empty() && current.is_empty() {
        return Err(not_found());
    }
    Ok(current)
}

fn descend<'a>(value: Cow<'a, Value>, key: &str) -> Option<Cow<'a, Value>> {
    match value {
        Cow::Borrowed(value) => value.child(key),
        Cow::Owned(value) => value.child(key).map(|child| Cow::Owned(child.into_owned())),
    }
}

/// Number of keys at the addressed level that start with `prefix`
pub fn count_keys_starting_with(value: &Value, prefix: &str) -> usize {
    value.keys().iter().filter(|key| key.starts_with(prefix)).count()
}
