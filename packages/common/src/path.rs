//! # Dot-path document access
//!
//! Drafts are edited through dot-delimited paths (`"address.city"`). The
//! edits happen on a `serde_json::Value` view of the entity; callers convert
//! back to their typed form at the boundary.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Field path is empty")]
    Empty,

    #[error("Field path {0:?} has an empty segment")]
    EmptySegment(String),
}

/// Split a dot path into its segments
pub fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }

    Ok(segments)
}

/// Read the value at `path`, if every segment resolves
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = split_path(path).ok()?;
    segments
        .iter()
        .try_fold(doc, |node, segment| node.as_object()?.get(*segment))
}

/// Deep-set `value` at `path`, returning what was there before.
///
/// Intermediate nodes that are missing, or that exist but are not objects,
/// are replaced by empty objects.
pub fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<Option<Value>, PathError> {
    let segments = split_path(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or(PathError::Empty)?;

    let mut node = doc;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(ensure_object(node).insert(last.to_string(), value))
}

/// Remove the value at `path`, leaving parent objects in place
pub fn remove_path(doc: &mut Value, path: &str) -> Option<Value> {
    let segments = split_path(path).ok()?;
    let (last, parents) = segments.split_last()?;

    let mut node = doc;
    for segment in parents {
        node = node.as_object_mut()?.get_mut(*segment)?;
    }

    node.as_object_mut()?.remove(*last)
}

/// Shallow-merge the top-level keys of `partial` into `doc`.
///
/// Returns the previous value of every key that was written (`None` when the
/// key did not exist).
pub fn merge_top_level(doc: &mut Value, partial: Map<String, Value>) -> Vec<(String, Option<Value>)> {
    let target = ensure_object(doc);
    partial
        .into_iter()
        .map(|(key, value)| {
            let before = target.insert(key.clone(), value);
            (key, before)
        })
        .collect()
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}
