//! Label and annotation extraction from workload objects.
//!
//! The merge engine never inspects object types itself. It reads metadata
//! through a [`MetadataAccessor`], so typed Kubernetes resources and untyped
//! manifests share one engine.

use std::collections::BTreeMap;

use kube::Resource;
use peanut_shared::{PeanutError, Result};
use serde_json::Value;

/// Reads the label and annotation mappings of an object of type `O`.
pub trait MetadataAccessor<O> {
    /// The object's labels. Absent labels read as an empty map.
    fn labels(&self, obj: &O) -> Result<BTreeMap<String, String>>;

    /// The object's annotations. Absent annotations read as an empty map.
    fn annotations(&self, obj: &O) -> Result<BTreeMap<String, String>>;
}

// ---------------------------------------------------------------------------
// Typed resources
// ---------------------------------------------------------------------------

/// Accessor for any typed Kubernetes resource (`Deployment`, `Pod`, ...).
///
/// Typed resources always carry an `ObjectMeta`, so this never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceAccessor;

impl<K: Resource> MetadataAccessor<K> for ResourceAccessor {
    fn labels(&self, obj: &K) -> Result<BTreeMap<String, String>> {
        Ok(obj.meta().labels.clone().unwrap_or_default())
    }

    fn annotations(&self, obj: &K) -> Result<BTreeMap<String, String>> {
        Ok(obj.meta().annotations.clone().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Untyped manifests
// ---------------------------------------------------------------------------

/// Accessor for untyped manifests, e.g. documents loaded from YAML files.
///
/// Fails when `metadata` is missing or not a mapping, or when `labels` /
/// `annotations` hold anything other than a mapping of strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestAccessor;

impl MetadataAccessor<Value> for ManifestAccessor {
    fn labels(&self, obj: &Value) -> Result<BTreeMap<String, String>> {
        string_map(obj, "labels")
    }

    fn annotations(&self, obj: &Value) -> Result<BTreeMap<String, String>> {
        string_map(obj, "annotations")
    }
}

fn string_map(obj: &Value, field: &str) -> Result<BTreeMap<String, String>> {
    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            PeanutError::extraction(format!("{} has no metadata mapping", describe(obj)))
        })?;

    match metadata.get(field) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => Ok((key.clone(), s.clone())),
                other => Err(PeanutError::extraction(format!(
                    "{} {field} value for {key:?} is not a string: {other}",
                    describe(obj)
                ))),
            })
            .collect(),
        Some(other) => Err(PeanutError::extraction(format!(
            "{} {field} is not a mapping: {other}",
            describe(obj)
        ))),
    }
}

/// `Kind/name` for error messages, as far as the object allows.
fn describe(obj: &Value) -> String {
    let kind = obj.get("kind").and_then(Value::as_str).unwrap_or("object");
    match obj.pointer("/metadata/name").and_then(Value::as_str) {
        Some(name) => format!("{kind}/{name}"),
        None => kind.to_string(),
    }
}
