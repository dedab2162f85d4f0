//! Reads workload objects from YAML manifest files instead of a cluster.
//!
//! Files may hold several `---` separated documents. `kind: List` documents
//! (as written by `kubectl get -o yaml`) are flattened into their items.
//! Only objects of the configured kind, and namespace if set, are returned.

use std::path::PathBuf;

use async_trait::async_trait;
use peanut_shared::{PeanutError, Result, SourceConfig};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{ObjectSource, WorkloadList, object_kind};

/// Object source backed by manifest files, re-read on every list.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    paths: Vec<PathBuf>,
    config: SourceConfig,
}

impl ManifestSource {
    /// Read objects from `paths`, filtered by `config`.
    pub fn new(paths: Vec<PathBuf>, config: SourceConfig) -> Self {
        if config.label_selector.is_some() {
            warn!("label selectors are not applied to manifest files");
        }
        Self { paths, config }
    }

    fn keep(&self, obj: &Value) -> bool {
        let kind_matches =
            obj.get("kind").and_then(Value::as_str) == Some(object_kind(self.config.kind));
        let namespace_matches = match &self.config.namespace {
            Some(ns) => {
                obj.pointer("/metadata/namespace").and_then(Value::as_str) == Some(ns.as_str())
            }
            None => true,
        };
        kind_matches && namespace_matches
    }
}

#[async_trait]
impl ObjectSource for ManifestSource {
    #[instrument(skip_all, fields(files = self.paths.len(), kind = %self.config.kind))]
    async fn list(&self) -> Result<WorkloadList> {
        let mut objects = Vec::new();

        for path in &self.paths {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PeanutError::io(path, e))?;
            let documents = parse_documents(&content).map_err(|e| {
                PeanutError::Cluster(format!("failed to parse {}: {e}", path.display()))
            })?;
            objects.extend(documents.into_iter().filter(|obj| self.keep(obj)));
        }

        debug!(count = objects.len(), "read manifest objects");
        Ok(WorkloadList::Manifests(objects))
    }

    fn name(&self) -> &str {
        "manifests"
    }
}

/// Split a multi-document YAML string into objects, flattening lists and
/// dropping empty documents.
pub(crate) fn parse_documents(content: &str) -> std::result::Result<Vec<Value>, serde_yaml::Error> {
    let mut objects = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        match Value::deserialize(document)? {
            Value::Null => {}
            Value::Object(mut map) if is_list(&map) => {
                if let Some(Value::Array(items)) = map.remove("items") {
                    objects.extend(items);
                }
            }
            other => objects.push(other),
        }
    }

    Ok(objects)
}

fn is_list(map: &serde_json::Map<String, Value>) -> bool {
    map.get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.ends_with("List"))
}
