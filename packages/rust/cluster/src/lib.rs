//! Workload object sources.
//!
//! This crate provides:
//! - [`ObjectSource`]: lists workload objects of one configured kind
//! - [`KubeSource`]: lists them from a live cluster through `kube`
//! - [`ManifestSource`]: reads them from YAML manifest files
//! - [`MockSource`]: returns a fixed list, for tests

mod kube_source;
mod manifests;
mod mock;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Pod;
use peanut_shared::{Result, WorkloadKind};

pub use kube_source::KubeSource;
pub use manifests::ManifestSource;
pub use mock::MockSource;

// ---------------------------------------------------------------------------
// WorkloadList
// ---------------------------------------------------------------------------

/// A homogeneous list of workload objects.
#[derive(Debug, Clone)]
pub enum WorkloadList {
    Deployments(Vec<Deployment>),
    StatefulSets(Vec<StatefulSet>),
    DaemonSets(Vec<DaemonSet>),
    Pods(Vec<Pod>),
    /// Untyped objects read from manifest files.
    Manifests(Vec<serde_json::Value>),
}

impl WorkloadList {
    /// Number of objects in the list.
    pub fn len(&self) -> usize {
        match self {
            Self::Deployments(items) => items.len(),
            Self::StatefulSets(items) => items.len(),
            Self::DaemonSets(items) => items.len(),
            Self::Pods(items) => items.len(),
            Self::Manifests(items) => items.len(),
        }
    }

    /// Whether the list holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `kind` field of a single object of the given workload kind.
pub fn object_kind(kind: WorkloadKind) -> &'static str {
    match kind {
        WorkloadKind::Deployments => "Deployment",
        WorkloadKind::StatefulSets => "StatefulSet",
        WorkloadKind::DaemonSets => "DaemonSet",
        WorkloadKind::Pods => "Pod",
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Lists workload objects for a discovery pass.
///
/// The whole list is fetched before discovery starts; implementations must
/// be thread-safe so one source can serve concurrent requests.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch every object currently in scope.
    async fn list(&self) -> Result<WorkloadList>;

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}
