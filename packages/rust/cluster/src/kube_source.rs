//! Lists workload objects from a Kubernetes cluster.

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::{Client, Resource};
use peanut_shared::{PeanutError, Result, SourceConfig, WorkloadKind};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::{ObjectSource, WorkloadList};

/// Object source backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSource {
    client: Client,
    config: SourceConfig,
}

impl Debug for KubeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KubeSource {
    /// Use an existing client.
    pub fn new(client: Client, config: SourceConfig) -> Self {
        Self { client, config }
    }

    /// Connect using the in-cluster service account or the local kubeconfig.
    #[instrument(skip_all, fields(kind = %config.kind))]
    pub async fn connect(config: SourceConfig) -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| PeanutError::Cluster(format!("kube client: {e}")))?;
        info!(
            namespace = config.namespace.as_deref().unwrap_or("*"),
            "connected to cluster"
        );
        Ok(Self::new(client, config))
    }

    fn list_params(&self) -> ListParams {
        match &self.config.label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        }
    }

    async fn list_kind<K>(&self) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = match &self.config.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let list = api.list(&self.list_params()).await.map_err(|e| {
            PeanutError::Cluster(format!("failed to list {}: {e}", self.config.kind))
        })?;

        debug!(count = list.items.len(), kind = %self.config.kind, "listed objects");
        Ok(list.items)
    }
}

#[async_trait]
impl ObjectSource for KubeSource {
    async fn list(&self) -> Result<WorkloadList> {
        Ok(match self.config.kind {
            WorkloadKind::Deployments => WorkloadList::Deployments(self.list_kind().await?),
            WorkloadKind::StatefulSets => WorkloadList::StatefulSets(self.list_kind().await?),
            WorkloadKind::DaemonSets => WorkloadList::DaemonSets(self.list_kind().await?),
            WorkloadKind::Pods => WorkloadList::Pods(self.list_kind().await?),
        })
    }

    fn name(&self) -> &str {
        "kubernetes"
    }
}
