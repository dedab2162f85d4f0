//! End-to-end discovery pass: object source → component parser → catalog.

use std::time::Instant;

use peanut_cluster::{ObjectSource, WorkloadList};
use peanut_discovery::{
    ComponentParser, DiscoveryOptions, ManifestAccessor, MetadataAccessor, ResourceAccessor,
    build_location,
};
use peanut_shared::{AppConfig, Component, Location, Result};
use tracing::{info, instrument};

/// Settings for a discovery pass and the documents it produces.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// `metadata.name` of the generated Location.
    pub location_name: String,
    /// `metadata.description` of the generated Location.
    pub location_description: String,
    /// Annotation propagation settings.
    pub discovery: DiscoveryOptions,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CatalogOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            location_name: config.catalog.location_name.clone(),
            location_description: config.catalog.location_description.clone(),
            discovery: DiscoveryOptions::from(&config.discovery),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The components found by one discovery pass, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    components: Vec<Component>,
}

impl Catalog {
    /// Wrap components, sorting them by name.
    pub fn new(mut components: Vec<Component>) -> Self {
        components.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Self { components }
    }

    /// All components, sorted by name.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// The component named `name`.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// A Location pointing at one `info.yaml` per component.
    pub fn location(&self, options: &CatalogOptions) -> Location {
        let targets = self
            .components
            .iter()
            .map(|c| component_target(c.name()))
            .collect();
        build_location(
            options.location_name.as_str(),
            options.location_description.as_str(),
            targets,
        )
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the pass found no component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Relative URL of a component's document, as listed in the Location.
pub fn component_target(name: &str) -> String {
    format!("./component/{name}/info.yaml")
}

// ---------------------------------------------------------------------------
// Discovery pass
// ---------------------------------------------------------------------------

/// List objects from `source` and merge them into a catalog.
///
/// Every call starts from an empty parser; nothing is kept between passes.
#[instrument(skip_all, fields(source = source.name()))]
pub async fn discover(source: &dyn ObjectSource, options: &CatalogOptions) -> Result<Catalog> {
    let start = Instant::now();

    let list = source.list().await?;
    let catalog = Catalog::new(merge(&list, &options.discovery)?);

    info!(
        objects = list.len(),
        components = catalog.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "discovery pass complete"
    );
    Ok(catalog)
}

/// Run one homogeneous list through a fresh parser.
///
/// The returned components are in no particular order.
pub fn merge(list: &WorkloadList, options: &DiscoveryOptions) -> Result<Vec<Component>> {
    match list {
        WorkloadList::Deployments(items) => snapshot(ResourceAccessor, options, items),
        WorkloadList::StatefulSets(items) => snapshot(ResourceAccessor, options, items),
        WorkloadList::DaemonSets(items) => snapshot(ResourceAccessor, options, items),
        WorkloadList::Pods(items) => snapshot(ResourceAccessor, options, items),
        WorkloadList::Manifests(items) => snapshot(ManifestAccessor, options, items),
    }
}

fn snapshot<A, O>(accessor: A, options: &DiscoveryOptions, items: &[O]) -> Result<Vec<Component>>
where
    A: MetadataAccessor<O>,
{
    let mut parser = ComponentParser::with_accessor(accessor, options.clone());
    parser.add(items)?;
    Ok(parser.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use peanut_cluster::{ManifestSource, MockSource};
    use peanut_shared::{PeanutError, SourceConfig};
    use serde_json::json;

    fn named(name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.into()),
                labels: Some(BTreeMap::from([(
                    "app.kubernetes.io/name".to_string(),
                    name.to_string(),
                )])),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn catalog_is_sorted_by_name() {
        let source = MockSource::new(WorkloadList::Deployments(vec![
            named("nginx"),
            named("mysql"),
            named("zookeeper"),
        ]));
        let catalog = discover(&source, &CatalogOptions::default()).await.unwrap();

        let names: Vec<_> = catalog.components().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["mysql", "nginx", "zookeeper"]);
        assert!(catalog.component("nginx").is_some());
        assert!(catalog.component("does-not-exist").is_none());
    }

    #[tokio::test]
    async fn location_targets_every_component() {
        let items = vec![named("nginx"), named("mysql")];
        let source = MockSource::new(WorkloadList::Deployments(items));
        let options = CatalogOptions {
            location_name: "test-service".into(),
            location_description: "just a test".into(),
            ..Default::default()
        };
        let location = discover(&source, &options).await.unwrap().location(&options);

        assert_eq!(location.metadata.name, "test-service");
        assert_eq!(location.metadata.description, "just a test");
        assert_eq!(
            location.spec.targets,
            vec!["./component/mysql/info.yaml", "./component/nginx/info.yaml"]
        );
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let source = MockSource::failing("forbidden");
        let err = discover(&source, &CatalogOptions::default()).await.unwrap_err();
        assert!(matches!(err, PeanutError::Cluster(_)));
    }

    #[tokio::test]
    async fn extraction_failure_aborts_pass() {
        let source = MockSource::new(WorkloadList::Manifests(vec![
            json!({"kind": "Deployment", "metadata": {"labels": {"app.kubernetes.io/name": "ok"}}}),
            json!({"kind": "Deployment", "metadata": "broken"}),
        ]));
        let err = discover(&source, &CatalogOptions::default()).await.unwrap_err();
        assert!(err.is_discovery_error());
    }

    #[tokio::test]
    async fn manifest_fixture_end_to_end() {
        let source = ManifestSource::new(
            vec!["../../../fixtures/manifests/workloads.yaml".into()],
            SourceConfig::default(),
        );
        let catalog = discover(&source, &CatalogOptions::default()).await.unwrap();

        assert_eq!(catalog.len(), 2);
        let mysql = catalog.component("mysql").unwrap();
        assert_eq!(mysql.metadata.tags, vec!["java", "data", "web"]);
        assert_eq!(mysql.metadata.links[0].title, "Example Users");
        assert_eq!(mysql.metadata.links[1].title, "Example Groups");
        assert_eq!(
            mysql.metadata.annotations.keys().collect::<Vec<_>>(),
            vec!["backstage.io/kubernetes-id"]
        );
        assert_eq!(mysql.spec.lifecycle, "staging");
        assert_eq!(catalog.component("nginx").unwrap().spec.owner, "web-team");
    }

    #[test]
    fn empty_list_gives_empty_catalog() {
        let list = WorkloadList::Pods(Vec::new());
        let components = merge(&list, &DiscoveryOptions::default()).unwrap();
        assert!(components.is_empty());

        let location = Catalog::new(components).location(&CatalogOptions::default());
        assert!(location.spec.targets.is_empty());
    }
}
