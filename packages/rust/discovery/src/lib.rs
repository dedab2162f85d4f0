//! Component discovery from Kubernetes workload metadata.
//!
//! [`ComponentParser`] scans workload objects, reads their
//! `app.kubernetes.io/*` labels and `backstage.*` annotations, and folds every
//! object naming the same component into one [`DiscoveryRecord`]. Records are
//! turned into Backstage [`Component`] entities on demand.

mod builder;
pub mod labels;
mod metadata;
pub mod parser;
mod record;

use std::collections::{BTreeMap, HashMap};

use peanut_shared::{Component, DiscoveryConfig, Result};
use tracing::{debug, instrument};

pub use builder::{build_component, build_location};
pub use metadata::{ManifestAccessor, MetadataAccessor, ResourceAccessor};
pub use record::DiscoveryRecord;

use labels::{
    COMPONENT_LABEL, CREATED_BY_LABEL, DESCRIPTION_ANNOTATION, LIFECYCLE_LABEL, NAME_LABEL,
    PART_OF_LABEL, TAGS_ANNOTATION,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Controls which keys end up in a component's free-form annotations.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Only keys under this namespace (`<namespace>/<name>`) are copied.
    pub annotation_namespace: String,
    /// Also copy namespaced label keys; labels win over annotations.
    pub label_annotations: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            annotation_namespace: config.annotation_namespace.clone(),
            label_annotations: config.label_annotations,
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentParser
// ---------------------------------------------------------------------------

/// Accumulates components discovered across one or more object lists.
///
/// A parser is meant for a single discovery pass and is not shared between
/// threads; build a fresh one per request.
#[derive(Debug, Clone, Default)]
pub struct ComponentParser<A = ResourceAccessor> {
    accessor: A,
    options: DiscoveryOptions,
    components: HashMap<String, DiscoveryRecord>,
}

impl ComponentParser<ResourceAccessor> {
    /// A parser for typed Kubernetes resources with default options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A> ComponentParser<A> {
    /// A parser reading metadata through `accessor`.
    pub fn with_accessor(accessor: A, options: DiscoveryOptions) -> Self {
        Self {
            accessor,
            options,
            components: HashMap::new(),
        }
    }

    /// Replace the annotation options.
    pub fn options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a homogeneous list of objects, in the order given.
    ///
    /// Objects without an `app.kubernetes.io/name` label are skipped. Every
    /// object that names a component overwrites all of that component's
    /// fields (owner, type, system, lifecycle, description, tags, links and
    /// annotations) with its own values, even empty ones: the last object
    /// wins, nothing is merged. Calls are cumulative.
    ///
    /// If any object's metadata cannot be read, or a link annotation has a
    /// non-numeric sequence suffix, the whole call fails and the parser is
    /// left as it was before it.
    #[instrument(skip_all)]
    pub fn add<'a, O, I>(&mut self, objects: I) -> Result<()>
    where
        O: 'a,
        I: IntoIterator<Item = &'a O>,
        A: MetadataAccessor<O>,
    {
        let mut staged: HashMap<String, DiscoveryRecord> = HashMap::new();
        let mut seen = 0usize;

        for obj in objects {
            seen += 1;
            self.observe(&mut staged, obj)?;
        }

        debug!(
            objects = seen,
            components = staged.len(),
            "merged object list"
        );
        self.components.extend(staged);
        Ok(())
    }

    fn observe<O>(&self, staged: &mut HashMap<String, DiscoveryRecord>, obj: &O) -> Result<()>
    where
        A: MetadataAccessor<O>,
    {
        let labels = self.accessor.labels(obj)?;
        let name = match labels.get(NAME_LABEL) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => return Ok(()),
        };

        let mut record = staged
            .remove(&name)
            .or_else(|| self.components.get(&name).cloned())
            .unwrap_or_else(|| DiscoveryRecord::new(name.as_str()));

        // TODO: record which workload each value came from once sources can
        // report it; conflicting values are currently invisible.
        record.owner = value_of(&labels, CREATED_BY_LABEL);
        record.component_type = value_of(&labels, COMPONENT_LABEL);
        record.system = value_of(&labels, PART_OF_LABEL);
        record.lifecycle = value_of(&labels, LIFECYCLE_LABEL);

        let annotations = self.accessor.annotations(obj)?;
        record.tags = parser::parse_tags(
            annotations
                .get(TAGS_ANNOTATION)
                .map(String::as_str)
                .unwrap_or_default(),
        );
        record.description = value_of(&annotations, DESCRIPTION_ANNOTATION);

        let namespace = &self.options.annotation_namespace;
        let mut copied = parser::namespaced(&annotations, namespace);
        if self.options.label_annotations {
            copied.extend(parser::namespaced(&labels, namespace));
        }
        record.annotations = copied;

        record.links = parser::parse_links(&annotations)?;

        debug!(component = %name, "observed component");
        staged.insert(name, record);
        Ok(())
    }

    /// Components discovered so far.
    ///
    /// The order is unspecified; sort by name when determinism matters.
    pub fn snapshot(&self) -> Vec<Component> {
        self.components.values().map(build_component).collect()
    }

    /// The component with the given name, if discovered.
    pub fn component(&self, name: &str) -> Option<Component> {
        self.components.get(name).map(build_component)
    }

    /// Number of components discovered so far.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component has been discovered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn value_of(map: &BTreeMap<String, String>, key: &str) -> String {
    map.get(key).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use peanut_shared::{Link, PeanutError};
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn deployment(name: &str, labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some("test-ns".into()),
                labels: Some(map(labels)),
                annotations: Some(map(annotations)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sorted(parser: &ComponentParser) -> Vec<Component> {
        let mut components = parser.snapshot();
        components.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        components
    }

    #[test]
    fn deployment_without_labels_is_skipped() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[Deployment {
                metadata: ObjectMeta {
                    name: Some("test".into()),
                    ..Default::default()
                },
                ..Default::default()
            }])
            .unwrap();
        assert!(parser.is_empty());
    }

    #[test]
    fn empty_name_label_is_skipped() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[deployment(
                "test",
                &[(NAME_LABEL, ""), (CREATED_BY_LABEL, "team")],
                &[],
            )])
            .unwrap();
        assert!(parser.snapshot().is_empty());
    }

    #[test]
    fn deployment_representing_single_component() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[deployment(
                "test",
                &[
                    ("app.kubernetes.io/instance", "mysql-staging"),
                    (NAME_LABEL, "mysql"),
                    (COMPONENT_LABEL, "database"),
                    (CREATED_BY_LABEL, "test-team"),
                    (PART_OF_LABEL, "user-db"),
                    (LIFECYCLE_LABEL, "staging"),
                    ("backstage.io/kubernetes-id", "testing"),
                ],
                &[
                    (TAGS_ANNOTATION, "java,data"),
                    (DESCRIPTION_ANNOTATION, "This is a test"),
                    ("testing.com/annotation", "test-annotation"),
                    ("backstage.gitops.pro/link-0", "https://example.com/user,Example Users,user"),
                    (
                        "backstage.gitops.pro/link-1",
                        "https://example.com/group,Example Groups,group",
                    ),
                    ("backstage.io/kubernetes-label-selector", "app=my-app,component=front-end"),
                ],
            )])
            .unwrap();

        let components = parser.snapshot();
        assert_eq!(components.len(), 1);
        let c = &components[0];
        assert_eq!(c.kind, "Component");
        assert_eq!(c.metadata.name, "mysql");
        assert_eq!(c.metadata.description, "This is a test");
        assert_eq!(c.metadata.tags, vec!["java", "data"]);
        assert_eq!(
            c.metadata.annotations,
            map(&[
                ("backstage.io/kubernetes-label-selector", "app=my-app,component=front-end"),
                ("backstage.io/kubernetes-id", "testing"),
            ])
        );
        assert_eq!(
            c.metadata.links,
            vec![
                Link {
                    url: "https://example.com/user".into(),
                    title: "Example Users".into(),
                    icon: "user".into(),
                },
                Link {
                    url: "https://example.com/group".into(),
                    title: "Example Groups".into(),
                    icon: "group".into(),
                },
            ]
        );
        assert_eq!(c.spec.component_type, "database");
        assert_eq!(c.spec.lifecycle, "staging");
        assert_eq!(c.spec.owner, "test-team");
        assert_eq!(c.spec.system, "user-db");
    }

    #[test]
    fn multiple_deployments_multiple_components() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[
                deployment(
                    "test-1",
                    &[
                        (NAME_LABEL, "mysql"),
                        (COMPONENT_LABEL, "database"),
                        (CREATED_BY_LABEL, "test-team"),
                        (PART_OF_LABEL, "user-db"),
                        ("backstage.io/kubernetes-id", "testing-production"),
                    ],
                    &[(DESCRIPTION_ANNOTATION, "This is a test")],
                ),
                deployment(
                    "test-2",
                    &[
                        (NAME_LABEL, "nginx"),
                        (COMPONENT_LABEL, "webserver"),
                        (CREATED_BY_LABEL, "test-team"),
                        (PART_OF_LABEL, "user-db"),
                        ("backstage.io/kubernetes-id", "testing-staging"),
                    ],
                    &[(DESCRIPTION_ANNOTATION, "This is a test")],
                ),
            ])
            .unwrap();

        let components = sorted(&parser);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].metadata.name, "mysql");
        assert_eq!(components[0].spec.component_type, "database");
        assert_eq!(
            components[0].metadata.annotations,
            map(&[("backstage.io/kubernetes-id", "testing-production")])
        );
        assert!(components[0].metadata.tags.is_empty());
        assert!(components[0].metadata.links.is_empty());
        assert_eq!(components[1].metadata.name, "nginx");
        assert_eq!(components[1].spec.component_type, "webserver");
        assert_eq!(components[1].spec.lifecycle, "");
    }

    #[test]
    fn last_object_wins_within_one_add() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[
                deployment(
                    "a",
                    &[(NAME_LABEL, "mysql"), (CREATED_BY_LABEL, "team-one")],
                    &[(TAGS_ANNOTATION, "java")],
                ),
                deployment(
                    "b",
                    &[(NAME_LABEL, "mysql"), (CREATED_BY_LABEL, "team-two")],
                    &[],
                ),
            ])
            .unwrap();

        let c = parser.component("mysql").unwrap();
        assert_eq!(c.spec.owner, "team-two");
        // tags are replaced, not merged
        assert!(c.metadata.tags.is_empty());
    }

    #[test]
    fn sequential_adds_overwrite_not_merge() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[deployment(
                "a",
                &[
                    (NAME_LABEL, "mysql"),
                    (CREATED_BY_LABEL, "team-one"),
                    (PART_OF_LABEL, "user-db"),
                ],
                &[(DESCRIPTION_ANNOTATION, "first")],
            )])
            .unwrap();
        parser
            .add(&[deployment(
                "b",
                &[(NAME_LABEL, "mysql"), (COMPONENT_LABEL, "database")],
                &[],
            )])
            .unwrap();

        assert_eq!(parser.len(), 1);
        let c = parser.component("mysql").unwrap();
        assert_eq!(c.spec.component_type, "database");
        assert_eq!(c.spec.owner, "");
        assert_eq!(c.spec.system, "");
        assert_eq!(c.metadata.description, "");
    }

    #[test]
    fn label_overrides_annotation_for_namespaced_key() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[deployment(
                "a",
                &[
                    (NAME_LABEL, "mysql"),
                    ("backstage.io/kubernetes-id", "from-label"),
                ],
                &[
                    ("backstage.io/kubernetes-id", "from-annotation"),
                    ("backstage.io/techdocs-ref", "dir:."),
                    ("example.com/other", "dropped"),
                ],
            )])
            .unwrap();

        let c = parser.component("mysql").unwrap();
        assert_eq!(
            c.metadata.annotations,
            map(&[
                ("backstage.io/kubernetes-id", "from-label"),
                ("backstage.io/techdocs-ref", "dir:."),
            ])
        );
    }

    #[test]
    fn label_annotations_can_be_disabled() {
        let options = DiscoveryOptions {
            label_annotations: false,
            ..Default::default()
        };
        let mut parser = ComponentParser::new().options(options);
        parser
            .add(&[deployment(
                "a",
                &[
                    (NAME_LABEL, "mysql"),
                    ("backstage.io/kubernetes-id", "from-label"),
                ],
                &[],
            )])
            .unwrap();

        let c = parser.component("mysql").unwrap();
        assert!(c.metadata.annotations.is_empty());
    }

    #[test]
    fn bad_link_suffix_fails_whole_batch() {
        let mut parser = ComponentParser::new();
        let err = parser
            .add(&[
                deployment("ok", &[(NAME_LABEL, "nginx")], &[]),
                deployment(
                    "bad",
                    &[(NAME_LABEL, "mysql")],
                    &[("backstage.gitops.pro/link-x", "https://a,A,a")],
                ),
            ])
            .unwrap_err();

        assert!(matches!(err, PeanutError::LinkParse { .. }));
        assert!(parser.snapshot().is_empty());
    }

    #[test]
    fn failed_add_keeps_earlier_state() {
        let mut parser = ComponentParser::new();
        parser
            .add(&[deployment(
                "a",
                &[(NAME_LABEL, "mysql"), (CREATED_BY_LABEL, "team-one")],
                &[],
            )])
            .unwrap();

        let result = parser.add(&[deployment(
            "b",
            &[(NAME_LABEL, "mysql"), (CREATED_BY_LABEL, "team-two")],
            &[("backstage.gitops.pro/link-one", "https://a,A,a")],
        )]);

        assert!(result.is_err());
        assert_eq!(parser.component("mysql").unwrap().spec.owner, "team-one");
    }

    #[test]
    fn manifests_share_the_engine() {
        let mut parser =
            ComponentParser::with_accessor(ManifestAccessor, DiscoveryOptions::default());
        let objects = vec![
            json!({
                "kind": "StatefulSet",
                "metadata": {
                    "name": "redis",
                    "labels": {NAME_LABEL: "redis", COMPONENT_LABEL: "cache"},
                    "annotations": {TAGS_ANNOTATION: "kv, memory"},
                },
            }),
            json!({"kind": "StatefulSet", "metadata": {"name": "unlabelled"}}),
        ];
        parser.add(&objects).unwrap();

        let c = parser.component("redis").unwrap();
        assert_eq!(c.spec.component_type, "cache");
        assert_eq!(c.metadata.tags, vec!["kv", "memory"]);
        assert_eq!(parser.len(), 1);
    }

    #[test]
    fn malformed_manifest_aborts_batch() {
        let mut parser =
            ComponentParser::with_accessor(ManifestAccessor, DiscoveryOptions::default());
        let objects = vec![
            json!({"metadata": {"labels": {NAME_LABEL: "redis"}}}),
            json!({"kind": "Deployment"}),
        ];
        let err = parser.add(&objects).unwrap_err();
        assert!(matches!(err, PeanutError::Extraction { .. }));
        assert!(parser.is_empty());
    }
}
