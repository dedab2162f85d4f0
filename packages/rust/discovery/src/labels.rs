//! Label and annotation keys read from workload objects.
//!
//! Labels are based on
//! <https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/>.

/// Names the component; objects without it are ignored.
pub const NAME_LABEL: &str = "app.kubernetes.io/name";

/// Maps to `spec.type`.
pub const COMPONENT_LABEL: &str = "app.kubernetes.io/component";

/// Maps to `spec.owner`.
pub const CREATED_BY_LABEL: &str = "app.kubernetes.io/created-by";

/// Maps to `spec.system`.
pub const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

/// Maps to `spec.lifecycle`.
pub const LIFECYCLE_LABEL: &str = "backstage.gitops.pro/lifecycle";

/// Comma-separated tag list.
pub const TAGS_ANNOTATION: &str = "backstage.gitops.pro/tags";

/// Maps to `metadata.description`.
pub const DESCRIPTION_ANNOTATION: &str = "backstage.gitops.pro/description";

/// Prefix of `<prefix><n>` link annotations, valued `url,title,icon`.
pub const LINK_ANNOTATION_PREFIX: &str = "backstage.gitops.pro/link-";
