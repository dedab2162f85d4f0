//! Backstage catalog entity types.
//!
//! Field names and nesting follow the Backstage descriptor format
//! (<https://backstage.io/docs/features/software-catalog/descriptor-format>).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// API version used in all Backstage resources.
pub const API_VERSION: &str = "backstage.io/v1alpha1";

/// Kind for Backstage components.
pub const KIND_COMPONENT: &str = "Component";

/// Kind for Backstage locations.
pub const KIND_LOCATION: &str = "Location";

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A link for users to access some facet of data for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: String,
    pub icon: String,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A Backstage `Component` entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub api_version: String,
    pub kind: String,
    pub metadata: ComponentMetadata,
    pub spec: ComponentSpec,
}

/// `metadata` block of a [`Component`]. Empty optional fields are elided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// `spec` block of a [`Component`]. All fields are always emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub lifecycle: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub system: String,
}

impl Component {
    /// The component's catalog name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A Backstage `Location` entity, pointing at one document per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub api_version: String,
    pub kind: String,
    pub metadata: LocationMetadata,
    pub spec: LocationSpec,
}

/// `metadata` block of a [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `spec` block of a [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

// ---------------------------------------------------------------------------
// WorkloadKind
// ---------------------------------------------------------------------------

/// The kind of workload object scanned for component metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    #[default]
    #[serde(alias = "deployment")]
    Deployments,
    #[serde(alias = "statefulset")]
    StatefulSets,
    #[serde(alias = "daemonset")]
    DaemonSets,
    #[serde(alias = "pod")]
    Pods,
}

impl WorkloadKind {
    /// Lower-case plural name, as used on the command line and in config.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deployments => "deployments",
            Self::StatefulSets => "statefulsets",
            Self::DaemonSets => "daemonsets",
            Self::Pods => "pods",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deployments" | "deployment" => Ok(Self::Deployments),
            "statefulsets" | "statefulset" => Ok(Self::StatefulSets),
            "daemonsets" | "daemonset" => Ok(Self::DaemonSets),
            "pods" | "pod" => Ok(Self::Pods),
            other => Err(format!(
                "unknown workload kind '{other}' (deployments, statefulsets, daemonsets, pods)"
            )),
        }
    }
}
