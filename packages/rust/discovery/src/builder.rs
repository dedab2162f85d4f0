//! Turns discovery records into Backstage entity documents.

use peanut_shared::{
    API_VERSION, Component, ComponentMetadata, ComponentSpec, KIND_COMPONENT, KIND_LOCATION,
    Location, LocationMetadata, LocationSpec,
};

use crate::record::DiscoveryRecord;

/// Build the `Component` entity for a record.
pub fn build_component(record: &DiscoveryRecord) -> Component {
    Component {
        api_version: API_VERSION.to_string(),
        kind: KIND_COMPONENT.to_string(),
        metadata: ComponentMetadata {
            name: record.name.clone(),
            description: record.description.clone(),
            tags: record.tags.clone(),
            links: record.links.clone(),
            annotations: record.annotations.clone(),
        },
        spec: ComponentSpec {
            component_type: record.component_type.clone(),
            lifecycle: record.lifecycle.clone(),
            owner: record.owner.clone(),
            system: record.system.clone(),
        },
    }
}

/// Build a `Location` entity. `targets` are kept in the given order.
pub fn build_location(
    name: impl Into<String>,
    description: impl Into<String>,
    targets: Vec<String>,
) -> Location {
    Location {
        api_version: API_VERSION.to_string(),
        kind: KIND_LOCATION.to_string(),
        metadata: LocationMetadata {
            name: name.into(),
            description: description.into(),
        },
        spec: LocationSpec { targets },
    }
}
