//! The per-component accumulator filled during a merge session.

use std::collections::BTreeMap;

use peanut_shared::Link;

/// Everything discovered about one component so far.
///
/// Every object naming the component overwrites every field; see
/// [`ComponentParser::add`](crate::ComponentParser::add).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub name: String,
    pub owner: String,
    pub component_type: String,
    pub system: String,
    pub lifecycle: String,
    pub description: String,
    pub tags: Vec<String>,
    pub links: Vec<Link>,
    pub annotations: BTreeMap<String, String>,
}

impl DiscoveryRecord {
    /// A fresh record with every other field empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
