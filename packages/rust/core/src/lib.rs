//! Catalog orchestration for peanut-backstage.
//!
//! This crate ties together an object source, the component parser and the
//! entity builder into one discovery pass, and encodes the resulting
//! documents as YAML.

pub mod document;
pub mod pipeline;

pub use document::{YAML_CONTENT_TYPE, to_yaml};
pub use pipeline::{Catalog, CatalogOptions, component_target, discover, merge};
