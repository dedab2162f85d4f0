//! YAML encoding of catalog documents.

use peanut_shared::{PeanutError, Result};
use serde::Serialize;

/// Content type of every generated document.
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Encode an entity as a YAML document.
pub fn to_yaml<T: Serialize>(document: &T) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| PeanutError::Encode(e.to_string()))
}
