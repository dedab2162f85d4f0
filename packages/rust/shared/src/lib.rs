//! Shared types, error model, and configuration for peanut-backstage.
//!
//! This crate is the foundation depended on by all other peanut crates.
//! It provides:
//! - [`PeanutError`]: the unified error type
//! - Backstage entity types ([`Component`], [`Location`], [`Link`])
//! - Configuration ([`AppConfig`], [`SourceConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, DiscoveryConfig, ServerConfig, SourceConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{PeanutError, Result};
pub use types::{
    API_VERSION, Component, ComponentMetadata, ComponentSpec, KIND_COMPONENT, KIND_LOCATION,
    Link, Location, LocationMetadata, LocationSpec, WorkloadKind,
};
