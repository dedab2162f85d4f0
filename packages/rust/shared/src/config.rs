//! Application configuration for peanut-backstage.
//!
//! User config lives at `~/.peanut-backstage/peanut-backstage.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PeanutError, Result};
use crate::types::WorkloadKind;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "peanut-backstage.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".peanut-backstage";

// ---------------------------------------------------------------------------
// Config structs (matching peanut-backstage.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Generated catalog documents.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Workload discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// `metadata.name` of the generated Location.
    #[serde(default = "default_location_name")]
    pub location_name: String,

    /// `metadata.description` of the generated Location.
    #[serde(default = "default_location_description")]
    pub location_description: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            location_name: default_location_name(),
            location_description: default_location_description(),
        }
    }
}

fn default_location_name() -> String {
    "peanut-backstage".into()
}
fn default_location_description() -> String {
    "Components discovered from Kubernetes workloads".into()
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Kind of workload object to list.
    #[serde(default)]
    pub kind: WorkloadKind,

    /// Namespace to list from. All namespaces when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Kubernetes label selector narrowing the listed objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,

    /// Copy whitelisted label keys into component annotations as well.
    #[serde(default = "default_true")]
    pub label_annotations: bool,

    /// Annotation namespace copied verbatim onto components.
    #[serde(default = "default_annotation_namespace")]
    pub annotation_namespace: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            kind: WorkloadKind::default(),
            namespace: None,
            label_selector: None,
            label_annotations: true,
            annotation_namespace: default_annotation_namespace(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_annotation_namespace() -> String {
    "backstage.io".into()
}

// ---------------------------------------------------------------------------
// Source config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime object source configuration, merged from config file + CLI flags.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    /// Kind of workload object to list.
    pub kind: WorkloadKind,
    /// Namespace to list from (`None` = all namespaces).
    pub namespace: Option<String>,
    /// Label selector passed to the list call.
    pub label_selector: Option<String>,
}

impl From<&AppConfig> for SourceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            kind: config.discovery.kind,
            namespace: config.discovery.namespace.clone(),
            label_selector: config.discovery.label_selector.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.peanut-backstage/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PeanutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.peanut-backstage/peanut-backstage.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PeanutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PeanutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PeanutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PeanutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PeanutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
