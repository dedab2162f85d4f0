//! Application state shared across handlers.

use std::sync::Arc;

use peanut_cluster::ObjectSource;
use peanut_core::CatalogOptions;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Where workload objects are listed from.
    pub source: Arc<dyn ObjectSource>,
    /// Document and discovery settings.
    pub options: Arc<CatalogOptions>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(source: Arc<dyn ObjectSource>, options: CatalogOptions) -> Self {
        Self {
            source,
            options: Arc::new(options),
        }
    }
}
