//! Catalog document endpoints.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use peanut_core::{YAML_CONTENT_TYPE, discover, to_yaml};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/backstage/catalog-info.yaml", get(catalog_info))
        .route("/backstage/component/:name/info.yaml", get(component_info))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// The Location document pointing at every discovered component.
#[instrument(skip_all)]
async fn catalog_info(State(state): State<AppState>) -> Result<Response, ApiError> {
    info!("querying catalog-info.yaml");
    let catalog = discover(state.source.as_ref(), &state.options).await?;
    yaml_response(&catalog.location(&state.options))
}

/// The Component document for one discovered component.
#[instrument(skip_all, fields(component = %name))]
async fn component_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    info!("querying component");
    let catalog = discover(state.source.as_ref(), &state.options).await?;
    let component = catalog
        .component(&name)
        .ok_or_else(|| ApiError::NotFound(name.clone()))?;
    yaml_response(component)
}

async fn healthz() -> &'static str {
    "ok"
}

fn yaml_response<T: Serialize>(document: &T) -> Result<Response, ApiError> {
    let body = to_yaml(document)?;
    let headers = [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)];
    Ok((headers, body).into_response())
}
