//! HTTP API serving generated Backstage catalog documents.
//!
//! - `GET /backstage/catalog-info.yaml`: a Location listing every component
//! - `GET /backstage/component/:name/info.yaml`: one Component
//! - `GET /healthz`: liveness probe
//!
//! Every request runs its own discovery pass against the configured
//! [`ObjectSource`](peanut_cluster::ObjectSource).

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
