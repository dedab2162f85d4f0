//! API server implementation.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::routes;
use crate::state::AppState;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server.
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Builds the router with request tracing.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Runs the server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), std::io::Error> {
        self.run_until(shutdown_signal()).await
    }

    /// Runs the server with a custom shutdown signal.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = self.config.bind_address;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, source = self.state.source.name(), "serving catalog");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("server shut down gracefully");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
