//! API server for the invoker service

use anyhow::Result;
use axum::{routing::get, Router};
use invoker_cache::CacheCoordinator;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::routes::{health_check, recommend, AppState};

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Build the router over an existing coordinator
pub fn router(coordinator: Arc<CacheCoordinator>) -> Router {
    let app_state = Arc::new(AppState { coordinator });

    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", get(recommend))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    coordinator: Arc<CacheCoordinator>,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ApiServerConfig, coordinator: Arc<CacheCoordinator>) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    /// Start the API server and run until interrupted
    pub async fn start(self) -> Result<()> {
        let app = router(self.coordinator);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
