//! `TodoServer`, the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use mockable::Clock;
use todo_core::TaskStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::middleware;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The task store every handler reads and writes.
    pub store: Arc<dyn TaskStore>,
    /// Time source for creation validation.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// When the server started.
    pub start_time: Instant,
    /// Renders the `/metrics` exposition.
    pub metrics: PrometheusHandle,
}

/// The todo HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl TodoServer {
    /// Create a new server around an existing store.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            state: AppState {
                store,
                clock,
                start_time: Instant::now(),
                metrics,
            },
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes and middleware.
    ///
    /// Layer order, outermost first: legacy redirect, request logging,
    /// optional CORS, body limit.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
            .route("/todos/{id}", get(handlers::get_todo).delete(handlers::delete_todo))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state.clone())
            .layer(RequestBodyLimitLayer::new(self.config.max_body_bytes));

        if self.config.cors_permissive {
            router = router.layer(CorsLayer::permissive());
        }

        router
            .layer(axum::middleware::from_fn(middleware::log_requests))
            .layer(axum::middleware::from_fn(middleware::redirect_legacy_paths))
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// The task ends once the shutdown token is cancelled and in-flight
    /// requests have completed.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server error");
            }
            info!("todo server stopped");
        });

        info!(%addr, "todo server listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the task store.
    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.state.store
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.store.len()))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))],
        state.metrics.render(),
    )
}
