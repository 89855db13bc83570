//! # todo-api
//!
//! Todo service binary. Loads settings, wires the in-memory store into the
//! HTTP server and runs until interrupted.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mockable::DefaultClock;
use todo_core::{InMemoryTaskStore, TaskStore};
use todo_server::{ServerConfig, TodoServer};
use todo_settings::TodoSettings;

/// In-memory todo HTTP service.
#[derive(Parser, Debug)]
#[command(name = "todo-api", about = "In-memory todo HTTP service")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (defaults to `~/.todo/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// `tracing` filter directive (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Fold command-line overrides into loaded settings.
    fn apply(self, settings: &mut TodoSettings) {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = self.log_level {
            settings.logging.level = level;
        }
    }
}

fn server_config(settings: &TodoSettings) -> ServerConfig {
    ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        max_body_bytes: settings.server.max_body_bytes,
        shutdown_timeout_secs: settings.server.shutdown_timeout_secs,
        cors_permissive: settings.server.cors_permissive,
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                let _ = sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Cli::parse();

    // Settings first: the log level comes from them.
    let settings_path = args
        .settings
        .take()
        .unwrap_or_else(todo_settings::settings_path);
    let mut settings = todo_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    todo_core::logging::init_subscriber(&settings.logging.level);
    tracing::info!(path = %settings_path.display(), "settings loaded");

    let metrics = todo_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let config = server_config(&settings);
    let shutdown_timeout = config.shutdown_timeout();
    let server = TodoServer::new(config, store, Arc::new(DefaultClock), metrics);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(%addr, "todo api ready");

    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    if !server.shutdown().graceful_shutdown(handle, shutdown_timeout).await {
        tracing::warn!(remaining = server.store().len(), "server did not drain in time");
    }
    Ok(())
}
