//! Server configuration.

use std::time::Duration;

/// Configuration for the todo server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Max request body size in bytes.
    pub max_body_bytes: usize,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_timeout_secs: u64,
    /// Attach `CorsLayer::permissive()`.
    pub cors_permissive: bool,
}

impl ServerConfig {
    /// Shutdown drain timeout as a `Duration`.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_body_bytes: 1024 * 1024, // 1 MB
            shutdown_timeout_secs: 30,
            cors_permissive: false,
        }
    }
}
