//! # todo-server
//!
//! Axum HTTP server for the todo collection.
//!
//! - `/todos` CRUD routes backed by an injected [`TaskStore`](todo_core::TaskStore)
//! - Creation validation answered with RFC 9457 problem bodies
//! - `/tasks/*` → `/todos/*` redirect and per-request logging middleware
//! - `/health` and Prometheus `/metrics`
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod problem;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use problem::{ApiError, ProblemDetails};
pub use server::{AppState, TodoServer};
pub use shutdown::ShutdownCoordinator;
