// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP and WebSocket front end.
//!
//! # Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `POST` | `/api/register` | Board heartbeat |
//! | `GET` | `/api/snapshot` | Current snapshot |
//! | `POST` | `/api/command` | Dashboard command over HTTP |
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/ws` | Dashboard WebSocket |
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartboard_sync::config::ServerConfig;
//! use smartboard_sync::server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new();
//!     let engine = Arc::new(config.open_engine()?);
//!
//!     server::serve(engine, config.bind(), async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

mod routes;
mod ws;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::SyncEngine;

pub use routes::ApiError;

/// Builds the router for `engine`.
///
/// CORS is permissive because dashboards are served from other origins.
pub fn router(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/api/register", post(routes::register))
        .route("/api/snapshot", get(routes::snapshot))
        .route("/api/command", post(routes::command))
        .route("/health", get(routes::health))
        .route("/ws", get(ws::upgrade))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Runs an engine call on the blocking pool.
///
/// Every mutating engine call writes the data file before it returns.
async fn on_engine<T, F>(engine: &Arc<SyncEngine>, call: F) -> Result<crate::Result<T>, JoinError>
where
    F: FnOnce(&SyncEngine) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || call(&engine)).await
}

/// Serves `engine` on `bind` until `shutdown` completes.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or the server fails.
pub async fn serve<F>(engine: Arc<SyncEngine>, bind: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
