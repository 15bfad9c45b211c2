// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smart board sync server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use smartboard_sync::config::ServerConfig;
use smartboard_sync::event::DEFAULT_CHANNEL_CAPACITY;
use smartboard_sync::server;
use tracing_subscriber::EnvFilter;

/// Keeps smart boards and their dashboards in sync.
#[derive(Debug, Parser)]
#[command(name = "smartboard-server", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "SMARTBOARD_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// File the system state is persisted to.
    #[arg(long, env = "SMARTBOARD_DATA_FILE", default_value = ServerConfig::DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Messages a slow dashboard may fall behind before it is resynchronized.
    #[arg(long, env = "SMARTBOARD_BROADCAST_CAPACITY", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    broadcast_capacity: usize,

    /// Admin account id written into a fresh data file.
    #[arg(long, env = "SMARTBOARD_ADMIN_ID", default_value = ServerConfig::DEFAULT_ADMIN)]
    admin_id: String,

    /// Admin password written into a fresh data file.
    #[arg(
        long,
        env = "SMARTBOARD_ADMIN_PASS",
        default_value = ServerConfig::DEFAULT_ADMIN,
        hide_env_values = true
    )]
    admin_pass: String,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig::new()
            .with_bind(self.bind)
            .with_data_file(self.data_file)
            .with_broadcast_capacity(self.broadcast_capacity)
            .with_admin(self.admin_id, self.admin_pass)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_file = %config.data_file().display(),
        "smartboard-server starting"
    );

    let engine = match config.open_engine() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!(
                error = %e,
                data_file = %config.data_file().display(),
                "Cannot load state, refusing to start"
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::serve(engine, config.bind(), shutdown_signal()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
