// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `civic serve` command implementation.

use std::sync::Arc;

use civic_config::CivicConfig;
use civic_core::{CivicError, PluginAdapter, StorageAdapter};
use civic_gateway::{GatewayChannel, GatewayState, ServerConfig};
use civic_storage::SqliteStorage;
use civic_webhook::WebhookBackend;
use tracing::{error, info};

use crate::shutdown;

/// Runs the `civic serve` command.
///
/// Opens storage, connects the webhook backend, and serves the gateway
/// until SIGINT or SIGTERM. In-flight requests are drained before storage
/// is checkpointed and closed.
pub async fn run_serve(config: CivicConfig) -> Result<(), CivicError> {
    info!(assistant = %config.assistant.name, "starting civic serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let backend = Arc::new(WebhookBackend::new(&config.webhook)?);

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    if config.gateway.admin_token.is_none() {
        info!("no admin token configured -- admin API disabled");
    }

    let state = GatewayState::new(Arc::new(config), backend.clone(), storage.clone());
    let gateway = GatewayChannel::new(server_config, state);
    let addr = gateway.start().await?;
    info!(%addr, "civic assistant ready");

    shutdown::stop_token().cancelled().await;

    info!("shutting down");
    if let Err(e) = gateway.shutdown().await {
        error!(error = %e, "gateway shutdown failed");
    }
    backend.shutdown().await?;
    storage.close().await?;
    info!("shutdown complete");
    Ok(())
}
