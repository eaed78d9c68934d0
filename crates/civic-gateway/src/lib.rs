// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the civic assistant.
//!
//! Serves the chat widget API (chat turns, feedback, history, widget content,
//! annotation), per-user dashboard views, and the token-protected admin
//! portal API. Each chat turn is forwarded to the chat backend, normalized,
//! persisted in the conversation store, and returned together with its
//! rendered blocks.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod handlers;
pub mod rate_limit;
pub mod server;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use civic_core::{AdapterType, CivicError, HealthStatus, PluginAdapter};

pub use server::{GatewayState, ServerConfig, build_router, start_server};

/// The gateway as a managed adapter: binds on [`start`](Self::start) and
/// drains in-flight requests on [`shutdown`](PluginAdapter::shutdown).
pub struct GatewayChannel {
    config: ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
    server_handle: Mutex<Option<JoinHandle<Result<(), CivicError>>>>,
}

impl GatewayChannel {
    pub fn new(config: ServerConfig, state: GatewayState) -> Self {
        Self {
            config,
            state,
            cancel: CancellationToken::new(),
            server_handle: Mutex::new(None),
        }
    }

    /// Binds the listener and starts serving in a background task.
    ///
    /// Returns the bound address (useful when the configured port is 0).
    pub async fn start(&self) -> Result<SocketAddr, CivicError> {
        let mut handle = self.server_handle.lock().await;
        if handle.is_some() {
            return Err(CivicError::Channel {
                message: "gateway already started".to_string(),
                source: None,
            });
        }

        let listener = server::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(|e| CivicError::Channel {
            message: format!("failed to read bound address: {e}"),
            source: Some(Box::new(e)),
        })?;
        *handle = Some(tokio::spawn(server::serve(
            listener,
            self.state.clone(),
            self.cancel.clone(),
        )));
        Ok(addr)
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }
}

#[async_trait]
impl PluginAdapter for GatewayChannel {
    fn name(&self) -> &str {
        "gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, CivicError> {
        let handle = self.server_handle.lock().await;
        match handle.as_ref() {
            Some(h) if !h.is_finished() => Ok(HealthStatus::Healthy),
            Some(_) => Ok(HealthStatus::Unhealthy("server exited".to_string())),
            None => Ok(HealthStatus::Unhealthy("server not started".to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CivicError> {
        self.cancel.cancel();
        let handle = self.server_handle.lock().await.take();
        if let Some(h) = handle {
            match h.await {
                Ok(result) => result?,
                Err(e) => {
                    return Err(CivicError::Internal(format!("gateway task panicked: {e}")));
                }
            }
        }
        Ok(())
    }
}
