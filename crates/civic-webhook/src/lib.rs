// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat backend backed by a workflow-automation webhook (n8n).
//!
//! This crate implements [`ChatBackend`] by POSTing each user turn to the
//! configured webhook and handing the untouched JSON reply to the caller.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use civic_config::model::WebhookConfig;
use civic_core::error::CivicError;
use civic_core::traits::{ChatBackend, PluginAdapter};
use civic_core::types::{AdapterType, ChatRequest, HealthStatus};
use tracing::{debug, info};

use crate::client::WebhookClient;

/// Webhook chat backend implementing [`ChatBackend`].
pub struct WebhookBackend {
    client: WebhookClient,
}

impl WebhookBackend {
    /// Builds the backend from configuration. Fails when no URL is configured.
    pub fn new(config: &WebhookConfig) -> Result<Self, CivicError> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| CivicError::Config("webhook.url is not set".to_string()))?;
        let client = WebhookClient::new(
            url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;
        info!(url = client.url(), "webhook backend initialized");
        Ok(Self { client })
    }

    /// Wraps an already-built client.
    pub fn from_client(client: WebhookClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for WebhookBackend {
    fn name(&self) -> &str {
        "webhook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, CivicError> {
        // Probing the webhook would start a workflow run.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CivicError> {
        debug!("webhook backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for WebhookBackend {
    async fn send(&self, request: ChatRequest) -> Result<serde_json::Value, CivicError> {
        self.client.post(request).await
    }
}
