// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat backend trait for the external workflow webhook.

use async_trait::async_trait;

use crate::error::CivicError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChatRequest;

/// Adapter for the service that answers citizen questions.
///
/// The reply is returned untouched as JSON; its shape is not guaranteed and
/// is reconciled by the normalizer.
#[async_trait]
pub trait ChatBackend: PluginAdapter {
    /// Sends one user turn and returns the raw reply body.
    async fn send(&self, request: ChatRequest) -> Result<serde_json::Value, CivicError>;
}
