// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration testing.
//!
//! `TestHarness` assembles configuration, a [`MockBackend`], and an
//! initialized SQLite store in a temp directory.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use civic_config::CivicConfig;
use civic_config::model::StorageConfig;
use civic_core::{ChatBackend, CivicError, Message, StorageAdapter};
use civic_normalize::MessageNormalizer;
use civic_storage::SqliteStorage;

use crate::mock_backend::MockBackend;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<Value>,
    config: CivicConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            config: CivicConfig::default(),
        }
    }

    /// Set mock backend replies.
    pub fn with_mock_replies(mut self, replies: Vec<Value>) -> Self {
        self.replies = replies;
        self
    }

    /// Replace the whole configuration. The storage section is overridden
    /// with the temp database.
    pub fn with_config(mut self, config: CivicConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable the admin API with the given bearer token.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.config.gateway.admin_token = Some(token.into());
        self
    }

    /// Set the per-session chat budget.
    pub fn with_rate_limit(mut self, max_requests: u32, window_secs: u64) -> Self {
        self.config.rate_limit.max_requests = max_requests;
        self.config.rate_limit.window_secs = window_secs;
        self
    }

    /// Build the test harness, creating and initializing temp storage.
    pub async fn build(mut self) -> Result<TestHarness, CivicError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| CivicError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        self.config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let storage = SqliteStorage::new(self.config.storage.clone());
        storage.initialize().await?;

        Ok(TestHarness {
            backend: Arc::new(MockBackend::with_replies(self.replies)),
            storage: Arc::new(storage),
            config: Arc::new(self.config),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock backend and temp storage.
pub struct TestHarness {
    /// The scripted chat backend.
    pub backend: Arc<MockBackend>,
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Configuration, with storage pointing at the temp DB.
    pub config: Arc<CivicConfig>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The backend as a trait object.
    pub fn chat_backend(&self) -> Arc<dyn ChatBackend> {
        self.backend.clone()
    }

    /// The store as a trait object.
    pub fn storage_adapter(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    /// Stores one user turn and the normalized reply in the session's active
    /// conversation, opening one if needed.
    ///
    /// Returns the conversation id and the stored bot message.
    pub async fn seed_turn(
        &self,
        session_id: &str,
        question: &str,
        raw_reply: &Value,
    ) -> Result<(String, Message), CivicError> {
        let conversation_id = match self.storage.find_active_conversation(session_id).await? {
            Some(conv) => conv.id,
            None => {
                self.storage
                    .create_conversation(session_id, "test-agent", "127.0.0.1", None)
                    .await?
            }
        };

        let now = Utc::now();
        let user = Message::user(
            uuid::Uuid::new_v4().to_string(),
            question,
            now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        );
        self.storage.store_message(&conversation_id, &user).await?;

        let normalizer = MessageNormalizer::new(self.config.errors.network_error.clone());
        let bot = normalizer.normalize(raw_reply, now + chrono::Duration::seconds(2));
        self.storage.store_message(&conversation_id, &bot).await?;

        tracing::debug!(conversation_id = %conversation_id, "seeded conversation turn");
        Ok((conversation_id, bot))
    }
}
