// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use civic_config::model::StorageConfig;
use civic_core::types::{
    AdminStats, Conversation, ConversationDetails, ConversationStatus, ConversationSummary,
    RecentConversation, UserStats,
};
use civic_core::{
    AdapterType, CivicError, Feedback, HealthStatus, Message, PluginAdapter, StorageAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed conversation store.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, CivicError> {
        self.db.get().ok_or_else(|| CivicError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CivicError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CivicError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CivicError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CivicError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CivicError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Conversations ---

    async fn create_conversation(
        &self,
        session_id: &str,
        user_agent: &str,
        ip_address: &str,
        user_id: Option<&str>,
    ) -> Result<String, CivicError> {
        queries::conversations::create_conversation(
            self.db()?,
            session_id,
            user_agent,
            ip_address,
            user_id,
        )
        .await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, CivicError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn find_active_conversation(
        &self,
        session_id: &str,
    ) -> Result<Option<Conversation>, CivicError> {
        queries::conversations::find_active_conversation(self.db()?, session_id).await
    }

    async fn complete_conversation(
        &self,
        id: &str,
        status: ConversationStatus,
    ) -> Result<(), CivicError> {
        queries::conversations::complete_conversation(self.db()?, id, status).await
    }

    // --- Messages ---

    async fn store_message(
        &self,
        conversation_id: &str,
        message: &Message,
    ) -> Result<(), CivicError> {
        queries::messages::store_message(self.db()?, conversation_id, message).await
    }

    async fn load_history(&self, conversation_id: &str) -> Result<Vec<Message>, CivicError> {
        queries::messages::load_history(self.db()?, conversation_id).await
    }

    // --- Feedback ---

    async fn store_feedback(
        &self,
        conversation_id: &str,
        message_id: &str,
        feedback: &Feedback,
    ) -> Result<(), CivicError> {
        queries::feedback::store_feedback(self.db()?, conversation_id, message_id, feedback).await
    }

    // --- Admin ---

    async fn recent_conversations(
        &self,
        limit: i64,
    ) -> Result<Vec<RecentConversation>, CivicError> {
        queries::conversations::recent_conversations(self.db()?, limit).await
    }

    async fn conversation_details(
        &self,
        id: &str,
    ) -> Result<Option<ConversationDetails>, CivicError> {
        let db = self.db()?;
        let Some(conversation) = queries::conversations::get_conversation(db, id).await? else {
            return Ok(None);
        };
        let messages = queries::messages::load_history(db, id).await?;
        let feedback = queries::feedback::list_feedback(db, id).await?;
        Ok(Some(ConversationDetails {
            conversation,
            messages,
            feedback,
        }))
    }

    async fn admin_stats(&self) -> Result<AdminStats, CivicError> {
        queries::stats::admin_stats(self.db()?).await
    }

    // --- User dashboard ---

    async fn user_conversations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationSummary>, CivicError> {
        queries::dashboard::user_conversations(self.db()?, user_id, limit).await
    }

    async fn user_stats(&self, user_id: &str) -> Result<UserStats, CivicError> {
        queries::dashboard::user_stats(self.db()?, user_id).await
    }
}
