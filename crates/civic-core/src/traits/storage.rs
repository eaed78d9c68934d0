// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for conversation persistence.

use async_trait::async_trait;

use crate::error::CivicError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AdminStats, Conversation, ConversationDetails, ConversationStatus, ConversationSummary,
    Feedback, Message, RecentConversation, UserStats,
};

/// Adapter for conversation, message, and feedback persistence.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CivicError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CivicError>;

    // --- Conversations ---

    /// Creates a conversation and returns its id.
    async fn create_conversation(
        &self,
        session_id: &str,
        user_agent: &str,
        ip_address: &str,
        user_id: Option<&str>,
    ) -> Result<String, CivicError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, CivicError>;

    /// Returns the newest active conversation for a widget session, if any.
    async fn find_active_conversation(
        &self,
        session_id: &str,
    ) -> Result<Option<Conversation>, CivicError>;

    /// Marks a conversation as finished with the given status.
    async fn complete_conversation(
        &self,
        id: &str,
        status: ConversationStatus,
    ) -> Result<(), CivicError>;

    // --- Messages ---

    /// Stores a message and refreshes the conversation's message count.
    async fn store_message(&self, conversation_id: &str, message: &Message)
        -> Result<(), CivicError>;

    /// Loads a conversation's messages in display order, with feedback attached.
    async fn load_history(&self, conversation_id: &str) -> Result<Vec<Message>, CivicError>;

    // --- Feedback ---

    /// Records feedback for a message. A later write replaces an earlier one.
    async fn store_feedback(
        &self,
        conversation_id: &str,
        message_id: &str,
        feedback: &Feedback,
    ) -> Result<(), CivicError>;

    // --- Admin ---

    async fn recent_conversations(&self, limit: i64)
        -> Result<Vec<RecentConversation>, CivicError>;

    async fn conversation_details(
        &self,
        id: &str,
    ) -> Result<Option<ConversationDetails>, CivicError>;

    async fn admin_stats(&self) -> Result<AdminStats, CivicError>;

    // --- User dashboard ---

    /// Newest conversations owned by `user_id`, at most `limit`.
    async fn user_conversations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationSummary>, CivicError>;

    async fn user_stats(&self, user_id: &str) -> Result<UserStats, CivicError>;
}
