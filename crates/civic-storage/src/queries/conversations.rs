// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use std::str::FromStr;

use civic_core::CivicError;
use civic_core::types::{Conversation, ConversationStatus, RecentConversation};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};
use crate::queries::now;

/// Preview text for a conversation without any user message.
pub const NO_MESSAGES: &str = "No messages";

const CONVERSATION_COLUMNS: &str = "id, session_id, user_id, user_agent, ip_address, status, \
     message_count, start_time, end_time, updated_at";

pub(crate) fn parse_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<ConversationStatus> {
    let raw: String = row.get(idx)?;
    ConversationStatus::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_id: row.get(2)?,
        user_agent: row.get(3)?,
        ip_address: row.get(4)?,
        status: parse_status(row, 5)?,
        message_count: row.get(6)?,
        start_time: row.get(7)?,
        end_time: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Creates an active conversation and returns its generated id.
pub async fn create_conversation(
    db: &Database,
    session_id: &str,
    user_agent: &str,
    ip_address: &str,
    user_id: Option<&str>,
) -> Result<String, CivicError> {
    let id = uuid::Uuid::new_v4().to_string();
    let session_id = session_id.to_string();
    let user_agent = user_agent.to_string();
    let ip_address = ip_address.to_string();
    let user_id = user_id.map(str::to_string);
    let ts = now();

    let row_id = id.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations
                     (id, session_id, user_id, user_agent, ip_address, status, message_count, start_time, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'active', 0, ?6, ?6)",
                params![row_id, session_id, user_id, user_agent, ip_address, ts],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(id)
}

/// Fetches one conversation.
pub async fn get_conversation(db: &Database, id: &str) -> Result<Option<Conversation>, CivicError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1");
            match conn.query_row(&sql, params![id], conversation_from_row) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Newest active conversation of a widget session.
pub async fn find_active_conversation(
    db: &Database,
    session_id: &str,
) -> Result<Option<Conversation>, CivicError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE session_id = ?1 AND status = 'active'
                 ORDER BY start_time DESC LIMIT 1"
            );
            match conn.query_row(&sql, params![session_id], conversation_from_row) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Sets the final status and end time of a conversation.
///
/// Completing with [`ConversationStatus::Active`] reopens it and clears the
/// end time.
pub async fn complete_conversation(
    db: &Database,
    id: &str,
    status: ConversationStatus,
) -> Result<(), CivicError> {
    let id_owned = id.to_string();
    let ts = now();
    let end_time = (status != ConversationStatus::Active).then(|| ts.clone());
    let status = status.to_string();

    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET status = ?1, end_time = ?2, updated_at = ?3 WHERE id = ?4",
                params![status, end_time, ts, id_owned],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 0 {
        return Err(CivicError::not_found("conversation", id));
    }
    Ok(())
}

/// Newest conversations first, each with its latest user message as preview.
pub async fn recent_conversations(
    db: &Database,
    limit: i64,
) -> Result<Vec<RecentConversation>, CivicError> {
    let limit = limit.max(0);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.session_id, c.start_time,
                        (SELECT m.content FROM messages m
                          WHERE m.conversation_id = c.id AND m.is_user = 1
                          ORDER BY m.rowid DESC LIMIT 1),
                        c.message_count, c.status, c.user_agent
                 FROM conversations c
                 ORDER BY c.start_time DESC, c.rowid DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let last: Option<String> = row.get(3)?;
                Ok(RecentConversation {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    start_time: row.get(2)?,
                    last_message: last.unwrap_or_else(|| NO_MESSAGES.to_string()),
                    message_count: row.get(4)?,
                    status: parse_status(row, 5)?,
                    user_agent: row.get(6)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_db;

    #[tokio::test]
    async fn create_and_get() {
        let (db, _dir) = test_db().await;
        let id = create_conversation(&db, "sess-1", "Firefox", "10.0.0.1", None)
            .await
            .unwrap();
        let conv = get_conversation(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.session_id, "sess-1");
        assert_eq!(conv.user_agent, "Firefox");
        assert_eq!(conv.status, ConversationStatus::Active);
        assert_eq!(conv.message_count, 0);
        assert!(conv.end_time.is_none());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (db, _dir) = test_db().await;
        assert!(get_conversation(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_active_ignores_completed() {
        let (db, _dir) = test_db().await;
        let id = create_conversation(&db, "sess-1", "", "", Some("user-1"))
            .await
            .unwrap();
        assert_eq!(
            find_active_conversation(&db, "sess-1").await.unwrap().map(|c| c.id),
            Some(id.clone())
        );

        complete_conversation(&db, &id, ConversationStatus::Completed)
            .await
            .unwrap();
        assert!(find_active_conversation(&db, "sess-1").await.unwrap().is_none());

        let conv = get_conversation(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.status, ConversationStatus::Completed);
        assert!(conv.end_time.is_some());
        assert_eq!(conv.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn complete_missing_is_not_found() {
        let (db, _dir) = test_db().await;
        let err = complete_conversation(&db, "nope", ConversationStatus::Error)
            .await
            .unwrap_err();
        assert!(matches!(err, CivicError::NotFound { .. }));
    }

    #[tokio::test]
    async fn recent_without_messages_has_placeholder() {
        let (db, _dir) = test_db().await;
        create_conversation(&db, "a", "", "", None).await.unwrap();
        create_conversation(&db, "b", "", "", None).await.unwrap();
        let recent = recent_conversations(&db, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].session_id, "b");
        assert_eq!(recent[0].last_message, NO_MESSAGES);
    }
}
