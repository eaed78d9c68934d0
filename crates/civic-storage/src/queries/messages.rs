// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence.

use civic_core::{CivicError, ContentSegment, Feedback, Message};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::now;

/// Inserts a message and bumps the conversation's message count.
///
/// Messages are returned in insertion order, so the timestamp is only
/// descriptive. It must still be RFC 3339.
pub async fn store_message(
    db: &Database,
    conversation_id: &str,
    message: &Message,
) -> Result<(), CivicError> {
    if chrono::DateTime::parse_from_rfc3339(&message.timestamp).is_err() {
        return Err(CivicError::InvalidInput(format!(
            "message timestamp `{}` is not RFC 3339",
            message.timestamp
        )));
    }
    let segments = if message.segments.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&message.segments).map_err(|e| CivicError::Storage {
            source: Box::new(e),
        })?)
    };
    let conv_id = conversation_id.to_string();
    let msg = message.clone();
    let ts = now();

    let found = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM conversations WHERE id = ?1",
                    params![conv_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO messages (id, conversation_id, is_user, content, structured, segments, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    msg.id,
                    conv_id,
                    msg.is_user,
                    msg.content,
                    msg.structured,
                    segments,
                    msg.timestamp,
                ],
            )?;
            tx.execute(
                "UPDATE conversations SET message_count = message_count + 1, updated_at = ?1
                 WHERE id = ?2",
                params![ts, conv_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if !found {
        return Err(CivicError::not_found("conversation", conversation_id));
    }
    tracing::debug!(
        conversation_id,
        message_id = %message.id,
        is_user = message.is_user,
        "message stored"
    );
    Ok(())
}

/// A conversation's messages in insertion order, with any feedback attached.
pub async fn load_history(db: &Database, conversation_id: &str) -> Result<Vec<Message>, CivicError> {
    let conv_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.is_user, m.content, m.structured, m.segments, m.timestamp,
                        f.positive, f.comment
                 FROM messages m
                 LEFT JOIN feedback f ON f.message_id = m.id
                 WHERE m.conversation_id = ?1
                 ORDER BY m.rowid ASC",
            )?;
            let rows = stmt.query_map(params![conv_id], |row| {
                let segments_json: Option<String> = row.get(4)?;
                let segments: Vec<ContentSegment> = match segments_json {
                    Some(json) => serde_json::from_str(&json).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    None => Vec::new(),
                };
                let positive: Option<bool> = row.get(6)?;
                let comment: Option<String> = row.get(7)?;
                Ok(Message {
                    id: row.get(0)?,
                    is_user: row.get(1)?,
                    content: row.get(2)?,
                    structured: row.get::<_, bool>(3)? && !segments.is_empty(),
                    segments,
                    timestamp: row.get(5)?,
                    feedback: positive.map(|positive| Feedback { positive, comment }),
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
