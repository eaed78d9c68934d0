// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback on bot messages. One row per message; later writes replace it.

use civic_core::types::StoredFeedback;
use civic_core::{CivicError, Feedback};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::now;

/// Records feedback for a message belonging to `conversation_id`.
pub async fn store_feedback(
    db: &Database,
    conversation_id: &str,
    message_id: &str,
    feedback: &Feedback,
) -> Result<(), CivicError> {
    let conv_id = conversation_id.to_string();
    let msg_id = message_id.to_string();
    let positive = feedback.positive;
    let comment = feedback.comment.clone();
    let ts = now();

    let found = db
        .connection()
        .call(move |conn| {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM messages WHERE id = ?1 AND conversation_id = ?2",
                    params![msg_id, conv_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO feedback (message_id, conversation_id, positive, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(message_id) DO UPDATE SET
                     positive = excluded.positive,
                     comment = excluded.comment,
                     created_at = excluded.created_at",
                params![msg_id, conv_id, positive, comment, ts],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if !found {
        return Err(CivicError::not_found("message", message_id));
    }
    tracing::info!(conversation_id, message_id, positive, "feedback recorded");
    Ok(())
}

/// All feedback rows of a conversation, oldest first.
pub async fn list_feedback(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<StoredFeedback>, CivicError> {
    let conv_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id, conversation_id, positive, comment, created_at
                 FROM feedback WHERE conversation_id = ?1
                 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![conv_id], |row| {
                Ok(StoredFeedback {
                    message_id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    positive: row.get(2)?,
                    comment: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
