// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user views for the resident dashboard.

use civic_core::CivicError;
use civic_core::types::{ConversationSummary, UserStats};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::conversations::{NO_MESSAGES, parse_status};
use crate::queries::stats::{TimedMessage, average_response_time, percentage};

/// Topic for conversations without a user message or a recognised keyword.
pub const GENERAL_INQUIRY: &str = "General Inquiry";

/// Keyword groups mapped to topics, first match wins.
const TOPICS: &[(&[&str], &str)] = &[
    (&["permit", "building"], "Building Permits"),
    (&["trash", "recycling"], "Waste Management"),
    (&["water", "bill"], "Utilities"),
    (&["council", "meeting"], "City Council"),
    (&["park", "recreation"], "Parks & Recreation"),
    (&["report", "concern"], "Report Issue"),
];

/// Guesses a conversation topic from a resident's question.
pub fn topic_for(question: &str) -> &'static str {
    let lower = question.to_lowercase();
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(GENERAL_INQUIRY, |(_, topic)| *topic)
}

/// A user's conversations, newest first.
pub async fn user_conversations(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ConversationSummary>, CivicError> {
    let user_id = user_id.to_string();
    let limit = limit.max(0);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.session_id, c.start_time, c.message_count, c.status,
                        (SELECT m.content FROM messages m
                          WHERE m.conversation_id = c.id
                          ORDER BY m.rowid DESC LIMIT 1),
                        (SELECT m.content FROM messages m
                          WHERE m.conversation_id = c.id AND m.is_user = 1
                          ORDER BY m.rowid ASC LIMIT 1),
                        (SELECT COALESCE(SUM(f.positive), 0) FROM feedback f
                          WHERE f.conversation_id = c.id),
                        (SELECT COUNT(*) FROM feedback f WHERE f.conversation_id = c.id)
                 FROM conversations c
                 WHERE c.user_id = ?1
                 ORDER BY c.start_time DESC, c.rowid DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                let last: Option<String> = row.get(5)?;
                let first_question: Option<String> = row.get(6)?;
                let positive: i64 = row.get(7)?;
                let rated: i64 = row.get(8)?;
                Ok(ConversationSummary {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    start_time: row.get(2)?,
                    message_count: row.get(3)?,
                    status: parse_status(row, 4)?,
                    last_message: last.unwrap_or_else(|| NO_MESSAGES.to_string()),
                    topic: first_question
                        .as_deref()
                        .map_or(GENERAL_INQUIRY, topic_for)
                        .to_string(),
                    satisfaction: (rated > 0).then(|| percentage(positive, rated)),
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Totals over every conversation owned by `user_id`.
pub async fn user_stats(db: &Database, user_id: &str) -> Result<UserStats, CivicError> {
    let user_id = user_id.to_string();
    let (total, active, positive, rated, timed) = db
        .connection()
        .call(move |conn| {
            let (total, active): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(status = 'active'), 0)
                 FROM conversations WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let (positive, rated): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(f.positive), 0), COUNT(*)
                 FROM feedback f JOIN conversations c ON c.id = f.conversation_id
                 WHERE c.user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let mut stmt = conn.prepare(
                "SELECT m.conversation_id, m.is_user, m.timestamp
                 FROM messages m JOIN conversations c ON c.id = m.conversation_id
                 WHERE c.user_id = ?1
                 ORDER BY m.conversation_id, m.rowid",
            )?;
            let timed = stmt
                .query_map(params![user_id], |row| {
                    Ok(TimedMessage {
                        conversation_id: row.get(0)?,
                        is_user: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((total, active, positive, rated, timed))
        })
        .await
        .map_err(map_tr_err)?;

    tracing::debug!(total, rated, "computed user stats");
    Ok(UserStats {
        total_conversations: total,
        active_conversations: active,
        total_messages: timed.len() as i64,
        average_response_time: average_response_time(&timed),
        satisfaction_rate: percentage(positive, rated),
    })
}
