// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregates for the admin dashboard.

use chrono::DateTime;
use civic_core::CivicError;
use civic_core::types::AdminStats;

use crate::database::{Database, map_tr_err};

/// Replies slower than this are treated as outliers and ignored.
pub const MAX_RESPONSE_SECS: f64 = 30.0;

/// A message reduced to what the response-time calculation needs.
#[derive(Debug, Clone)]
pub struct TimedMessage {
    pub conversation_id: String,
    pub is_user: bool,
    pub timestamp: String,
}

/// Computes dashboard statistics over the whole store.
pub async fn admin_stats(db: &Database) -> Result<AdminStats, CivicError> {
    let (total, active, errored, positive, feedback_total, timed) = db
        .connection()
        .call(|conn| {
            let (total, active, errored): (i64, i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'active'), 0),
                        COALESCE(SUM(status = 'error'), 0)
                 FROM conversations",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            let (positive, feedback_total): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(positive), 0), COUNT(*) FROM feedback",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let mut stmt = conn.prepare(
                "SELECT conversation_id, is_user, timestamp FROM messages
                 ORDER BY conversation_id, rowid",
            )?;
            let timed = stmt
                .query_map([], |row| {
                    Ok(TimedMessage {
                        conversation_id: row.get(0)?,
                        is_user: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((total, active, errored, positive, feedback_total, timed))
        })
        .await
        .map_err(map_tr_err)?;

    Ok(AdminStats {
        total_conversations: total,
        active_sessions: active,
        total_messages: timed.len() as i64,
        average_response_time: average_response_time(&timed),
        satisfaction_rate: percentage(positive, feedback_total),
        error_rate: percentage(errored, total),
    })
}

/// Mean seconds between a user message and the bot message right after it.
///
/// `messages` must be grouped by conversation and in insertion order. Pairs with
/// unparseable timestamps or a gap outside `(0, 30)` seconds are skipped.
pub fn average_response_time(messages: &[TimedMessage]) -> f64 {
    let gaps: Vec<f64> = messages
        .windows(2)
        .filter(|w| w[0].conversation_id == w[1].conversation_id && w[0].is_user && !w[1].is_user)
        .filter_map(|w| {
            let asked = DateTime::parse_from_rfc3339(&w[0].timestamp).ok()?;
            let answered = DateTime::parse_from_rfc3339(&w[1].timestamp).ok()?;
            let secs = (answered - asked).num_milliseconds() as f64 / 1000.0;
            (secs > 0.0 && secs < MAX_RESPONSE_SECS).then_some(secs)
        })
        .collect();

    if gaps.is_empty() {
        return 0.0;
    }
    round1(gaps.iter().sum::<f64>() / gaps.len() as f64)
}

pub(crate) fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::{complete_conversation, create_conversation};
    use crate::queries::feedback::store_feedback;
    use crate::queries::messages::store_message;
    use crate::queries::test_db;
    use civic_core::types::ConversationStatus;
    use civic_core::{Feedback, Message};

    fn timed(conv: &str, is_user: bool, ts: &str) -> TimedMessage {
        TimedMessage {
            conversation_id: conv.into(),
            is_user,
            timestamp: ts.into(),
        }
    }

    #[test]
    fn response_time_pairs_user_then_bot() {
        let messages = vec![
            timed("a", true, "2026-03-01T12:00:00.000Z"),
            timed("a", false, "2026-03-01T12:00:02.000Z"),
            timed("a", true, "2026-03-01T12:01:00.000Z"),
            timed("a", false, "2026-03-01T12:01:03.500Z"),
            // Too slow.
            timed("a", true, "2026-03-01T12:05:00.000Z"),
            timed("a", false, "2026-03-01T12:06:00.000Z"),
            // Crosses a conversation boundary.
            timed("b", false, "2026-03-01T12:06:01.000Z"),
        ];
        assert_eq!(average_response_time(&messages), 2.8);
    }

    #[test]
    fn empty_store_has_zero_stats() {
        assert_eq!(average_response_time(&[]), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
    }

    #[tokio::test]
    async fn aggregates_over_store() {
        let (db, _dir) = test_db().await;
        let a = create_conversation(&db, "s1", "", "", None).await.unwrap();
        let b = create_conversation(&db, "s2", "", "", None).await.unwrap();
        create_conversation(&db, "s3", "", "", None).await.unwrap();
        complete_conversation(&db, &b, ConversationStatus::Error)
            .await
            .unwrap();

        store_message(&db, &a, &Message::user("u1", "hi", "2026-03-01T12:00:00.000Z"))
            .await
            .unwrap();
        store_message(&db, &a, &Message::bot_text("b1", "hello", "2026-03-01T12:00:04.000Z"))
            .await
            .unwrap();
        store_message(&db, &a, &Message::bot_text("b2", "more", "2026-03-01T12:00:05.000Z"))
            .await
            .unwrap();
        store_feedback(&db, &a, "b1", &Feedback { positive: true, comment: None })
            .await
            .unwrap();
        store_feedback(&db, &a, "b2", &Feedback { positive: false, comment: None })
            .await
            .unwrap();

        let stats = admin_stats(&db).await.unwrap();
        assert_eq!(stats.total_conversations, 3);
        assert_eq!(stats.active_sessions, 2);
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.average_response_time, 4.0);
        assert_eq!(stats.satisfaction_rate, 50.0);
        assert_eq!(stats.error_rate, 33.3);
    }
}
