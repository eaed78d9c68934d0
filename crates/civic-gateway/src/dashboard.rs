// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resident dashboard handlers, keyed by the `userId` the widget sends with
//! each chat turn.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use civic_core::types::{ConversationSummary, UserStats};

use crate::handlers::{error_response, storage_error_response};
use crate::server::GatewayState;

const DEFAULT_RECENT_LIMIT: i64 = 10;
const MAX_RECENT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<i64>,
}

impl RecentParams {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

/// Response body for GET /api/users/{user_id}/dashboard.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub recent_conversations: Vec<ConversationSummary>,
    pub stats: UserStats,
}

fn blank_user(user_id: &str) -> Option<Response> {
    user_id
        .trim()
        .is_empty()
        .then(|| error_response(StatusCode::BAD_REQUEST, "user id must not be blank"))
}

/// GET /api/users/{user_id}/conversations?limit=N
pub async fn get_user_conversations(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecentParams>,
) -> Response {
    if let Some(rejected) = blank_user(&user_id) {
        return rejected;
    }
    match state
        .storage
        .user_conversations(&user_id, params.limit())
        .await
    {
        Ok(conversations) => Json(UserConversationsResponse { conversations }).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/users/{user_id}/stats
pub async fn get_user_stats(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Some(rejected) = blank_user(&user_id) {
        return rejected;
    }
    match state.storage.user_stats(&user_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/users/{user_id}/dashboard?limit=N
pub async fn get_dashboard(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecentParams>,
) -> Response {
    if let Some(rejected) = blank_user(&user_id) {
        return rejected;
    }
    let storage = &state.storage;
    let joined = tokio::try_join!(
        storage.user_conversations(&user_id, params.limit()),
        storage.user_stats(&user_id),
    );
    match joined {
        Ok((recent_conversations, stats)) => Json(DashboardResponse {
            recent_conversations,
            stats,
        })
        .into_response(),
        Err(e) => storage_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(RecentParams { limit: None }.limit(), DEFAULT_RECENT_LIMIT);
        assert_eq!(RecentParams { limit: Some(0) }.limit(), 1);
        assert_eq!(RecentParams { limit: Some(500) }.limit(), MAX_RECENT_LIMIT);
    }
}
