// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin portal handlers. Mounted behind the bearer-token middleware.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use civic_core::CivicError;
use civic_core::types::RecentConversation;

use crate::handlers::storage_error_response;
use crate::server::GatewayState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

/// GET /admin/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Response {
    match state.storage.admin_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => storage_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Response body for GET /admin/conversations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<RecentConversation>,
}

/// GET /admin/conversations?limit=N
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Response {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    match state.storage.recent_conversations(limit).await {
        Ok(conversations) => Json(ConversationListResponse { conversations }).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /admin/conversations/{id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state.storage.conversation_details(&id).await {
        Ok(Some(details)) => Json(details).into_response(),
        Ok(None) => storage_error_response(CivicError::not_found("conversation", id)),
        Err(e) => storage_error_response(e),
    }
}
