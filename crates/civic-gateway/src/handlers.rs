// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the public widget API.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use civic_annotate::{RenderedBlock, annotate, reconstruct, render_message};
use civic_config::format_phone_number;
use civic_config::model::LinkConfig;
use civic_core::types::{ChatRequest, ConversationStatus};
use civic_core::{AnnotatedSpan, CivicError, Feedback, HealthStatus, Message};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps a storage failure onto an HTTP response.
pub(crate) fn storage_error_response(err: CivicError) -> Response {
    match err {
        CivicError::NotFound { entity, id } => {
            error_response(StatusCode::NOT_FOUND, format!("{entity} not found: {id}"))
        }
        CivicError::InvalidInput(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        other => {
            tracing::error!(error = %other, "storage request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Client address as reported by the fronting proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string)
}

// --- Health ---

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
    pub backend: String,
}

fn health_label(status: &Result<HealthStatus, CivicError>) -> String {
    match status {
        Ok(HealthStatus::Healthy) => "healthy".to_string(),
        Ok(HealthStatus::Degraded(reason)) => format!("degraded: {reason}"),
        Ok(HealthStatus::Unhealthy(reason)) => format!("unhealthy: {reason}"),
        Err(e) => format!("unhealthy: {e}"),
    }
}

/// GET /health
///
/// Unauthenticated. Returns 503 when storage is not healthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let storage = state.storage.health_check().await;
    let backend = state.backend.health_check().await;
    let storage_ok = matches!(storage, Ok(HealthStatus::Healthy));

    let body = HealthResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        storage: health_label(&storage),
        backend: health_label(&backend),
    };
    let code = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body)).into_response()
}

// --- Widget ---

/// City contact block shown in the widget header.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityInfo {
    pub name: String,
    pub phone: String,
    pub phone_href: String,
    pub address: String,
    pub website: String,
    pub email: String,
}

/// Response body for GET /api/widget.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetResponse {
    pub assistant_name: String,
    pub welcome_message: String,
    pub max_message_length: usize,
    pub quick_prompts: Vec<String>,
    pub quick_actions: Vec<LinkConfig>,
    pub popular_topics: Vec<LinkConfig>,
    pub city: CityInfo,
}

/// GET /api/widget
pub async fn get_widget(State(state): State<GatewayState>) -> Json<WidgetResponse> {
    let config = &state.config;
    let digits: String = config.city.phone.chars().filter(char::is_ascii_digit).collect();
    let phone_href = match digits.len() {
        10 => format!("tel:+1{digits}"),
        _ => format!("tel:+{digits}"),
    };

    Json(WidgetResponse {
        assistant_name: config.assistant.name.clone(),
        welcome_message: config.assistant.welcome_message.clone(),
        max_message_length: config.assistant.max_message_length,
        quick_prompts: config.quick_prompts.clone(),
        quick_actions: config.quick_actions.clone(),
        popular_topics: config.popular_topics.clone(),
        city: CityInfo {
            name: config.city.name.clone(),
            phone: format_phone_number(&config.city.phone),
            phone_href,
            address: config.city.address.clone(),
            website: config.city.website.clone(),
            email: config.city.email.clone(),
        },
    })
}

// --- Chat ---

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    /// `None` when the turn could not be persisted.
    pub conversation_id: Option<String>,
    pub message: Message,
    pub blocks: Vec<RenderedBlock>,
    /// Set to the session-expired text when an idle conversation was closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

fn is_expired(updated_at: &str, timeout_mins: u64, now: DateTime<Utc>) -> bool {
    let Ok(updated) = DateTime::parse_from_rfc3339(updated_at) else {
        return false;
    };
    let idle = now.signed_duration_since(updated.with_timezone(&Utc));
    idle.num_seconds() >= 0 && idle.num_seconds() as u64 >= timeout_mins * 60
}

/// Finds the session's active conversation, or opens a new one.
///
/// An active conversation idle for longer than the session timeout is closed
/// first; the returned flag reports that. Storage failures are logged and
/// yield no id.
async fn ensure_conversation(
    state: &GatewayState,
    session_id: &str,
    user_agent: &str,
    ip_address: &str,
    user_id: Option<&str>,
) -> (Option<String>, bool) {
    let storage = &state.storage;
    let mut expired = false;
    match storage.find_active_conversation(session_id).await {
        Ok(Some(conv)) => {
            let timeout = state.config.assistant.session_timeout_mins;
            if !is_expired(&conv.updated_at, timeout, Utc::now()) {
                return (Some(conv.id), false);
            }
            expired = true;
            tracing::info!(conversation_id = %conv.id, "session expired, starting new conversation");
            if let Err(e) = storage
                .complete_conversation(&conv.id, ConversationStatus::Completed)
                .await
            {
                tracing::warn!(error = %e, "failed to close expired conversation");
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "failed to look up active conversation");
            return (None, false);
        }
    }

    match storage
        .create_conversation(session_id, user_agent, ip_address, user_id)
        .await
    {
        Ok(id) => (Some(id), expired),
        Err(e) => {
            tracing::warn!(error = %e, "failed to create conversation");
            (None, expired)
        }
    }
}

async fn persist(state: &GatewayState, conversation_id: Option<&str>, message: &Message) {
    let Some(id) = conversation_id else {
        return;
    };
    if let Err(e) = state.storage.store_message(id, message).await {
        tracing::warn!(error = %e, conversation_id = id, "failed to store message");
    }
}

/// POST /api/chat
///
/// Sends one user turn to the backend and returns the normalized reply with
/// its rendered blocks.
pub async fn post_chat(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Response {
    let config = &state.config;
    let text = body.message.trim();
    if text.is_empty() || text.chars().count() > config.assistant.max_message_length {
        return error_response(StatusCode::BAD_REQUEST, config.errors.invalid_input.clone());
    }

    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if !state.rate_limiter.check(&session_id) {
        tracing::debug!(session_id = %session_id, "chat request rate limited");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            config.errors.rate_limit_exceeded.clone(),
        );
    }

    let user_agent = body
        .user_agent
        .or_else(|| header_str(&headers, "user-agent").map(str::to_string));
    let ip = client_ip(&headers);
    let (conversation_id, expired) = ensure_conversation(
        &state,
        &session_id,
        user_agent.as_deref().unwrap_or("unknown"),
        ip.as_deref().unwrap_or("unknown"),
        body.user_id.as_deref(),
    )
    .await;

    // Stored messages are always stamped here; the client's clock is only
    // forwarded to the backend, and only when it parses.
    let received = now_timestamp();
    let timestamp = body
        .timestamp
        .filter(|ts| DateTime::parse_from_rfc3339(ts).is_ok())
        .unwrap_or_else(|| received.clone());
    let user_message = Message::user(uuid::Uuid::new_v4().to_string(), text, received);
    persist(&state, conversation_id.as_deref(), &user_message).await;

    let request = ChatRequest {
        message: text.to_string(),
        session_id: session_id.clone(),
        user_id: body.user_id,
        user_agent,
        timestamp,
        client_ip: ip,
        referer: header_str(&headers, "referer").map(str::to_string),
    };

    let reply = match state.backend.send(request).await {
        Ok(raw) => state.normalizer.normalize(&raw, Utc::now()),
        Err(e) => {
            tracing::warn!(error = %e, session_id = %session_id, "chat backend failed");
            if let Some(id) = conversation_id.as_deref() {
                if let Err(e) = state
                    .storage
                    .complete_conversation(id, ConversationStatus::Error)
                    .await
                {
                    tracing::warn!(error = %e, "failed to mark conversation as errored");
                }
            }
            state.normalizer.fallback_message(Utc::now())
        }
    };
    persist(&state, conversation_id.as_deref(), &reply).await;

    let blocks = render_message(&reply);
    Json(ChatResponse {
        session_id,
        conversation_id,
        message: reply,
        blocks,
        notice: expired.then(|| config.errors.session_expired.clone()),
    })
    .into_response()
}

// --- Feedback ---

/// Request body for POST /api/feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
    pub conversation_id: String,
    pub message_id: String,
    pub positive: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /api/feedback
pub async fn post_feedback(
    State(state): State<GatewayState>,
    Json(body): Json<FeedbackBody>,
) -> Response {
    let feedback = Feedback {
        positive: body.positive,
        comment: body
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };
    match state
        .storage
        .store_feedback(&body.conversation_id, &body.message_id, &feedback)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error_response(e),
    }
}

// --- Conversations ---

/// A stored message with its rendering.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessage {
    #[serde(flatten)]
    pub message: Message,
    pub blocks: Vec<RenderedBlock>,
}

/// Response body for GET /api/conversations/{id}/messages.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub status: ConversationStatus,
    pub messages: Vec<RenderedMessage>,
}

/// GET /api/conversations/{id}/messages
pub async fn get_conversation_messages(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let conversation = match state.storage.get_conversation(&id).await {
        Ok(Some(c)) => c,
        Ok(None) => return storage_error_response(CivicError::not_found("conversation", id)),
        Err(e) => return storage_error_response(e),
    };
    let messages = match state.storage.load_history(&id).await {
        Ok(m) => m,
        Err(e) => return storage_error_response(e),
    };

    Json(HistoryResponse {
        conversation_id: conversation.id,
        status: conversation.status,
        messages: messages
            .into_iter()
            .map(|message| RenderedMessage {
                blocks: render_message(&message),
                message,
            })
            .collect(),
    })
    .into_response()
}

/// POST /api/conversations/{id}/complete
pub async fn post_complete_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .storage
        .complete_conversation(&id, ConversationStatus::Completed)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_error_response(e),
    }
}

// --- Annotate ---

/// Request body for POST /api/annotate.
#[derive(Debug, Deserialize)]
pub struct AnnotateBody {
    pub text: String,
}

/// Response body for POST /api/annotate.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotateResponse {
    pub spans: Vec<AnnotatedSpan>,
    /// Concatenated span text.
    pub text: String,
}

/// POST /api/annotate
pub async fn post_annotate(Json(body): Json<AnnotateBody>) -> Json<AnnotateResponse> {
    let spans = annotate(&body.text);
    let text = reconstruct(&spans);
    Json(AnnotateResponse { spans, text })
}
