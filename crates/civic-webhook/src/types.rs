// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire format of the webhook request.

use civic_core::types::ChatRequest;
use serde::Serialize;

/// Body POSTed to the workflow webhook for one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub message: String,
    pub session_id: String,
    pub user_id: String,
    pub user_agent: Option<String>,
    pub timestamp: String,
    #[serde(rename = "clientIP")]
    pub client_ip: String,
    pub referer: Option<String>,
}

impl From<ChatRequest> for WebhookPayload {
    fn from(req: ChatRequest) -> Self {
        Self {
            message: req.message,
            session_id: req.session_id,
            user_id: req.user_id.unwrap_or_else(|| "anonymous".to_string()),
            user_agent: req.user_agent,
            timestamp: req.timestamp,
            client_ip: req.client_ip.unwrap_or_else(|| "unknown".to_string()),
            referer: req.referer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_identity() {
        let payload = WebhookPayload::from(ChatRequest {
            message: "hi".into(),
            session_id: "s1".into(),
            user_id: None,
            user_agent: None,
            timestamp: "2026-03-01T12:00:00.000Z".into(),
            client_ip: None,
            referer: None,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], "anonymous");
        assert_eq!(json["clientIP"], "unknown");
        assert_eq!(json["sessionId"], "s1");
        assert!(json["referer"].is_null());
    }
}
