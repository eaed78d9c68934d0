// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat backend for deterministic testing.
//!
//! `MockBackend` implements `ChatBackend` with pre-configured replies and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use civic_core::traits::adapter::PluginAdapter;
use civic_core::traits::backend::ChatBackend;
use civic_core::types::{AdapterType, ChatRequest, HealthStatus};
use civic_core::CivicError;

/// One scripted outcome.
#[derive(Debug, Clone)]
enum MockReply {
    Json(Value),
    Fail(String),
    Timeout,
}

/// A mock chat backend that replays pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// `{"bot_response": "mock response"}` is returned.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend pre-loaded with the given JSON replies.
    pub fn with_replies(replies: Vec<Value>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(MockReply::Json).collect())),
            requests: Arc::default(),
        }
    }

    /// Queue a successful reply.
    pub async fn push_reply(&self, reply: Value) {
        self.replies.lock().await.push_back(MockReply::Json(reply));
    }

    /// Queue a backend failure.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Fail(message.into()));
    }

    /// Queue a timeout.
    pub async fn push_timeout(&self) {
        self.replies.lock().await.push_back(MockReply::Timeout);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, CivicError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CivicError> {
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send(&self, request: ChatRequest) -> Result<Value, CivicError> {
        self.requests.lock().await.push(request);
        let next = self.replies.lock().await.pop_front();
        match next {
            Some(MockReply::Json(value)) => Ok(value),
            Some(MockReply::Fail(message)) => Err(CivicError::backend(message)),
            Some(MockReply::Timeout) => Err(CivicError::Timeout {
                duration: Duration::from_secs(30),
            }),
            None => Ok(json!({"bot_response": "mock response"})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            message: text.into(),
            session_id: "s".into(),
            user_id: None,
            user_agent: None,
            timestamp: "2026-03-01T12:00:00.000Z".into(),
            client_ip: None,
            referer: None,
        }
    }

    #[tokio::test]
    async fn replays_in_order_then_default() {
        let backend = MockBackend::with_replies(vec![json!({"output": "one"})]);
        backend.push_failure("down").await;

        assert_eq!(backend.send(request("a")).await.unwrap()["output"], "one");
        assert!(backend.send(request("b")).await.is_err());
        assert_eq!(
            backend.send(request("c")).await.unwrap()["bot_response"],
            "mock response"
        );

        let seen: Vec<_> = backend.requests().await.into_iter().map(|r| r.message).collect();
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn timeout_reply_maps_to_timeout_error() {
        let backend = MockBackend::new();
        backend.push_timeout().await;
        let err = backend.send(request("a")).await.unwrap_err();
        assert!(matches!(err, CivicError::Timeout { .. }));
    }
}
