// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat workflow webhook.

use std::time::Duration;

use civic_core::CivicError;
use civic_core::types::ChatRequest;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::WebhookPayload;

/// Pause before retrying a transient failure.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// POSTs chat turns to the webhook and returns the raw reply.
///
/// Transient statuses (429, 500, 502, 503, 504) are retried up to
/// `max_retries` times.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl WebhookClient {
    pub fn new(url: String, timeout: Duration, max_retries: u32) -> Result<Self, CivicError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("civic-assistant/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CivicError::Backend {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            url,
            timeout,
            max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Overrides the pause between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one chat turn. A 2xx body that is not JSON comes back as a JSON
    /// string.
    pub async fn post(&self, request: ChatRequest) -> Result<Value, CivicError> {
        let payload = WebhookPayload::from(request);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying webhook request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = match self.client.post(&self.url).json(&payload).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(CivicError::Timeout {
                        duration: self.timeout,
                    });
                }
                Err(e) => {
                    return Err(CivicError::Backend {
                        message: format!("webhook request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
            };

            let status = response.status();
            debug!(status = %status, attempt, session_id = %payload.session_id, "webhook responded");

            if status.is_success() {
                let body = response.text().await.map_err(|e| CivicError::Backend {
                    message: format!("failed to read webhook body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return Ok(parse_body(body));
            }

            let body = response.text().await.unwrap_or_default();
            let error = CivicError::backend(format!("webhook returned {status}: {body}"));

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient webhook error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error
            .unwrap_or_else(|| CivicError::backend("webhook request failed after retries")))
    }
}

fn parse_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
