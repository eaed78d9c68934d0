// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the annotator, the normalizer, storage, and the gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CivicError;

/// Identifier of a browser chat session (generated by the widget).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    /// Chat backend (the workflow webhook).
    Backend,
    /// Conversation persistence.
    Storage,
    /// HTTP surface serving the widget and the admin portal.
    Channel,
}

// --- Canonical message model ---

/// Visual tone of an alert block.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertKind {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

/// One typed block of a structured bot reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    PlainText {
        value: String,
    },
    Heading {
        value: String,
        level: u8,
    },
    ListItem {
        value: String,
    },
    Alert {
        value: String,
        kind: AlertKind,
    },
    FileRef {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    LocationRef {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    ImageRef {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Divider,
}

impl ContentSegment {
    /// Builds a heading, clamping the level into `1..=6`.
    pub fn heading(value: impl Into<String>, level: u8) -> Self {
        Self::Heading {
            value: value.into(),
            level: level.clamp(1, 6),
        }
    }

    /// Free text of this segment that must go through the annotator before display.
    ///
    /// `Divider`, `ImageRef` and a `FileRef` without a link carry none.
    pub fn annotatable_text(&self) -> Option<&str> {
        match self {
            Self::PlainText { value }
            | Self::Heading { value, .. }
            | Self::ListItem { value }
            | Self::Alert { value, .. } => Some(value),
            Self::FileRef { label, url: Some(_) } => Some(label),
            Self::LocationRef { label, .. } => Some(label),
            Self::FileRef { url: None, .. } | Self::ImageRef { .. } | Self::Divider => None,
        }
    }

    /// Human-readable text of the segment, used for transcripts and previews.
    pub fn plain_text(&self) -> Option<&str> {
        match self {
            Self::FileRef { label, .. } => Some(label),
            Self::ImageRef { caption, .. } => caption.as_deref(),
            other => other.annotatable_text(),
        }
    }
}

/// Thumbs-up/down feedback left on a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub positive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The canonical representation of one chat turn.
///
/// When `structured` is true, `segments` is non-empty and renderers ignore
/// `content`. Otherwise `content` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub is_user: bool,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub content: String,
    pub structured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<ContentSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Message {
    /// A message typed by the citizen.
    pub fn user(id: impl Into<String>, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_user: true,
            timestamp: timestamp.into(),
            content: content.into(),
            structured: false,
            segments: Vec::new(),
            feedback: None,
        }
    }

    /// A flat-text reply from the assistant.
    pub fn bot_text(id: impl Into<String>, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            is_user: false,
            ..Self::user(id, content, timestamp)
        }
    }

    /// A structured reply from the assistant.
    ///
    /// Falls back to an empty flat message when `segments` is empty so the
    /// structured invariant always holds.
    pub fn bot_structured(
        id: impl Into<String>,
        segments: Vec<ContentSegment>,
        timestamp: impl Into<String>,
    ) -> Self {
        let structured = !segments.is_empty();
        Self {
            id: id.into(),
            is_user: false,
            timestamp: timestamp.into(),
            content: String::new(),
            structured,
            segments,
            feedback: None,
        }
    }

    /// Attaches feedback. The first write wins.
    pub fn attach_feedback(&mut self, feedback: Feedback) -> Result<(), CivicError> {
        if self.feedback.is_some() {
            return Err(CivicError::InvalidInput(format!(
                "feedback already recorded for message {}",
                self.id
            )));
        }
        self.feedback = Some(feedback);
        Ok(())
    }

    /// Flattened text of the message regardless of its shape.
    pub fn transcript(&self) -> String {
        if !self.structured {
            return self.content.clone();
        }
        self.segments
            .iter()
            .filter_map(ContentSegment::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Classification of an [`AnnotatedSpan`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpanKind {
    Text,
    WebLink,
    TelLink,
}

/// One renderable piece of annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSpan {
    pub kind: SpanKind,
    /// Exact source text covered by this span.
    pub display: String,
    /// URL for web links, `+`-prefixed dialable number for tel links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Link label for web links (derived title). Equal to `display` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AnnotatedSpan {
    pub fn text(display: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Text,
            display: display.into(),
            target: None,
            tooltip: None,
            title: None,
        }
    }

    /// The `href` a renderer should emit, if any.
    pub fn href(&self) -> Option<String> {
        match (self.kind, &self.target) {
            (SpanKind::WebLink, Some(url)) => Some(url.clone()),
            (SpanKind::TelLink, Some(number)) => Some(format!("tel:{number}")),
            _ => None,
        }
    }

    /// The text a renderer should show for this span.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.display)
    }
}

// --- Chat backend ---

/// Outbound request to the chat backend for one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub timestamp: String,
    #[serde(default, rename = "clientIP")]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
}

// --- Storage entities ---

/// Lifecycle state of a stored conversation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Completed,
    Error,
}

/// A stored conversation (one widget session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_agent: String,
    pub ip_address: String,
    pub status: ConversationStatus,
    pub message_count: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub updated_at: String,
}

/// A feedback row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFeedback {
    pub message_id: String,
    pub conversation_id: String,
    pub positive: bool,
    pub comment: Option<String>,
    pub created_at: String,
}

/// Row of the admin "recent conversations" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentConversation {
    pub id: String,
    pub session_id: String,
    pub start_time: String,
    pub last_message: String,
    pub message_count: i64,
    pub status: ConversationStatus,
    pub user_agent: String,
}

/// Row of a user's own conversation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub session_id: String,
    pub start_time: String,
    /// Latest message from either side.
    pub last_message: String,
    pub message_count: i64,
    pub status: ConversationStatus,
    /// Category guessed from the first user message.
    pub topic: String,
    /// Percentage of positive feedback, when any was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
}

/// Per-user numbers for the user dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_conversations: i64,
    pub active_conversations: i64,
    pub total_messages: i64,
    pub average_response_time: f64,
    pub satisfaction_rate: f64,
}

/// Full record of one conversation for the admin detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetails {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
    pub feedback: Vec<StoredFeedback>,
}

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_conversations: i64,
    pub active_sessions: i64,
    pub total_messages: i64,
    /// Mean seconds between a user message and the bot reply.
    pub average_response_time: f64,
    /// Percentage of positive feedback.
    pub satisfaction_rate: f64,
    /// Percentage of conversations that ended in error.
    pub error_rate: f64,
}
