// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of chat webhook responses.
//!
//! The workflow behind the webhook answers in several shapes: a labelled
//! structured reply (`{"formatted": true, "message": [...]}`), a labelled flat
//! reply (`{"formatted": false, "message": "..."}`), or a legacy object with
//! the answer under one of a handful of field names. [`normalize`] maps all of
//! them onto [`Message`] and never fails; an unreadable reply becomes the
//! configured fallback text.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use civic_core::{AlertKind, ContentSegment, Message};
use serde_json::{Map, Value};

/// Legacy answer fields, in priority order.
pub const LEGACY_FIELDS: &[&str] = &["bot_response", "response", "message", "text", "output", "data"];

/// Default heading level when a heading element has none.
const DEFAULT_HEADING_LEVEL: u8 = 3;

/// Holds the fallback text so callers only pass the raw reply.
#[derive(Debug, Clone)]
pub struct MessageNormalizer {
    fallback: String,
}

impl MessageNormalizer {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn normalize(&self, raw: &Value, received_at: DateTime<Utc>) -> Message {
        normalize(raw, received_at, &self.fallback)
    }

    /// The message shown when the backend could not be reached at all.
    pub fn fallback_message(&self, received_at: DateTime<Utc>) -> Message {
        Message::bot_text(new_id(), self.fallback.clone(), timestamp(received_at))
    }
}

/// Maps one raw webhook reply onto a bot [`Message`].
pub fn normalize(raw: &Value, received_at: DateTime<Utc>, fallback: &str) -> Message {
    let id = new_id();
    let ts = timestamp(received_at);

    let raw = match raw {
        // n8n "respond with all incoming items" wraps the reply in an array.
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };

    let obj = match raw {
        Value::Object(obj) => obj,
        Value::String(s) if !s.trim().is_empty() => return Message::bot_text(id, s.clone(), ts),
        other => {
            tracing::warn!(kind = json_kind(other), "unrecognised webhook reply, using fallback");
            return Message::bot_text(id, fallback, ts);
        }
    };

    match (obj.get("formatted"), obj.get("message")) {
        (Some(Value::Bool(true)), Some(Value::Array(elements))) if !elements.is_empty() => {
            let segments: Vec<ContentSegment> = elements.iter().filter_map(to_segment).collect();
            if !segments.is_empty() {
                tracing::debug!(segments = segments.len(), "structured reply");
                return Message::bot_structured(id, segments, ts);
            }
        }
        (Some(Value::Bool(false)), Some(Value::String(text))) if !text.trim().is_empty() => {
            return Message::bot_text(id, text.clone(), ts);
        }
        _ => {}
    }

    match legacy_content(obj) {
        Some(content) => Message::bot_text(id, content, ts),
        None => {
            tracing::warn!(
                fields = ?obj.keys().collect::<Vec<_>>(),
                "webhook reply has no usable answer field, using fallback"
            );
            Message::bot_text(id, fallback, ts)
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First non-blank string among [`LEGACY_FIELDS`].
fn legacy_content(obj: &Map<String, Value>) -> Option<String> {
    LEGACY_FIELDS.iter().find_map(|field| match obj.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First string value found under any of `keys`.
fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn text_of(obj: &Map<String, Value>) -> String {
    str_field(obj, &["content", "value", "text"]).unwrap_or_default()
}

/// Label for a file or location element. A bare link is labelled with itself.
fn link_label(obj: &Map<String, Value>, keys: &[&str], url: Option<&str>) -> String {
    str_field(obj, keys)
        .filter(|l| !l.trim().is_empty())
        .or_else(|| Some(text_of(obj)).filter(|t| !t.trim().is_empty()))
        .or_else(|| url.map(str::to_string))
        .unwrap_or_default()
}

/// Maps one structured element. Elements with nothing to show are dropped.
fn to_segment(element: &Value) -> Option<ContentSegment> {
    let obj = match element {
        Value::Object(obj) => obj,
        Value::String(s) => return Some(ContentSegment::PlainText { value: s.clone() }),
        _ => return None,
    };

    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("text")
        .to_ascii_lowercase();

    let segment = match tag.as_str() {
        "heading" => {
            let level = obj
                .get("level")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_HEADING_LEVEL, |l| l.min(u64::from(u8::MAX)) as u8);
            ContentSegment::heading(text_of(obj), level)
        }
        "list-item" | "list_item" | "bullet" => ContentSegment::ListItem {
            value: text_of(obj),
        },
        "alert" => ContentSegment::Alert {
            value: text_of(obj),
            kind: str_field(obj, &["kind", "variant"])
                .and_then(|k| AlertKind::from_str(&k).ok())
                .unwrap_or_default(),
        },
        "file" | "document" => {
            let url = str_field(obj, &["url", "href"]);
            ContentSegment::FileRef {
                label: link_label(obj, &["label", "name"], url.as_deref()),
                url,
            }
        }
        "location" | "map" => {
            let url = str_field(obj, &["url", "href", "mapUrl"]);
            ContentSegment::LocationRef {
                label: link_label(obj, &["label", "address"], url.as_deref()),
                url,
            }
        }
        "image" => match str_field(obj, &["imageUrl", "image_url", "url", "src"]) {
            Some(image_url) => ContentSegment::ImageRef {
                caption: str_field(obj, &["caption", "alt"]),
                image_url,
            },
            None => ContentSegment::PlainText {
                value: str_field(obj, &["caption", "alt"]).unwrap_or_default(),
            },
        },
        "divider" | "separator" | "hr" => return Some(ContentSegment::Divider),
        _ => ContentSegment::PlainText {
            value: text_of(obj),
        },
    };

    match &segment {
        ContentSegment::ImageRef { .. } => Some(segment),
        other if other.plain_text().is_some_and(|t| !t.is_empty()) => Some(segment),
        _ => None,
    }
}
