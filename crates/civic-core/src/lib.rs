// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the civic assistant.
//!
//! This crate provides the canonical message model, the annotated span type,
//! error types, and the adapter traits implemented by the chat backend and
//! the conversation store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CivicError;
pub use types::{
    AdapterType, AlertKind, AnnotatedSpan, ContentSegment, Feedback, HealthStatus, Message,
    MessageId, SessionId, SpanKind,
};

pub use traits::{ChatBackend, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConversationStatus;
    use std::str::FromStr;

    #[test]
    fn adapter_type_round_trips_through_strings() {
        for variant in [AdapterType::Backend, AdapterType::Storage, AdapterType::Channel] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn segment_json_uses_type_tag() {
        let seg = ContentSegment::heading("Hours", 2);
        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["value"], "Hours");
        assert_eq!(json["level"], 2);

        let image = ContentSegment::ImageRef {
            caption: None,
            image_url: "https://example.org/a.png".into(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["type"], "image_ref");
        assert_eq!(json["imageUrl"], "https://example.org/a.png");
        assert!(json.get("caption").is_none());

        let divider: ContentSegment = serde_json::from_str(r#"{"type":"divider"}"#).unwrap();
        assert_eq!(divider, ContentSegment::Divider);
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(
            ContentSegment::heading("x", 0),
            ContentSegment::Heading { value: "x".into(), level: 1 }
        );
        assert_eq!(
            ContentSegment::heading("x", 9),
            ContentSegment::Heading { value: "x".into(), level: 6 }
        );
    }

    #[test]
    fn annotatable_text_skips_non_text_segments() {
        assert_eq!(ContentSegment::Divider.annotatable_text(), None);
        assert_eq!(
            ContentSegment::ImageRef { caption: Some("c".into()), image_url: "u".into() }
                .annotatable_text(),
            None
        );
        assert_eq!(
            ContentSegment::FileRef { label: "Form".into(), url: None }.annotatable_text(),
            None
        );
        assert_eq!(
            ContentSegment::FileRef { label: "Form".into(), url: Some("u".into()) }
                .annotatable_text(),
            Some("Form")
        );
        assert_eq!(
            ContentSegment::Alert { value: "Closed".into(), kind: AlertKind::Warning }
                .annotatable_text(),
            Some("Closed")
        );
    }

    #[test]
    fn message_serializes_camel_case() {
        let msg = Message::bot_text("m1", "Hi", "2026-01-01T00:00:00Z");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["isUser"], false);
        assert_eq!(json["structured"], false);
        assert!(json.get("segments").is_none());
        assert!(json.get("feedback").is_none());
    }

    #[test]
    fn structured_message_with_no_segments_is_flat() {
        let msg = Message::bot_structured("m1", vec![], "2026-01-01T00:00:00Z");
        assert!(!msg.structured);
    }

    #[test]
    fn feedback_first_write_wins() {
        let mut msg = Message::bot_text("m1", "Hi", "2026-01-01T00:00:00Z");
        msg.attach_feedback(Feedback { positive: true, comment: None }).unwrap();
        let second = msg.attach_feedback(Feedback {
            positive: false,
            comment: Some("changed my mind".into()),
        });
        assert!(matches!(second, Err(CivicError::InvalidInput(_))));
        assert_eq!(msg.feedback.as_ref().map(|f| f.positive), Some(true));
    }

    #[test]
    fn transcript_joins_segment_text() {
        let msg = Message::bot_structured(
            "m1",
            vec![
                ContentSegment::heading("Trash pickup", 3),
                ContentSegment::Divider,
                ContentSegment::ListItem { value: "Mondays".into() },
            ],
            "2026-01-01T00:00:00Z",
        );
        assert_eq!(msg.transcript(), "Trash pickup\nMondays");
    }

    #[test]
    fn span_href_adds_tel_scheme() {
        let span = AnnotatedSpan {
            kind: SpanKind::TelLink,
            display: "(440) 871-3300".into(),
            target: Some("+14408713300".into()),
            tooltip: None,
            title: None,
        };
        assert_eq!(span.href().as_deref(), Some("tel:+14408713300"));
        assert_eq!(span.label(), "(440) 871-3300");
        assert_eq!(AnnotatedSpan::text("plain").href(), None);
    }

    #[test]
    fn span_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SpanKind::WebLink).unwrap(), "\"weblink\"");
        assert_eq!(SpanKind::TelLink.to_string(), "tellink");
    }

    #[test]
    fn conversation_status_parses() {
        assert_eq!(ConversationStatus::from_str("error").unwrap(), ConversationStatus::Error);
        assert_eq!(ConversationStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat_backend<T: ChatBackend>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
