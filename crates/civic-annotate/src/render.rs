// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns canonical messages into display blocks with annotated text.

use civic_core::{AlertKind, AnnotatedSpan, ContentSegment, Message};
use serde::{Deserialize, Serialize};

use crate::annotate;

/// One display block, ready for a widget to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum RenderedBlock {
    Paragraph {
        spans: Vec<AnnotatedSpan>,
    },
    Heading {
        level: u8,
        spans: Vec<AnnotatedSpan>,
    },
    ListItem {
        spans: Vec<AnnotatedSpan>,
    },
    Alert {
        kind: AlertKind,
        spans: Vec<AnnotatedSpan>,
    },
    File {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// Annotated label, only present when the file has a link.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        spans: Vec<AnnotatedSpan>,
    },
    Location {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        spans: Vec<AnnotatedSpan>,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Divider,
}

/// Renders one segment, annotating whatever free text it carries.
pub fn render_segment(segment: &ContentSegment) -> RenderedBlock {
    match segment {
        ContentSegment::PlainText { value } => RenderedBlock::Paragraph {
            spans: annotate(value),
        },
        ContentSegment::Heading { value, level } => RenderedBlock::Heading {
            level: *level,
            spans: annotate(value),
        },
        ContentSegment::ListItem { value } => RenderedBlock::ListItem {
            spans: annotate(value),
        },
        ContentSegment::Alert { value, kind } => RenderedBlock::Alert {
            kind: *kind,
            spans: annotate(value),
        },
        ContentSegment::FileRef { label, url } => RenderedBlock::File {
            label: label.clone(),
            url: url.clone(),
            spans: segment.annotatable_text().map(annotate).unwrap_or_default(),
        },
        ContentSegment::LocationRef { label, url } => RenderedBlock::Location {
            label: label.clone(),
            url: url.clone(),
            spans: annotate(label),
        },
        ContentSegment::ImageRef { caption, image_url } => RenderedBlock::Image {
            caption: caption.clone(),
            image_url: image_url.clone(),
        },
        ContentSegment::Divider => RenderedBlock::Divider,
    }
}

/// Renders a whole message.
///
/// Structured bot messages map segment by segment; anything else becomes a
/// single paragraph built from `content`.
pub fn render_message(message: &Message) -> Vec<RenderedBlock> {
    if message.structured && !message.is_user {
        message.segments.iter().map(render_segment).collect()
    } else {
        vec![RenderedBlock::Paragraph {
            spans: annotate(&message.content),
        }]
    }
}
