// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the annotator.

use civic_annotate::{annotate, reconstruct};
use civic_core::{AnnotatedSpan, SpanKind};
use proptest::prelude::*;

/// Text assembled from fragments that exercise URLs, phone numbers and the
/// punctuation around them.
fn message_text() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        "[a-zA-Z ,.()!?-]{0,12}",
        "[0-9 ().-]{0,16}",
        Just("https://www.cityofwestlake.org".to_string()),
        Just("http://x.org/forms/a.pdf".to_string()),
        Just("(440) 871-3300".to_string()),
        Just("1-800-555-0100".to_string()),
        Just(" ext. 12".to_string()),
        Just("building permit ".to_string()),
        Just("é漢".to_string()),
        Just("４４０８７１３３００".to_string()),
        Just(" x1234567".to_string()),
    ];
    prop::collection::vec(fragment, 0..8).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn concatenation_reproduces_input(text in message_text()) {
        prop_assert_eq!(reconstruct(&annotate(&text)), text);
    }

    #[test]
    fn annotation_is_idempotent(text in message_text()) {
        let first = annotate(&text);
        let second = annotate(&reconstruct(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn text_without_links_is_a_single_span(text in "[a-zA-Z ,.!?]{0,64}") {
        prop_assert_eq!(annotate(&text), vec![AnnotatedSpan::text(text.clone())]);
    }

    #[test]
    fn link_spans_always_have_targets(text in message_text()) {
        for span in annotate(&text) {
            match span.kind {
                SpanKind::Text => prop_assert!(span.target.is_none()),
                SpanKind::WebLink => {
                    prop_assert_eq!(span.target.as_deref(), Some(span.display.as_str()));
                    prop_assert!(span.title.is_some());
                }
                SpanKind::TelLink => {
                    let target = span.target.unwrap_or_default();
                    prop_assert!(target.starts_with('+'));
                    prop_assert!(target[1..].chars().all(|c| c.is_ascii_digit()));
                    // +1 and ten digits, or + and eleven.
                    prop_assert_eq!(target.len(), 12);
                }
            }
        }
    }

    #[test]
    fn spans_are_never_empty_except_for_empty_input(text in message_text()) {
        let spans = annotate(&text);
        if text.is_empty() {
            prop_assert_eq!(spans.len(), 1);
        } else {
            prop_assert!(spans.iter().all(|s| !s.display.is_empty()));
        }
    }
}

#[test]
fn documented_examples() {
    let spans = annotate("Call (440) 871-3300");
    assert_eq!(spans[1].target.as_deref(), Some("+14408713300"));

    let spans = annotate("1-800-555-0100");
    assert!(spans[0].tooltip.as_deref().unwrap_or_default().contains("Toll-Free"));

    let spans = annotate("(440) 871-3300 ext. 5");
    assert_eq!(spans[0].target.as_deref(), Some("+14408713300"));
    assert!(spans[0].display.contains("ext. 5"));
}
