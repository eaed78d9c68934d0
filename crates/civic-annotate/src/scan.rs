// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-pass span assembly.
//!
//! URLs are located first. Phone candidates are then collected only from the
//! text between URLs, overlapping candidates are resolved longest-first, and
//! the surviving matches are stitched together with the plain text around
//! them.

use std::ops::Range;

use civic_core::{AnnotatedSpan, SpanKind};

use crate::phone::{self, PhoneMatch};
use crate::url;

enum Hit {
    Url(Range<usize>),
    Phone(PhoneMatch),
}

impl Hit {
    fn kind_name(&self) -> &'static str {
        match self {
            Hit::Url(_) => "url",
            Hit::Phone(_) => "phone",
        }
    }

    fn range(&self) -> Range<usize> {
        match self {
            Hit::Url(r) => r.clone(),
            Hit::Phone(m) => m.range.clone(),
        }
    }
}

/// Splits `text` into spans. `text` must already be free of leftover markers.
pub fn scan(text: &str) -> Vec<AnnotatedSpan> {
    let urls = url::find_urls(text);

    let mut hits: Vec<Hit> = Vec::with_capacity(urls.len());
    let mut gap_start = 0;
    for range in urls.iter().cloned().chain(std::iter::once(text.len()..text.len())) {
        let gap = gap_start..range.start;
        if !gap.is_empty() {
            hits.extend(phones_in(text, gap).into_iter().map(Hit::Phone));
        }
        gap_start = range.end;
    }
    hits.extend(urls.into_iter().map(Hit::Url));
    hits.sort_by_key(|h| h.range().start);

    let mut spans = Vec::with_capacity(hits.len() * 2 + 1);
    let mut cursor = 0;
    for hit in hits {
        let range = hit.range();
        if range.start > cursor {
            spans.push(AnnotatedSpan::text(&text[cursor..range.start]));
        }
        let display = &text[range.clone()];
        tracing::trace!(start = range.start, end = range.end, kind = hit.kind_name(), "link match");
        spans.push(match hit {
            Hit::Url(r) => AnnotatedSpan {
                kind: SpanKind::WebLink,
                display: display.to_string(),
                target: Some(display.to_string()),
                tooltip: Some(display.to_string()),
                title: Some(url::link_title(text, r)),
            },
            Hit::Phone(m) => AnnotatedSpan {
                kind: SpanKind::TelLink,
                display: display.to_string(),
                target: Some(m.target()),
                tooltip: Some(m.tooltip(display)),
                title: None,
            },
        });
        cursor = range.end;
    }
    if cursor < text.len() || spans.is_empty() {
        spans.push(AnnotatedSpan::text(&text[cursor..]));
    }
    spans
}

/// Non-overlapping phone matches inside `gap`, in byte offsets of `text`.
fn phones_in(text: &str, gap: Range<usize>) -> Vec<PhoneMatch> {
    let offset = gap.start;
    let mut candidates = phone::find_candidates(&text[gap]);
    for m in &mut candidates {
        m.range = m.range.start + offset..m.range.end + offset;
    }
    resolve_overlaps(candidates)
}

/// Longest match wins; ties go to the earlier start.
fn resolve_overlaps(mut candidates: Vec<PhoneMatch>) -> Vec<PhoneMatch> {
    candidates.sort_by(|a, b| {
        b.range
            .len()
            .cmp(&a.range.len())
            .then(a.range.start.cmp(&b.range.start))
    });
    let mut kept: Vec<PhoneMatch> = Vec::new();
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|k| candidate.range.start < k.range.end && k.range.start < candidate.range.end);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|m| m.range.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(spans: &[AnnotatedSpan]) -> Vec<SpanKind> {
        spans.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn empty_text_is_one_empty_span() {
        assert_eq!(scan(""), vec![AnnotatedSpan::text("")]);
    }

    #[test]
    fn mixed_text() {
        let text = "Call (440) 871-3300 or see https://www.cityofwestlake.org.";
        let spans = scan(text);
        assert_eq!(
            kinds(&spans),
            vec![
                SpanKind::Text,
                SpanKind::TelLink,
                SpanKind::Text,
                SpanKind::WebLink,
                SpanKind::Text
            ]
        );
        assert_eq!(spans[3].title.as_deref(), Some("Visit cityofwestlake.org"));
        assert_eq!(spans[4].display, ".");
    }

    #[test]
    fn digits_inside_urls_are_not_phones() {
        let text = "https://example.org/records/4408713300";
        let spans = scan(text);
        assert_eq!(kinds(&spans), vec![SpanKind::WebLink]);
    }

    #[test]
    fn phone_right_after_url() {
        let text = "(https://example.org)440-871-3300";
        let spans = scan(text);
        assert_eq!(
            kinds(&spans),
            vec![SpanKind::Text, SpanKind::WebLink, SpanKind::Text, SpanKind::TelLink]
        );
    }

    #[test]
    fn longest_candidate_wins() {
        let spans = scan("Toll free: 1-800-555-0100");
        let tel = spans.iter().find(|s| s.kind == SpanKind::TelLink).unwrap();
        assert_eq!(tel.display, "1-800-555-0100");
        assert_eq!(tel.target.as_deref(), Some("+18005550100"));
    }

    #[test]
    fn adjacent_numbers_both_link() {
        let text = "440-871-3300 / 440-871-3301";
        let tels: Vec<_> = scan(text)
            .into_iter()
            .filter(|s| s.kind == SpanKind::TelLink)
            .map(|s| s.display)
            .collect();
        assert_eq!(tels, vec!["440-871-3300", "440-871-3301"]);
    }
}
