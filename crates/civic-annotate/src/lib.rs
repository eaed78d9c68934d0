// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Annotation of assistant message text.
//!
//! [`annotate`] finds URLs and phone numbers in a string and returns an
//! ordered list of [`AnnotatedSpan`]s. Concatenating the `display` of every
//! span reproduces the (marker-free) input exactly. [`render`] applies the
//! annotator to whole [`civic_core::Message`]s.

pub mod markers;
pub mod phone;
pub mod render;
pub mod scan;
pub mod url;

use civic_core::AnnotatedSpan;

pub use render::{RenderedBlock, render_message};

/// Splits `text` into plain text, web link, and tel link spans.
///
/// Leftover link markers from older transcripts are stripped first. Text with
/// no links yields exactly one plain span.
pub fn annotate(text: &str) -> Vec<AnnotatedSpan> {
    let clean = markers::strip_markers(text);
    scan::scan(&clean)
}

/// Concatenated `display` text of `spans`.
pub fn reconstruct(spans: &[AnnotatedSpan]) -> String {
    spans.iter().map(|s| s.display.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::SpanKind;

    #[test]
    fn plain_text_round_trips() {
        let spans = annotate("City Hall is open Monday through Friday.");
        assert_eq!(spans, vec![AnnotatedSpan::text("City Hall is open Monday through Friday.")]);
    }

    #[test]
    fn phone_normalization() {
        let spans = annotate("Call (440) 871-3300");
        let tel = &spans[1];
        assert_eq!(tel.kind, SpanKind::TelLink);
        assert_eq!(tel.display, "(440) 871-3300");
        assert_eq!(tel.target.as_deref(), Some("+14408713300"));
        assert_eq!(tel.tooltip.as_deref(), Some("Call (440) 871-3300"));
    }

    #[test]
    fn toll_free_tagging() {
        let spans = annotate("1-800-555-0100");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].tooltip.as_deref().unwrap().contains("Toll-Free"));
    }

    #[test]
    fn extension_handling() {
        let spans = annotate("(440) 871-3300 ext. 5");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].display, "(440) 871-3300 ext. 5");
        assert_eq!(spans[0].target.as_deref(), Some("+14408713300"));
        assert!(spans[0].tooltip.as_deref().unwrap().contains("Extensions may not work"));
    }

    #[test]
    fn fullwidth_digits_stay_plain() {
        let text = "Call ４４０８７１３３００";
        assert_eq!(annotate(text), vec![AnnotatedSpan::text(text)]);
        let arabic = "Call ٤٤٠٨٧١٣٣٠٠";
        assert_eq!(annotate(arabic), vec![AnnotatedSpan::text(arabic)]);
    }

    #[test]
    fn overlong_extension_links_main_number() {
        let spans = annotate("Dial 440-871-3300 x1234567 now");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].kind, SpanKind::TelLink);
        assert_eq!(spans[1].display, "440-871-3300");
        assert_eq!(spans[1].target.as_deref(), Some("+14408713300"));
        assert_eq!(spans[2].display, " x1234567 now");
    }

    #[test]
    fn url_title_prefers_context() {
        let text = "For your building permit application visit https://egov.cityofwestlake.org";
        let spans = annotate(text);
        let link = spans.iter().find(|s| s.kind == SpanKind::WebLink).unwrap();
        assert_eq!(link.display, "https://egov.cityofwestlake.org");
        assert_eq!(link.target.as_deref(), Some("https://egov.cityofwestlake.org"));
        assert_eq!(link.tooltip.as_deref(), Some("https://egov.cityofwestlake.org"));
        assert_eq!(link.label(), "Building Permit");
        assert_eq!(reconstruct(&spans), text);
    }

    #[test]
    fn leftover_markers_are_stripped_before_scanning() {
        let spans = annotate(
            "Pay online: __URL_START__https://x.org/pay__URL_TITLE__Make Payment__URL_END__",
        );
        assert_eq!(reconstruct(&spans), "Pay online: https://x.org/pay");
        assert_eq!(spans[1].label(), "Make Payment");
    }

    #[test]
    fn annotation_is_idempotent() {
        let text = "Permits: https://x.org/permits, (440) 871-3300 x12 or 1 888 555 0100.";
        let first = annotate(text);
        let second = annotate(&reconstruct(&first));
        assert_eq!(first, second);
    }
}
