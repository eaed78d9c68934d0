// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL detection and link title derivation.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Number of characters before a URL searched for a descriptive phrase.
pub const CONTEXT_WINDOW: usize = 100;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s)]+").unwrap());

/// Phrases that name the document a link points at, checked in order.
static CONTEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\w+[ \t]+permits?)\b",
        r"(?i)(\w+[ \t]+applications?)\b",
        r"(?i)(\w+[ \t]+forms?)\b",
        r"(?i)(\w+[ \t]+documents?)\b",
        r"(?i)(\w+[ \t]+certificates?)\b",
        r"(?i)(\w+[ \t]+licen[cs]es?)\b",
        r"(?i)\b(building[ \t]+\w+)",
        r"(?i)\b(waterproofing[ \t]+\w+)",
        r"(?i)\b(zoning[ \t]+\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Byte ranges of every URL in `text`, left to right.
pub fn find_urls(text: &str) -> Vec<Range<usize>> {
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            // A bare scheme is not a link.
            if trimmed.ends_with("://") {
                return None;
            }
            Some(m.start()..m.start() + trimmed.len())
        })
        .collect()
}

/// Derives the link label for the URL at `range` within `text`.
///
/// A phrase in the preceding text wins over the URL's own content, which wins
/// over the bare host name.
pub fn link_title(text: &str, range: Range<usize>) -> String {
    let url = &text[range.clone()];
    title_from_context(preceding_window(text, range.start)).unwrap_or_else(|| title_from_url(url))
}

/// The last [`CONTEXT_WINDOW`] characters before byte offset `end`.
fn preceding_window(text: &str, end: usize) -> &str {
    let before = &text[..end];
    match before.char_indices().rev().nth(CONTEXT_WINDOW - 1) {
        Some((idx, _)) => &before[idx..],
        None => before,
    }
}

/// Looks for a document phrase such as "building permit" in `context`.
pub fn title_from_context(context: &str) -> Option<String> {
    CONTEXT_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(context))
        .map(|caps| title_case(&caps[1]))
}

/// Classifies a URL by what it appears to point at.
pub fn title_from_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();

    let label = if lower.contains("drive.google.com") {
        "View Document"
    } else if lower.contains(".pdf") {
        "View PDF Document"
    } else if lower.contains("form") || lower.contains("application") {
        "Access Form"
    } else if lower.contains("permit") {
        "Permit Application"
    } else if lower.contains("payment") || lower.contains("pay") {
        "Make Payment"
    } else if lower.contains("schedule") || lower.contains("calendar") {
        "View Schedule"
    } else {
        return visit_label(url);
    };
    label.to_string()
}

fn visit_label(url: &str) -> String {
    match url::Url::parse(url).ok().as_ref().and_then(url::Url::host_str) {
        Some(host) => format!("Visit {}", host.strip_prefix("www.").unwrap_or(host)),
        None => "Visit Link".to_string(),
    }
}

/// Upper-cases the first letter of every whitespace-separated word.
fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(text: &str) -> Vec<&str> {
        find_urls(text).into_iter().map(|r| &text[r]).collect()
    }

    #[test]
    fn finds_http_and_https_urls() {
        assert_eq!(
            urls("see http://a.org and https://b.org/x?y=1 now"),
            vec!["http://a.org", "https://b.org/x?y=1"]
        );
    }

    #[test]
    fn url_stops_at_closing_paren() {
        assert_eq!(urls("(details at https://a.org/page)"), vec!["https://a.org/page"]);
    }

    #[test]
    fn trailing_sentence_punctuation_is_excluded() {
        assert_eq!(urls("Visit https://a.org/page."), vec!["https://a.org/page"]);
        assert_eq!(urls("Try https://a.org, then call."), vec!["https://a.org"]);
    }

    #[test]
    fn bare_scheme_is_ignored() {
        assert!(urls("the prefix https:// alone").is_empty());
    }

    #[test]
    fn context_phrase_wins() {
        let text = "For your building permit application visit https://egov.cityofwestlake.org";
        let range = find_urls(text)[0].clone();
        assert_eq!(link_title(text, range), "Building Permit");
    }

    #[test]
    fn context_patterns_are_checked_in_order() {
        // "application" is checked before "building <word>".
        assert_eq!(
            title_from_context("submit the zoning application here").as_deref(),
            Some("Zoning Application")
        );
        assert_eq!(
            title_from_context("the building department page").as_deref(),
            Some("Building Department")
        );
    }

    #[test]
    fn context_is_limited_to_window() {
        let filler = "x".repeat(CONTEXT_WINDOW);
        let text = format!("building permit {filler} https://example.org");
        let range = find_urls(&text)[0].clone();
        assert_eq!(link_title(&text, range), "Visit example.org");
    }

    #[test]
    fn context_phrase_stays_on_one_line() {
        assert_eq!(title_from_context("the building\npermit"), None);
        assert_eq!(
            title_from_context("the building\tpermit").as_deref(),
            Some("Building Permit")
        );
    }

    #[test]
    fn formal_is_not_a_form() {
        assert_eq!(title_from_context("a formal request"), None);
    }

    #[test]
    fn url_content_classification() {
        assert_eq!(title_from_url("https://drive.google.com/file/d/abc"), "View Document");
        assert_eq!(title_from_url("https://x.org/Newsletter.PDF"), "View PDF Document");
        assert_eq!(title_from_url("https://x.org/forms/report-a-concern"), "Access Form");
        assert_eq!(title_from_url("https://x.org/permits-and-contractor-info"), "Permit Application");
        assert_eq!(title_from_url("https://x.org/online-payments"), "Make Payment");
        assert_eq!(title_from_url("https://x.org/events/calendar"), "View Schedule");
    }

    #[test]
    fn host_fallback_strips_www() {
        assert_eq!(title_from_url("https://www.cityofwestlake.org/page"), "Visit cityofwestlake.org");
    }

    #[test]
    fn unparseable_url_gets_generic_label() {
        assert_eq!(title_from_url("http://"), "Visit Link");
        assert_eq!(title_from_url("https://[broken"), "Visit Link");
    }

    #[test]
    fn window_respects_char_boundaries() {
        let text = format!("{}é https://example.org", "é".repeat(CONTEXT_WINDOW * 2));
        let range = find_urls(&text)[0].clone();
        assert_eq!(link_title(&text, range), "Visit example.org");
    }
}
