// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number detection.
//!
//! Three pattern families are tried independently and every hit becomes a
//! candidate; overlap resolution happens in [`crate::scan`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Area codes that are free to call from the US.
pub const TOLL_FREE_PREFIXES: &[&str] = &["800", "888", "877", "866", "855", "844", "833", "822"];

pub const EXTENSION_NOTE: &str = " - Note: Extensions may not work on mobile devices";

// Digit classes are ASCII-only: a tel target must dial exactly what was shown.
const EXTENSION: &str = r"(?:\s?(?:extension|ext|x)\.?\s?(?P<ext>[0-9]{1,6}))?";

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let toll_free = TOLL_FREE_PREFIXES.join("|");
    [
        // (440) 871-3300, 440 871 3300, 440.8713300, 4408713300
        r"(?i)(?P<main>(?:\([0-9]{3}\)\s?|[0-9]{3}\s?)[0-9]{3}[-.\s]?[0-9]{4})".to_string(),
        // 440-871-3300, 440.871.3300
        r"(?i)(?P<main>[0-9]{3}[-.\s][0-9]{3}[-.\s][0-9]{4})".to_string(),
        // 1-800-555-0100, (888) 555 0100
        format!(r"(?i)(?P<main>(?:1[-.\s]?)?(?:\((?:{toll_free})\)|(?:{toll_free}))[-.\s]?[0-9]{{3}}[-.\s]?[0-9]{{4}})"),
    ]
    .into_iter()
    .map(|p| Regex::new(&(p + EXTENSION)).unwrap())
    .collect()
});

/// A phone number found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    /// Byte range of the whole match, extension included.
    pub range: Range<usize>,
    /// Digits of the number without the extension.
    pub digits: String,
    pub extension: Option<String>,
}

impl PhoneMatch {
    /// `+`-prefixed dialable number. Extensions are never dialed.
    pub fn target(&self) -> String {
        if self.digits.len() == 10 {
            format!("+1{}", self.digits)
        } else {
            format!("+{}", self.digits)
        }
    }

    pub fn is_toll_free(&self) -> bool {
        let national = match self.digits.strip_prefix('1') {
            Some(rest) if self.digits.len() == 11 => rest,
            _ => self.digits.as_str(),
        };
        TOLL_FREE_PREFIXES.iter().any(|p| national.starts_with(p))
    }

    pub fn tooltip(&self, display: &str) -> String {
        let mut tooltip = format!("Call {display}");
        if self.is_toll_free() {
            tooltip.push_str(" (Toll-Free)");
        }
        if self.extension.is_some() {
            tooltip.push_str(EXTENSION_NOTE);
        }
        tooltip
    }
}

/// Every phone candidate in `text` across all pattern families.
///
/// Candidates may overlap. A hit directly adjacent to another digit is part of
/// a longer number and is skipped.
pub fn find_candidates(text: &str) -> Vec<PhoneMatch> {
    let mut found = Vec::new();
    for pattern in PATTERNS.iter() {
        let mut pos = 0;
        while pos < text.len() {
            let Some(caps) = pattern.captures_at(text, pos) else {
                break;
            };
            let (Some(whole), Some(main)) = (caps.get(0), caps.name("main")) else {
                break;
            };
            let digits: String = main.as_str().chars().filter(char::is_ascii_digit).collect();
            let (range, extension) = if !digit_adjacent(text, whole.range()) {
                (whole.range(), caps.name("ext").map(|m| m.as_str().to_string()))
            } else if whole.range() != main.range() && !digit_adjacent(text, main.range()) {
                // Over-long extension: link the number alone.
                (main.range(), None)
            } else {
                pos = next_char_boundary(text, whole.start());
                continue;
            };
            pos = range.end;
            found.push(PhoneMatch {
                range,
                digits,
                extension,
            });
        }
    }
    found
}

fn digit_adjacent(text: &str, range: Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displays(text: &str) -> Vec<&str> {
        let mut all: Vec<_> = find_candidates(text)
            .into_iter()
            .map(|m| &text[m.range])
            .collect();
        all.sort();
        all.dedup();
        all
    }

    #[test]
    fn finds_common_formats() {
        assert_eq!(displays("call (440) 871-3300"), vec!["(440) 871-3300"]);
        assert_eq!(displays("call 440.871.3300"), vec!["440.871.3300"]);
        assert_eq!(displays("call 4408713300"), vec!["4408713300"]);
        assert_eq!(displays("call 440 871 3300"), vec!["440 871 3300"]);
    }

    #[test]
    fn toll_free_with_leading_one() {
        let text = "1-800-555-0100";
        let longest = find_candidates(text)
            .into_iter()
            .max_by_key(|m| m.range.len())
            .unwrap();
        assert_eq!(longest.range, 0..text.len());
        assert_eq!(longest.target(), "+18005550100");
        assert!(longest.is_toll_free());
    }

    #[test]
    fn extension_is_captured_but_not_dialed() {
        let text = "(440) 871-3300 ext. 5";
        let m = find_candidates(text)
            .into_iter()
            .max_by_key(|m| m.range.len())
            .unwrap();
        assert_eq!(&text[m.range.clone()], text);
        assert_eq!(m.extension.as_deref(), Some("5"));
        assert_eq!(m.target(), "+14408713300");
        assert!(m.tooltip(text).ends_with(EXTENSION_NOTE));
    }

    #[test]
    fn extension_keywords_are_case_insensitive() {
        let text = "440-871-3300 Extension 1234";
        let m = find_candidates(text)
            .into_iter()
            .max_by_key(|m| m.range.len())
            .unwrap();
        assert_eq!(m.extension.as_deref(), Some("1234"));
    }

    #[test]
    fn longer_digit_runs_are_not_phones() {
        assert!(find_candidates("order 94408713300").is_empty());
        assert!(find_candidates("id 44087133001234").is_empty());
    }

    #[test]
    fn overlong_extension_keeps_the_number() {
        let text = "440-871-3300 x1234567";
        let m = find_candidates(text)
            .into_iter()
            .max_by_key(|m| m.range.len())
            .unwrap();
        assert_eq!(&text[m.range.clone()], "440-871-3300");
        assert_eq!(m.extension, None);
        assert_eq!(m.target(), "+14408713300");
    }

    #[test]
    fn non_ascii_digits_are_not_phones() {
        assert!(find_candidates("Call ４４０８７１３３００").is_empty());
        assert!(find_candidates("Call ٤٤٠٨٧١٣٣٠٠").is_empty());
        assert!(find_candidates("Call ４４０-８７１-３３００").is_empty());
    }

    #[test]
    fn tooltip_for_local_number() {
        let m = &find_candidates("440-871-3300")[0];
        assert_eq!(m.tooltip("440-871-3300"), "Call 440-871-3300");
    }

    #[test]
    fn tooltip_marks_toll_free() {
        let text = "888.555.0100";
        let m = &find_candidates(text)[0];
        assert_eq!(m.tooltip(text), "Call 888.555.0100 (Toll-Free)");
    }

    #[test]
    fn local_number_starting_with_toll_free_digits_elsewhere() {
        // 800 as exchange, not area code.
        let m = &find_candidates("440-800-1234")[0];
        assert!(!m.is_toll_free());
    }
}
