// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Removal of leftover link markers.
//!
//! Older widget builds rewrote links in place using sentinel tokens such as
//! `__URL_START__<url>__URL_TITLE__<title>__URL_END__`. Transcripts saved by
//! those builds can still contain them. Each marker is replaced by the text it
//! wrapped; a marker whose payload cannot be recovered is kept verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static LINK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__LINK__[^_]*__TITLE__[^_]*__ENDLINK__").unwrap());

static LINK_MARKER_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__LINK__(https?://[^_)]+)").unwrap());

static URL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__URL_START__(.+?)__URL_TITLE__.*?__URL_END__").unwrap());

static PHONE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__PHONE_START__.*?__PHONE_DISPLAY__(.+?)__PHONE_END__").unwrap()
});

const MARKER_PREFIX: &str = "__";

/// Strips leftover marker tokens, returning the input untouched when it has none.
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    if !text.contains(MARKER_PREFIX) {
        return Cow::Borrowed(text);
    }

    let mut out = Cow::Borrowed(text);

    if LINK_MARKER.is_match(&out) {
        let replaced = LINK_MARKER
            .replace_all(&out, |caps: &Captures<'_>| {
                let whole = &caps[0];
                match LINK_MARKER_URL.captures(whole) {
                    Some(url) => url[1].to_string(),
                    None => whole.to_string(),
                }
            })
            .into_owned();
        out = Cow::Owned(replaced);
    }

    if URL_MARKER.is_match(&out) {
        let replaced = URL_MARKER
            .replace_all(&out, |caps: &Captures<'_>| {
                let url = &caps[1];
                if url.starts_with("http://") || url.starts_with("https://") {
                    url.to_string()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();
        out = Cow::Owned(replaced);
    }

    if PHONE_MARKER.is_match(&out) {
        let replaced = PHONE_MARKER.replace_all(&out, "$1").into_owned();
        out = Cow::Owned(replaced);
    }

    if let Cow::Owned(_) = out {
        tracing::debug!("stripped leftover link markers from message text");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_markers_is_borrowed() {
        let input = "Call us at (440) 871-3300 or visit https://example.org";
        assert!(matches!(strip_markers(input), Cow::Borrowed(_)));
    }

    #[test]
    fn recovers_url_from_link_marker() {
        let input = "Apply: __LINK__https://example.org/apply__TITLE__Apply Online__ENDLINK__ today";
        assert_eq!(strip_markers(input), "Apply: https://example.org/apply today");
    }

    #[test]
    fn keeps_link_marker_without_url() {
        let input = "see __LINK__nothing here__TITLE__x__ENDLINK__";
        assert_eq!(strip_markers(input), input);
    }

    #[test]
    fn recovers_url_and_phone_markers() {
        let input = "Go to __URL_START__https://example.org__URL_TITLE__Visit example.org__URL_END__ \
                     or call __PHONE_START__+14408713300__PHONE_DISPLAY__(440) 871-3300__PHONE_END__.";
        assert_eq!(
            strip_markers(input),
            "Go to https://example.org or call (440) 871-3300."
        );
    }

    #[test]
    fn keeps_url_marker_with_bad_scheme() {
        let input = "__URL_START__ftp://x__URL_TITLE__t__URL_END__";
        assert_eq!(strip_markers(input), input);
    }

    #[test]
    fn plain_double_underscores_are_untouched() {
        let input = "snake__case and __init__";
        assert_eq!(strip_markers(input), input);
    }
}
