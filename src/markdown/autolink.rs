//! Links bare URLs and e-mail addresses in rendered HTML.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::fragments;

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>()\[\]"']+"#).unwrap());

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());

/// Sentence punctuation kept outside a trailing URL.
const TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Escaped quote and angle characters. Text fragments are HTML-escaped, so
/// these end a URL just like the raw characters excluded by `URL`.
const DELIMITING_ENTITIES: &[&str] = &["&quot;", "&#39;", "&#x27;", "&lt;", "&gt;"];

/// Wraps bare URLs and e-mail addresses in anchors.
///
/// Existing tags are never modified and text inside `a`, `code` and `pre`
/// is left alone, so already linked URLs are not wrapped twice.
pub fn apply(html: &str) -> String {
    fragments::map_text(html, link_text)
}

/// Links URLs in a text node, then e-mail addresses in the gaps between
/// them so an address inside a URL is not linked separately.
fn link_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    while let Some(found) = URL.find_at(text, last) {
        result.push_str(&link_emails(&text[last..found.start()]));

        let matched = cut_at_entity(found.as_str());
        let url = matched.trim_end_matches(TRAILING);
        let rest = &matched[url.len()..];
        result.push_str(&format!("<a href=\"{url}\">{url}</a>{rest}"));

        last = found.start() + matched.len();
    }

    result.push_str(&link_emails(&text[last..]));
    result
}

/// Shortens a URL match to end before the first delimiting entity.
fn cut_at_entity(url: &str) -> &str {
    let end = DELIMITING_ENTITIES
        .iter()
        .filter_map(|entity| url.find(entity))
        .min()
        .unwrap_or(url.len());
    &url[..end]
}

fn link_emails(text: &str) -> String {
    EMAIL
        .replace_all(text, |caps: &Captures<'_>| {
            format!("<a href=\"mailto:{0}\">{0}</a>", &caps[0])
        })
        .into_owned()
}
