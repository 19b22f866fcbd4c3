//! Text/tag fragment walking over rendered HTML.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Rewrites text between tags, skipping text inside `a`, `code` and `pre`.
///
/// Tags are copied unchanged. Nesting depth is incremented on the opening
/// tag of a skipped element and decremented (never below zero) on its
/// closing tag; text is rewritten only at depth zero.
pub fn map_text(html: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut result = String::with_capacity(html.len());
    let mut depth: usize = 0;
    let mut last = 0;

    for tag in HTML_TAG.find_iter(html) {
        push_text(&mut result, &html[last..tag.start()], depth, &mut rewrite);
        result.push_str(tag.as_str());
        depth = next_depth(depth, tag.as_str());
        last = tag.end();
    }

    push_text(&mut result, &html[last..], depth, &mut rewrite);
    result
}

fn push_text(
    out: &mut String,
    text: &str,
    depth: usize,
    rewrite: &mut impl FnMut(&str) -> String,
) {
    if depth == 0 && !text.is_empty() {
        out.push_str(&rewrite(text));
    } else {
        out.push_str(text);
    }
}

fn next_depth(depth: usize, tag: &str) -> usize {
    let lower = tag.to_ascii_lowercase();

    let opens = ["<a ", "<a>", "<code", "<pre"]
        .iter()
        .any(|prefix| lower.starts_with(prefix));

    if opens {
        depth + 1
    } else if lower == "</a>" || lower == "</code>" || lower == "</pre>" {
        depth.saturating_sub(1)
    } else {
        depth
    }
}
