//! Source rewrites applied right before comrak runs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fence::{self, FenceTracker};

/// `~~text~~` on a single line, no `~` inside.
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~\n]+?)~~").unwrap());

/// Bullet (`-`, `*`, `+`) or ordered (`1.`) list marker followed by a space.
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(?:[-*+]|\d+\.)[ \t]").unwrap());

/// Applies strikethrough conversion and list separation.
pub fn preprocess(text: &str) -> String {
    let text = strikethrough(text);
    separate_lists(&text)
}

/// Converts `~~text~~` to a literal `<del>` element outside code.
pub fn strikethrough(text: &str) -> String {
    fence::map_prose(text, |prose| {
        STRIKETHROUGH.replace_all(prose, "<del>$1</del>").into_owned()
    })
}

/// Inserts a blank line before a list that directly follows a paragraph.
///
/// A list marker line preceded by a non-blank line that is not itself
/// part of a list gets an empty line in front of it. Indented lines after
/// a list item count as its continuation. Fenced code is copied verbatim.
pub fn separate_lists(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 16);
    let mut tracker = FenceTracker::new();
    let mut prev_blank = true;
    let mut in_list = false;

    for line in text.split_inclusive('\n') {
        if tracker.is_code(line) {
            result.push_str(line);
            prev_blank = false;
            in_list = false;
            continue;
        }

        let content = line.trim_end_matches(['\n', '\r']);

        if content.trim().is_empty() {
            prev_blank = true;
        } else if is_list_item(content) {
            if !prev_blank && !in_list {
                result.push('\n');
            }
            in_list = true;
            prev_blank = false;
        } else {
            in_list = in_list && content.starts_with([' ', '\t']);
            prev_blank = false;
        }

        result.push_str(line);
    }

    result
}

/// Returns true when the line starts with a list marker.
pub fn is_list_item(line: &str) -> bool {
    LIST_MARKER.is_match(line)
}
