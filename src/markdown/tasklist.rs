//! Rewrites `[ ]` / `[x]` list items into checkbox items.

use once_cell::sync::Lazy;
use regex::Regex;

/// Task marker directly after the list item tag, plus following spaces.
static TASK_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<li>\[([ xX])\]\s*").unwrap());

const OPEN_UNCHECKED: &str = "<li class=\"task-item\"><input type=\"checkbox\" disabled> <span>";
const OPEN_CHECKED: &str =
    "<li class=\"task-item done\"><input type=\"checkbox\" checked disabled> <span>";

/// Converts task list items into disabled checkboxes with a label span.
///
/// Checked items get the `done` class. The label span closes before a
/// nested list or, failing that, before the item's own `</li>`.
pub fn apply(html: &str) -> String {
    let mut edits: Vec<(usize, usize, &str)> = Vec::new();

    for caps in TASK_MARKER.captures_iter(html) {
        let Some(marker) = caps.get(0) else { continue };
        let open = if &caps[1] == " " {
            OPEN_UNCHECKED
        } else {
            OPEN_CHECKED
        };

        edits.push((marker.start(), marker.end(), open));
        let end = label_end(html, marker.end());
        edits.push((end, end, "</span>"));
    }

    if edits.is_empty() {
        return html.to_string();
    }

    // Label ends of outer items can follow markers of nested items
    edits.sort_by_key(|(start, _, _)| *start);

    let mut result = String::with_capacity(html.len() + edits.len() * 48);
    let mut last = 0;
    for (start, end, text) in edits {
        result.push_str(&html[last..start]);
        result.push_str(text);
        last = end;
    }
    result.push_str(&html[last..]);
    result
}

/// Finds where the label text of the item starting at `from` ends.
fn label_end(html: &str, from: usize) -> usize {
    let rest = &html[from..];
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = rest[pos..].find('<') {
        let at = pos + offset;
        let tag = &rest[at..];

        if depth == 0 && (tag.starts_with("<ul") || tag.starts_with("<ol")) {
            return from + at;
        }
        if tag.starts_with("<li") {
            depth += 1;
        } else if tag.starts_with("</li>") {
            if depth == 0 {
                return from + at;
            }
            depth -= 1;
        }

        pos = at + 1;
    }

    html.len()
}
