//! Heading anchors and the `[TOC]` table of contents.

use maud::{Markup, PreEscaped, html};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::outline::{Node, nest_by_depth, slugify};
use crate::util::html_decode;

/// Heading element as emitted by comrak (no attributes, single line).
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h([1-6])>(.*?)</h[1-6]>").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Marker paragraph replaced by the table of contents.
const MARKER: &str = "<p>[TOC]</p>";

/// Heading entry of the generated table of contents.
#[derive(Debug, Clone)]
struct TocEntry {
    depth: u8,
    id: String,
    /// Heading content with tags removed, still HTML-escaped
    text: String,
}

/// Adds `id` attributes to headings and expands the `[TOC]` marker.
///
/// Ids are unique per document: repeats get `_1`, `_2`, ... suffixes.
/// `slug_text` maps heading text to the text the id is derived from, so
/// callers can drop content that is not final yet.
pub fn apply(html: &str, title: &str, slug_text: impl Fn(&str) -> String) -> String {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut entries = Vec::new();

    let with_ids = HEADING.replace_all(html, |caps: &Captures<'_>| {
        let level = &caps[1];
        let inner = &caps[2];
        let text = TAG.replace_all(inner, "").into_owned();
        let id = unique_id(&mut seen, slugify(&slug_text(&html_decode(&text))));

        entries.push(TocEntry {
            depth: level.parse().unwrap_or(1),
            id: id.clone(),
            text,
        });

        format!("<h{level} id=\"{id}\">{inner}</h{level}>")
    });

    if !with_ids.contains(MARKER) {
        return with_ids.into_owned();
    }

    let toc = render_toc(title, &nest_by_depth(entries, |entry| entry.depth));
    with_ids.replace(MARKER, &toc.into_string())
}

fn unique_id(seen: &mut HashMap<String, usize>, slug: String) -> String {
    let base = if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    };

    let count = seen.entry(base.clone()).or_insert(0);
    let id = if *count == 0 {
        base.clone()
    } else {
        format!("{base}_{count}")
    };
    *count += 1;
    id
}

fn render_toc(title: &str, nodes: &[Node<TocEntry>]) -> Markup {
    html! {
        div class="toc" {
            @if !title.is_empty() {
                span class="toctitle" { (title) }
            }
            (toc_list(nodes))
        }
    }
}

fn toc_list(nodes: &[Node<TocEntry>]) -> Markup {
    html! {
        ul {
            @for node in nodes {
                li {
                    a href=(format!("#{}", node.item.id)) { (PreEscaped(&node.item.text)) }
                    @if !node.children.is_empty() {
                        (toc_list(&node.children))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_ids_added() {
        // Arrange
        let html = "<h1>Title</h1>\n<h2>Sub <em>part</em></h2>";

        // Act
        let result = apply(html, "Contents", str::to_string);

        // Assert
        assert_eq!(
            result,
            "<h1 id=\"title\">Title</h1>\n<h2 id=\"sub-part\">Sub <em>part</em></h2>"
        );
    }

    #[test]
    fn test_duplicate_ids_suffixed() {
        // Arrange
        let html = "<h2>Notes</h2><h2>Notes</h2><h2>Notes</h2>";

        // Act
        let result = apply(html, "", str::to_string);

        // Assert
        assert!(result.contains("id=\"notes\""));
        assert!(result.contains("id=\"notes_1\""));
        assert!(result.contains("id=\"notes_2\""));
    }

    #[test]
    fn test_entities_not_part_of_id() {
        let result = apply("<h2>Q &amp; A</h2>", "", str::to_string);
        assert_eq!(result, "<h2 id=\"q-a\">Q &amp; A</h2>");
    }

    #[test]
    fn test_empty_heading_gets_fallback_id() {
        assert_eq!(
            apply("<h3>!!!</h3>", "", str::to_string),
            "<h3 id=\"section\">!!!</h3>"
        );
    }

    #[test]
    fn test_slug_text_filters_id_source() {
        // Arrange
        let html = "<p>[TOC]</p>\n<h1>Euler XMTH0XMTH</h1>";

        // Act
        let result = apply(html, "", |text| text.replace("XMTH0XMTH", ""));

        // Assert
        assert!(result.contains("<h1 id=\"euler\">Euler XMTH0XMTH</h1>"), "Got: {result}");
        assert!(result.contains("<a href=\"#euler\">"), "Got: {result}");
    }

    #[test]
    fn test_toc_marker_expanded() {
        // Arrange
        let html = "<p>[TOC]</p>\n<h1>A</h1>\n<h2>B</h2>\n<h1>C</h1>";

        // Act
        let result = apply(html, "Contents", str::to_string);

        // Assert
        assert!(
            result.starts_with(
                "<div class=\"toc\"><span class=\"toctitle\">Contents</span>\
                 <ul><li><a href=\"#a\">A</a><ul><li><a href=\"#b\">B</a></li></ul></li>\
                 <li><a href=\"#c\">C</a></li></ul></div>"
            ),
            "Got: {result}"
        );
        assert!(!result.contains("[TOC]"));
    }

    #[test]
    fn test_without_marker_no_toc() {
        let result = apply("<h1>A</h1>", "Contents", str::to_string);
        assert!(!result.contains("class=\"toc\""));
    }

    #[test]
    fn test_toc_title_escaped() {
        let result = apply("<p>[TOC]</p><h1>A</h1>", "<Index>", str::to_string);
        assert!(result.contains("&lt;Index&gt;"));
    }
}
