//! Abbreviation definitions (`*[HTML]: Hyper Text Markup Language`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::fragments;
use crate::fence;
use crate::util::escape_html;

static DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\[([^\]\n]+)\]:[ \t]*(.*?)[ \t]*(?:\n|$)").unwrap());

/// Abbreviations defined in a document.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    matcher: Option<Regex>,
    titles: Vec<(String, String)>,
}

impl Abbreviations {
    /// Removes definition lines from the source and collects them.
    ///
    /// Lines inside code are not definitions.
    /// Later definitions of the same abbreviation replace earlier ones.
    pub fn extract(text: &str) -> (String, Self) {
        let mut titles: Vec<(String, String)> = Vec::new();

        let stripped = fence::map_prose(text, |prose| {
            DEFINITION
                .replace_all(prose, |caps: &Captures<'_>| {
                    let abbr = caps[1].trim().to_string();
                    let title = caps[2].to_string();
                    match titles.iter_mut().find(|(existing, _)| *existing == abbr) {
                        Some(entry) => entry.1 = title,
                        None => titles.push((abbr, title)),
                    }
                    ""
                })
                .into_owned()
        });

        (stripped, Self::from_titles(titles))
    }

    fn from_titles(mut titles: Vec<(String, String)>) -> Self {
        if titles.is_empty() {
            return Self::default();
        }

        // Longest first so "HTML5" wins over "HTML"
        titles.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        let alternatives: Vec<String> = titles
            .iter()
            .map(|(abbr, _)| regex::escape(&escape_html(abbr)))
            .collect();
        let matcher = Regex::new(&format!("(?:{})", alternatives.join("|"))).ok();

        Self { matcher, titles }
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Wraps occurrences in rendered text with `<abbr title="...">`.
    ///
    /// Text inside links and code is left alone.
    pub fn apply(&self, html: &str) -> String {
        let Some(matcher) = &self.matcher else {
            return html.to_string();
        };

        fragments::map_text(html, |text| self.wrap(matcher, text))
    }

    /// Wraps matches that do not continue a word on either side.
    ///
    /// Text is HTML-escaped, so matching runs on escaped abbreviations.
    fn wrap(&self, matcher: &Regex, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut copied = 0;
        let mut search = 0;

        while let Some(found) = matcher.find_at(text, search) {
            if !at_word_edges(text, found.start(), found.end()) {
                search = found.start()
                    + text[found.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                continue;
            }

            let abbr = found.as_str();
            let title = self
                .titles
                .iter()
                .find(|(candidate, _)| escape_html(candidate) == abbr)
                .map(|(_, title)| title.as_str())
                .unwrap_or_default();

            result.push_str(&text[copied..found.start()]);
            result.push_str(&format!(
                "<abbr title=\"{}\">{}</abbr>",
                escape_html(title),
                abbr
            ));
            copied = found.end();
            search = found.end();
        }

        result.push_str(&text[copied..]);
        result
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A match may not glue onto a neighbouring word character with one of
/// its own word characters. Edges made of punctuation need no boundary.
fn at_word_edges(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let glued_before = matched.chars().next().is_some_and(is_word_char)
        && text[..start].chars().next_back().is_some_and(is_word_char);
    let glued_after = matched.chars().next_back().is_some_and(is_word_char)
        && text[end..].chars().next().is_some_and(is_word_char);
    !glued_before && !glued_after
}
