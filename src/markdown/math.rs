//! Math extraction and MathJax restoration.
//!
//! TeX uses `_`, `*` and `^` heavily, which comrak would read as emphasis.
//! Formulas are therefore swapped for placeholders before conversion and
//! written back with MathJax delimiters afterwards.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::placeholder::{PlaceholderStore, replace_block};
use crate::fence;
use crate::util::escape_text;

/// `$` alone on a line, content, `$` alone on a line.
static SINGLE_DOLLAR_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^\$[ \t]*\n(.*?)\n\$[ \t]*$").unwrap());

/// `$$ ... $$`, possibly across lines.
static DOUBLE_DOLLAR_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());

/// `$ ... $` without `$` or newline inside. Neighbouring `$` are rejected
/// by the caller since the regex crate has no lookaround.
static INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$\n]+)\$").unwrap());

/// Formula captured from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathFragment {
    /// TeX source without delimiters, trimmed
    pub content: String,
    /// Display formula rendered in its own block
    pub display: bool,
}

/// Replaces formulas in prose with placeholder tokens.
///
/// Fenced code blocks and inline code spans are left untouched. Display
/// formulas become a token on its own line so comrak emits a dedicated
/// paragraph for them.
pub fn extract(text: &str) -> (String, PlaceholderStore<MathFragment>) {
    let mut store = PlaceholderStore::new("MTH", text);

    let result = fence::map_prose(text, |prose| {
        let prose = SINGLE_DOLLAR_BLOCK.replace_all(prose, |caps: &Captures<'_>| {
            save(&mut store, &caps[1], true)
        });
        let prose = DOUBLE_DOLLAR_BLOCK.replace_all(&prose, |caps: &Captures<'_>| {
            save(&mut store, &caps[1], true)
        });
        extract_inline(&prose, &mut store)
    });

    (result, store)
}

fn save(store: &mut PlaceholderStore<MathFragment>, content: &str, display: bool) -> String {
    let token = store.insert(MathFragment {
        content: content.trim().to_string(),
        display,
    });

    if display {
        format!("\n{token}\n")
    } else {
        token
    }
}

/// Extracts inline formulas not adjacent to another `$`.
fn extract_inline(text: &str, store: &mut PlaceholderStore<MathFragment>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(caps) = INLINE.captures_at(text, search) {
        let Some(whole) = caps.get(0) else { break };

        let touches_dollar =
            text[..whole.start()].ends_with('$') || text[whole.end()..].starts_with('$');
        if touches_dollar {
            search = whole.start() + 1;
            continue;
        }

        result.push_str(&text[copied..whole.start()]);
        result.push_str(&save(store, &caps[1], false));
        copied = whole.end();
        search = whole.end();
    }

    result.push_str(&text[copied..]);
    result
}

/// Writes formulas back using MathJax delimiters.
///
/// Display formulas become `<div class="math-block">\[...\]</div>`,
/// inline formulas `\(...\)`.
pub fn restore(html: &str, store: &PlaceholderStore<MathFragment>) -> String {
    let mut html = html.to_string();

    for (token, fragment) in store.iter() {
        let content = escape_text(&fragment.content);
        html = if fragment.display {
            replace_block(
                &html,
                token,
                &format!("<div class=\"math-block\">\\[{content}\\]</div>"),
            )
        } else {
            html.replace(token, &format!("\\({content}\\)"))
        };
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(store: &PlaceholderStore<MathFragment>) -> Vec<MathFragment> {
        store.iter().map(|(_, f)| f.clone()).collect()
    }

    #[test]
    fn test_extract_inline() {
        // Arrange
        let text = "Energy $E = mc^2$ here";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert_eq!(result, "Energy XMTH0XMTH here");
        assert_eq!(
            fragments(&store),
            vec![MathFragment {
                content: "E = mc^2".to_string(),
                display: false
            }]
        );
    }

    #[test]
    fn test_extract_double_dollar_block() {
        // Arrange
        let text = "before\n\n$$\n\\sum_i x_i\n$$\n\nafter";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert!(result.contains("\nXMTH0XMTH\n"), "Got: {result}");
        assert!(!result.contains('$'));
        let f = &fragments(&store)[0];
        assert_eq!(f.content, "\\sum_i x_i");
        assert!(f.display);
    }

    #[test]
    fn test_extract_single_dollar_block() {
        // Arrange
        let text = "$\na_1 + b_2\n$\n";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert_eq!(store.len(), 1);
        assert!(!result.contains('$'), "Got: {result}");
        let f = &fragments(&store)[0];
        assert_eq!(f.content, "a_1 + b_2");
        assert!(f.display);
    }

    #[test]
    fn test_inline_rejects_newline() {
        // Arrange
        let text = "costs $5\nand $6";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert!(store.is_empty());
        assert_eq!(result, text);
    }

    #[test]
    fn test_inline_rejects_adjacent_dollar() {
        // Arrange
        let text = "a $b$$ c";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert!(store.is_empty(), "Adjacent $ must block inline match");
        assert_eq!(result, text);
    }

    #[test]
    fn test_code_is_not_extracted() {
        // Arrange
        let text = "shell `echo $HOME$` and\n```\n$x$\n```\n";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert!(store.is_empty());
        assert_eq!(result, text);
    }

    #[test]
    fn test_multiple_inline_in_order() {
        // Arrange
        let text = "$a$ and $b$";

        // Act
        let (result, store) = extract(text);

        // Assert
        assert_eq!(result, "XMTH0XMTH and XMTH1XMTH");
        let contents: Vec<String> = fragments(&store).into_iter().map(|f| f.content).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_round_trip_inline() {
        // Arrange
        let (text, store) = extract("see $x^2 + y_1$ now");

        // Act
        let html = restore(&format!("<p>{text}</p>"), &store);

        // Assert
        assert_eq!(html, "<p>see \\(x^2 + y_1\\) now</p>");
    }

    #[test]
    fn test_round_trip_block_unwraps_paragraph() {
        // Arrange
        let (_, store) = extract("$$\\int_0^1 f$$");
        let (token, _) = store.iter().next().expect("One fragment");

        // Act
        let html = restore(&format!("<p>{token}</p>"), &store);

        // Assert
        assert_eq!(html, "<div class=\"math-block\">\\[\\int_0^1 f\\]</div>");
    }

    #[test]
    fn test_restore_escapes_markup() {
        // Arrange
        let (text, store) = extract("$a < b$");

        // Act
        let html = restore(&text, &store);

        // Assert
        assert_eq!(html, "\\(a &lt; b\\)");
    }
}
