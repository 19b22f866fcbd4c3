//! Standalone HTML document around a rendered body.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// MathJax 3 with CommonHTML output.
pub const MATHJAX_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";

/// MathJax configuration matching the delimiters written by the math pass.
const MATHJAX_CONFIG: &str = r"MathJax = {
  tex: { inlineMath: [['\\(', '\\)']], displayMath: [['\\[', '\\]']] },
  options: { skipHtmlTags: ['script', 'noscript', 'style', 'textarea', 'pre', 'code'] }
};";

/// Wraps a body fragment in the preview page.
///
/// # Arguments
///
/// * `title`: Document title text
/// * `base_href`: URL relative links resolve against
/// * `stylesheet`: CSS placed in a single inline `<style>` element
/// * `body`: Rendered body HTML, inserted unescaped
pub fn wrap(title: &str, base_href: &str, stylesheet: &str, body: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                base href=(base_href);
                style { (PreEscaped(stylesheet)) }
                script { (PreEscaped(MATHJAX_CONFIG)) }
                script async src=(MATHJAX_SRC) {}
            }
            body {
                article class="markdown-body" {
                    (PreEscaped(body))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        // Arrange & Act
        let page = wrap("Notes", "file:///tmp/", "body{}", "<p>x</p>").into_string();

        // Assert
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<meta charset=\"UTF-8\">"));
        assert!(page.contains("<title>Notes</title>"));
        assert!(page.contains("<base href=\"file:///tmp/\">"));
        assert!(page.contains("<style>body{}</style>"));
        assert!(page.contains(MATHJAX_SRC));
        assert!(page.contains("<article class=\"markdown-body\"><p>x</p></article>"));
    }

    #[test]
    fn test_mathjax_config_uses_backslash_delimiters() {
        let page = wrap("t", "file:///", "", "").into_string();
        assert!(page.contains(r"inlineMath: [['\\(', '\\)']]"));
        assert!(page.contains(r"displayMath: [['\\[', '\\]']]"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = wrap("a < b", "file:///", "", "").into_string();
        assert!(page.contains("<title>a &lt; b</title>"));
    }
}
