//! Syntax highlighting of fenced code blocks with syntect.

use anyhow::{Context, Result, anyhow};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::util::{escape_html, html_decode};

/// Theme used for code blocks when none is configured.
pub const DEFAULT_CODE_THEME: &str = "base16-ocean.dark";

/// Prefix of the CSS classes emitted for highlighted tokens.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const CODE_OPEN: &str = "<code class=\"language-";
const CODE_CLOSE: &str = "</code>";

/// Highlights code blocks in rendered HTML using CSS classes.
///
/// Token colours come from a separate stylesheet generated for the
/// selected syntect theme, see [`CodeHighlighter::stylesheet`].
pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl CodeHighlighter {
    /// Creates a highlighter for the named syntect theme.
    ///
    /// # Errors
    ///
    /// Returns error if the theme is not one of the bundled themes
    pub fn new(theme: impl Into<String>) -> Result<Self> {
        let theme = theme.into();
        let theme_set = ThemeSet::load_defaults();

        if !theme_set.themes.contains_key(&theme) {
            let mut known: Vec<&str> = theme_set.themes.keys().map(String::as_str).collect();
            known.sort_unstable();
            return Err(anyhow!(
                "Unknown code theme '{}' (available: {})",
                theme,
                known.join(", ")
            ));
        }

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme,
        })
    }

    /// Names of the bundled code themes, sorted.
    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
        names.sort_unstable();
        names
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Generates the CSS rules for the token classes of the current theme.
    ///
    /// # Errors
    ///
    /// Returns error if syntect cannot convert the theme to CSS
    pub fn stylesheet(&self) -> Result<String> {
        let theme = self
            .theme_set
            .themes
            .get(&self.theme)
            .with_context(|| format!("Code theme '{}' not loaded", self.theme))?;

        css_for_theme_with_class_style(theme, CLASS_STYLE)
            .with_context(|| format!("Failed to generate CSS for code theme '{}'", self.theme))
    }

    /// Replaces the contents of `<code class="language-X">` blocks with
    /// highlighted markup.
    ///
    /// Comrak escapes code text, so it is decoded before highlighting.
    /// Blocks without a language class are left untouched.
    ///
    /// # Arguments
    ///
    /// * `html`: HTML produced by comrak
    ///
    /// # Returns
    ///
    /// HTML with `<span class="hl-*">` tokens inside code blocks
    ///
    /// # Errors
    ///
    /// Returns error if a line cannot be parsed by the syntax definition
    pub fn highlight_code_blocks(&self, html: &str) -> Result<String> {
        let mut result = String::with_capacity(html.len());
        let mut last_end = 0;
        let mut search_pos = 0;

        while let Some(found) = html[search_pos..].find(CODE_OPEN) {
            let code_start = search_pos + found;
            let lang_start = code_start + CODE_OPEN.len();

            let Some(lang_len) = html[lang_start..].find('"') else {
                search_pos = code_start + 1;
                continue;
            };
            let lang_end = lang_start + lang_len;
            let language = &html[lang_start..lang_end];

            let Some(tag_len) = html[lang_end..].find('>') else {
                search_pos = code_start + 1;
                continue;
            };
            let content_start = lang_end + tag_len + 1;

            let Some(content_len) = html[content_start..].find(CODE_CLOSE) else {
                search_pos = code_start + 1;
                continue;
            };
            let content_end = content_start + content_len;

            let code = html_decode(&html[content_start..content_end]);
            let highlighted = self
                .highlight_code(&code, language)
                .with_context(|| format!("Failed to highlight {language} code block"))?;

            result.push_str(&html[last_end..content_start]);
            result.push_str(&highlighted);
            result.push_str(CODE_CLOSE);

            last_end = content_end + CODE_CLOSE.len();
            search_pos = last_end;
        }

        result.push_str(&html[last_end..]);
        Ok(result)
    }

    /// Highlights a snippet. Unknown languages fall back to escaped text.
    ///
    /// # Errors
    ///
    /// Returns error if syntect fails to parse a line
    pub fn highlight_code(&self, code: &str, language: &str) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            tracing::debug!(language, "No syntax definition, leaving code plain");
            return Ok(escape_html(code));
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(generator.finalize())
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme: DEFAULT_CODE_THEME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_rejected() {
        // Arrange & Act
        let result = CodeHighlighter::new("no-such-theme");

        // Assert
        let err = result.err().expect("Unknown theme should fail");
        assert!(err.to_string().contains("no-such-theme"));
    }

    #[test]
    fn test_default_theme_is_available() {
        assert!(CodeHighlighter::available_themes().contains(&DEFAULT_CODE_THEME.to_string()));
    }

    #[test]
    fn test_highlight_rust_block() {
        // Arrange
        let highlighter = CodeHighlighter::default();
        let html = "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>";

        // Act
        let result = highlighter
            .highlight_code_blocks(html)
            .expect("Should highlight");

        // Assert
        assert!(result.starts_with("<pre><code class=\"language-rust\">"));
        assert!(result.contains("<span class=\"hl-"), "Got: {result}");
        assert!(result.ends_with("</code></pre>"));
    }

    #[test]
    fn test_escaped_code_is_decoded_once() {
        // Arrange
        let highlighter = CodeHighlighter::default();
        let html = "<pre><code class=\"language-unknownlang\">a &lt; b &amp;&amp; c</code></pre>";

        // Act
        let result = highlighter
            .highlight_code_blocks(html)
            .expect("Should highlight");

        // Assert
        assert_eq!(
            result,
            "<pre><code class=\"language-unknownlang\">a &lt; b &amp;&amp; c</code></pre>"
        );
    }

    #[test]
    fn test_plain_code_untouched() {
        // Arrange
        let highlighter = CodeHighlighter::default();
        let html = "<pre><code>plain</code></pre><p><code>inline</code></p>";

        // Act
        let result = highlighter
            .highlight_code_blocks(html)
            .expect("Should pass through");

        // Assert
        assert_eq!(result, html);
    }

    #[test]
    fn test_stylesheet_uses_class_prefix() {
        // Arrange
        let highlighter = CodeHighlighter::new("InspiredGitHub").expect("Bundled theme");

        // Act
        let css = highlighter.stylesheet().expect("Should generate CSS");

        // Assert
        assert!(css.contains(".hl-"), "Got: {css}");
    }

    #[test]
    fn test_empty_block() {
        let highlighter = CodeHighlighter::default();
        assert_eq!(highlighter.highlight_code("", "rust").unwrap(), "");
    }
}
