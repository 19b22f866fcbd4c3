//! Markdown to HTML preview rendering.

use anyhow::{Context, Result};
use comrak::Options;
use std::path::Path;
use tracing::debug;

use super::abbreviations::Abbreviations;
use super::{autolink, diagrams, document, links, math, preprocess, tasklist, toc};
use crate::assets::PreviewTheme;
use crate::diagram::DiagramRenderer;
use crate::highlight::{CodeHighlighter, DEFAULT_CODE_THEME};
use crate::outline;

/// Title used when the document has no heading.
const FALLBACK_TITLE: &str = "Preview";

/// Presentation settings of a [`MarkdownRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Page colour scheme
    pub theme: PreviewTheme,
    /// Syntect theme for code blocks
    pub code_theme: String,
    /// Heading of the generated table of contents, empty for none
    pub toc_title: String,
    /// Curly quotes and typographic dashes
    pub smart_punctuation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: PreviewTheme::default(),
            code_theme: DEFAULT_CODE_THEME.to_string(),
            toc_title: "Contents".to_string(),
            smart_punctuation: false,
        }
    }
}

/// Renders Markdown source to a standalone preview document.
///
/// Math, diagram fences, task lists, strikethrough and bare URLs are
/// handled by passes around comrak, in a fixed order:
///
/// 1. diagram fences and math are swapped for placeholder tokens
/// 2. abbreviation definitions are collected, strikethrough and list
///    spacing are fixed up in the source
/// 3. comrak converts the text (tables, footnotes, definition lists, raw
///    HTML), code blocks are highlighted, headings get ids and `[TOC]` is
///    expanded
/// 4. abbreviations, math and diagrams are written into the HTML, then
///    task items and bare URLs are rewritten
///
/// Comrak's own strikethrough, autolink and task list extensions stay
/// off since the surrounding passes implement them.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
    highlighter: CodeHighlighter,
    theme: PreviewTheme,
    toc_title: String,
    diagrams: Option<Box<dyn DiagramRenderer>>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates a renderer with default options and no diagram renderer.
    pub fn new() -> Self {
        let defaults = RenderOptions::default();
        Self {
            options: comrak_options(&defaults),
            highlighter: CodeHighlighter::default(),
            theme: defaults.theme,
            toc_title: defaults.toc_title,
            diagrams: None,
        }
    }

    /// Creates a renderer with the given presentation settings.
    ///
    /// # Errors
    ///
    /// Returns error if the code theme is unknown
    pub fn with_options(render_options: RenderOptions) -> Result<Self> {
        let highlighter = CodeHighlighter::new(&render_options.code_theme)
            .context("Failed to set up code highlighting")?;

        Ok(Self {
            options: comrak_options(&render_options),
            highlighter,
            theme: render_options.theme,
            toc_title: render_options.toc_title,
            diagrams: None,
        })
    }

    /// Sets the collaborator that turns diagram fences into images.
    pub fn with_diagram_renderer(mut self, renderer: impl DiagramRenderer + 'static) -> Self {
        self.diagrams = Some(Box::new(renderer));
        self
    }

    /// Sets an already boxed diagram renderer, or removes it.
    pub fn with_boxed_diagram_renderer(
        mut self,
        renderer: Option<Box<dyn DiagramRenderer>>,
    ) -> Self {
        self.diagrams = renderer;
        self
    }

    /// Renders the body fragment of the preview.
    ///
    /// # Arguments
    ///
    /// * `text`: Markdown source, may be empty
    ///
    /// # Returns
    ///
    /// HTML fragment without document boilerplate
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    pub fn render_body(&self, text: &str) -> Result<String> {
        let (text, diagram_store) = diagrams::extract(text);
        debug!(count = diagram_store.len(), "Extracted diagram fences");

        let (text, math_store) = math::extract(&text);
        debug!(count = math_store.len(), "Extracted math expressions");

        let (text, abbreviations) = Abbreviations::extract(&text);
        let text = preprocess::preprocess(&text);

        let html = comrak::markdown_to_html(&text, &self.options);
        debug!(bytes = html.len(), "Converted markdown");

        let html = self.highlighter.highlight_code_blocks(&html)?;
        let html = toc::apply(&html, &self.toc_title, |text| math_store.strip_tokens(text));
        let html = abbreviations.apply(&html);
        let html = math::restore(&html, &math_store);
        let html = diagrams::restore(&html, &diagram_store, self.diagrams.as_deref());
        let html = tasklist::apply(&html);
        let html = autolink::apply(&html);
        debug!(bytes = html.len(), "Post-processed HTML");

        Ok(html)
    }

    /// Renders a complete HTML document.
    ///
    /// # Arguments
    ///
    /// * `text`: Markdown source
    /// * `base_dir`: Directory relative links resolve against, defaults to
    ///   the current working directory
    ///
    /// # Errors
    ///
    /// Returns error if highlighting fails or the base directory cannot
    /// be resolved
    pub fn render_document(&self, text: &str, base_dir: Option<&Path>) -> Result<String> {
        let body = self.render_body(text)?;
        let base = links::base_url(base_dir)?;
        let title = outline::parse_headings(text)
            .into_iter()
            .next()
            .map(|heading| heading.title)
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let stylesheet = format!("{}\n{}", self.theme.stylesheet(), self.highlighter.stylesheet()?);

        Ok(document::wrap(&title, &base, &stylesheet, &body).into_string())
    }

    /// Reads and renders a Markdown file, resolving links next to it.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or rendering fails
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file {}", path.display()))?;
        let base_dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        self.render_document(&text, base_dir)
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn comrak_options<'a>(render_options: &RenderOptions) -> Options<'a> {
    let mut options = Options::default();

    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;
    options.extension.strikethrough = false;
    options.extension.autolink = false;
    options.extension.tasklist = false;

    options.parse.smart = render_options.smart_punctuation;

    // Trusted local documents
    options.render.unsafe_ = true;

    options
}
