//! Diagram fence extraction and image restoration.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::placeholder::{PlaceholderStore, replace_block};
use crate::diagram::{DiagramKind, DiagramRenderer};
use crate::util::escape_html;

/// Whole fenced block tagged `plantuml` or `mermaid`, delimiters on their
/// own lines.
static DIAGRAM_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?msi)^```[ \t]*(plantuml|mermaid)[ \t]*\n(.*?)\n```[ \t]*$").unwrap()
});

/// Raw diagram source captured from a fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramFence {
    pub kind: DiagramKind,
    pub source: String,
}

/// Replaces diagram fences with placeholder tokens.
///
/// Runs before any other pass so diagram syntax (arrows, braces, `$`)
/// reaches the renderer exactly as written.
pub fn extract(text: &str) -> (String, PlaceholderStore<DiagramFence>) {
    let mut store = PlaceholderStore::new("DGM", text);

    let result = DIAGRAM_FENCE.replace_all(text, |caps: &Captures<'_>| {
        match DiagramKind::from_fence_tag(&caps[1]) {
            Some(kind) => {
                let token = store.insert(DiagramFence {
                    kind,
                    source: caps[2].to_string(),
                });
                format!("\n{token}\n")
            }
            None => caps[0].to_string(),
        }
    });

    (result.into_owned(), store)
}

/// Replaces diagram tokens with images in centered containers.
///
/// Without a renderer, or when rendering fails, the container holds a
/// short notice instead. Failures are logged and never abort the render.
pub fn restore(
    html: &str,
    store: &PlaceholderStore<DiagramFence>,
    renderer: Option<&dyn DiagramRenderer>,
) -> String {
    let mut html = html.to_string();

    for (token, fence) in store.iter() {
        let image = renderer.and_then(|renderer| {
            renderer
                .render(fence.kind, &fence.source)
                .inspect_err(|err| {
                    tracing::warn!(kind = %fence.kind, error = %err, "Diagram rendering failed");
                })
                .ok()
        });

        let replacement = match image {
            Some(src) => format!(
                "<div class=\"{}\"><img src=\"{}\" alt=\"{} diagram\"></div>",
                fence.kind.css_class(),
                escape_html(&src),
                fence.kind.label()
            ),
            None => format!(
                "<div class=\"{}\"><em>{} diagram unavailable</em></div>",
                fence.kind.css_class(),
                fence.kind.label()
            ),
        };

        html = replace_block(&html, token, &replacement);
    }

    html
}
