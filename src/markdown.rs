//! Markdown preview rendering.
//!
//! Comrak does the generic conversion; the passes in this module add math,
//! diagram fences, abbreviations, task lists, strikethrough, heading
//! anchors and bare URL links around it.

mod abbreviations;
mod autolink;
mod diagrams;
mod document;
mod fragments;
mod links;
mod math;
mod placeholder;
mod preprocess;
mod renderer;
mod tasklist;
mod toc;

pub use abbreviations::Abbreviations;
pub use document::MATHJAX_SRC;
pub use links::base_url;
pub use math::MathFragment;
pub use renderer::{MarkdownRenderer, RenderOptions};
