//! Markdown preview rendering and document outlines.

mod assets;
mod config;
pub mod diagram;
mod fence;
mod highlight;
pub mod markdown;
pub mod outline;
mod util;
pub mod watch;

pub use assets::PreviewTheme;
pub use config::{Command, Config, DiagramMode, RenderArgs};
pub use diagram::{DiagramError, DiagramKind, DiagramRenderer};
pub use highlight::{CodeHighlighter, DEFAULT_CODE_THEME};
pub use markdown::{MarkdownRenderer, RenderOptions};
pub use outline::{Heading, OutlineNode, build_tree, parse_headings};
