//! Diagram rendering collaborators.
//!
//! Diagram fences are rendered by remote services: the PlantUML server
//! for `plantuml` and Kroki for `mermaid`. The pipeline only sees the
//! [`DiagramRenderer`] trait, which returns an image reference usable as
//! an `<img src>` value.

mod cache;
pub mod kroki;
pub mod plantuml;
mod renderers;

use std::fmt;
use std::sync::Arc;

pub use cache::{CachedRenderer, DiagramCache};
pub use renderers::{DiagramServers, FetchRenderer, LinkRenderer};

/// Diagram language recognised in fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    PlantUml,
    Mermaid,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 2] = [DiagramKind::PlantUml, DiagramKind::Mermaid];

    /// Fence info string selecting this kind (matched case-insensitively).
    pub fn fence_tag(&self) -> &'static str {
        match self {
            DiagramKind::PlantUml => "plantuml",
            DiagramKind::Mermaid => "mermaid",
        }
    }

    /// Parses a fence info string.
    pub fn from_fence_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.fence_tag().eq_ignore_ascii_case(tag.trim()))
    }

    /// Human readable name used in alt text and notices.
    pub fn label(&self) -> &'static str {
        match self {
            DiagramKind::PlantUml => "PlantUML",
            DiagramKind::Mermaid => "Mermaid",
        }
    }

    /// CSS class of the centered container.
    pub fn css_class(&self) -> &'static str {
        match self {
            DiagramKind::PlantUml => "plantuml-diagram",
            DiagramKind::Mermaid => "mermaid-diagram",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure to obtain a rendered diagram.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to compress diagram source: {0}")]
    Encode(#[from] std::io::Error),
}

/// Turns diagram source into an image reference.
///
/// Implementations may block on network I/O. Callers treat every error as
/// "diagram unavailable" and never abort a render because of it.
pub trait DiagramRenderer: Send + Sync {
    /// Returns an image URL (remote or `data:`) for the diagram.
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError>;
}

impl<R: DiagramRenderer + ?Sized> DiagramRenderer for Box<R> {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        (**self).render(kind, source)
    }
}

impl<R: DiagramRenderer + ?Sized> DiagramRenderer for Arc<R> {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        (**self).render(kind, source)
    }
}
