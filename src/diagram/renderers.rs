//! Renderers backed by the PlantUML server and Kroki.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;

use super::{DiagramError, DiagramKind, DiagramRenderer, kroki, plantuml};

const USER_AGENT: &str = "MarkForge";

/// Base URLs of the rendering services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramServers {
    pub plantuml: String,
    pub kroki: String,
}

impl Default for DiagramServers {
    fn default() -> Self {
        Self {
            plantuml: plantuml::DEFAULT_SERVER.to_string(),
            kroki: kroki::DEFAULT_SERVER.to_string(),
        }
    }
}

impl DiagramServers {
    /// Image URL for a diagram along with its MIME type.
    ///
    /// PlantUML is requested as SVG, Mermaid as PNG through Kroki.
    fn image_url(
        &self,
        kind: DiagramKind,
        source: &str,
    ) -> Result<(String, &'static str), DiagramError> {
        Ok(match kind {
            DiagramKind::PlantUml => (
                plantuml::svg_url(&self.plantuml, source)?,
                "image/svg+xml",
            ),
            DiagramKind::Mermaid => (kroki::mermaid_png_url(&self.kroki, source)?, "image/png"),
        })
    }
}

/// Points `<img>` tags straight at the rendering services.
///
/// Never touches the network; the viewer fetches the images.
#[derive(Debug, Clone, Default)]
pub struct LinkRenderer {
    servers: DiagramServers,
}

impl LinkRenderer {
    pub fn new(servers: DiagramServers) -> Self {
        Self { servers }
    }
}

impl DiagramRenderer for LinkRenderer {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        self.servers.image_url(kind, source).map(|(url, _)| url)
    }
}

/// Downloads rendered diagrams and inlines them as `data:` URIs.
///
/// Inlining keeps the document self-contained, so viewers that block
/// remote images from local pages still show diagrams. Requests block the
/// calling thread for at most the configured timeout.
#[derive(Debug, Clone)]
pub struct FetchRenderer {
    client: reqwest::blocking::Client,
    servers: DiagramServers,
    plantuml_timeout: Duration,
    mermaid_timeout: Duration,
}

impl FetchRenderer {
    /// Default timeout for PlantUML SVG requests.
    pub const PLANTUML_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default timeout for Mermaid PNG requests.
    pub const MERMAID_TIMEOUT: Duration = Duration::from_secs(8);

    /// Creates renderer with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be initialised
    pub fn new(servers: DiagramServers) -> Result<Self, DiagramError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(DiagramError::Client)?;

        Ok(Self {
            client,
            servers,
            plantuml_timeout: Self::PLANTUML_TIMEOUT,
            mermaid_timeout: Self::MERMAID_TIMEOUT,
        })
    }

    /// Uses one timeout for every diagram kind.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.plantuml_timeout = timeout;
        self.mermaid_timeout = timeout;
        self
    }

    fn timeout(&self, kind: DiagramKind) -> Duration {
        match kind {
            DiagramKind::PlantUml => self.plantuml_timeout,
            DiagramKind::Mermaid => self.mermaid_timeout,
        }
    }
}

impl DiagramRenderer for FetchRenderer {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        let (url, mime) = self.servers.image_url(kind, source)?;

        tracing::debug!(%kind, %url, "Fetching diagram");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout(kind))
            .send()
            .map_err(|source| DiagramError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiagramError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| DiagramError::Transport {
            url: url.clone(),
            source,
        })?;

        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&body)))
    }
}
