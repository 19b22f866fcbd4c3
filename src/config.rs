//! Command line configuration.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assets::PreviewTheme;
use crate::diagram::{
    CachedRenderer, DiagramRenderer, DiagramServers, FetchRenderer, LinkRenderer, kroki, plantuml,
};
use crate::highlight::{CodeHighlighter, DEFAULT_CODE_THEME};
use crate::markdown::RenderOptions;

/// Command line configuration for MarkForge.
#[derive(Debug, Clone, Parser)]
#[command(name = "markforge", version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Action to perform.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a markdown file to a standalone HTML document
    Render {
        /// Markdown file
        file: PathBuf,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory relative links resolve against, defaults to the file's directory
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Print the heading outline of a markdown file
    Outline {
        /// Markdown file
        file: PathBuf,

        /// Indent headings by nesting instead of by level
        #[arg(long)]
        tree: bool,
    },

    /// Re-render a markdown file whenever it changes
    Watch {
        /// Markdown file
        file: PathBuf,

        /// Output file, defaults to the input with an .html extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quiet period before re-rendering, in milliseconds
        #[arg(long, default_value_t = 300)]
        debounce_ms: u64,
    },
}

/// How diagram fences are turned into images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DiagramMode {
    /// Show a notice instead of the diagram
    Off,
    /// Reference the rendering servers from `<img>` tags
    #[default]
    Link,
    /// Download diagrams and embed them in the document
    Fetch,
}

/// Rendering flags shared by all subcommands.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Preview colour scheme
    #[arg(long, global = true, value_enum, default_value_t = PreviewTheme::GithubDark)]
    pub theme: PreviewTheme,

    /// Syntax highlighting theme for code blocks (InspiredGitHub, Solarized (dark), etc.)
    #[arg(long, global = true, default_value = DEFAULT_CODE_THEME)]
    pub code_theme: String,

    /// Diagram rendering mode
    #[arg(long, global = true, value_enum, default_value_t = DiagramMode::Link)]
    pub diagrams: DiagramMode,

    /// PlantUML server base URL
    #[arg(long, global = true, default_value = plantuml::DEFAULT_SERVER)]
    pub plantuml_server: String,

    /// Kroki server base URL
    #[arg(long, global = true, default_value = kroki::DEFAULT_SERVER)]
    pub kroki_server: String,

    /// Timeout for each diagram download, overriding the per-kind defaults
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Title of the generated table of contents
    #[arg(long, global = true, default_value = "Contents")]
    pub toc_title: String,

    /// Typographic quotes and dashes
    #[arg(long, global = true)]
    pub smart: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist, a server URL is not
    /// HTTP(S), the timeout is zero or the code theme is unknown.
    pub fn validate(&self) -> Result<()> {
        let file = self.input();
        if !file.is_file() {
            bail!("Markdown file does not exist: {}", file.display());
        }

        for (name, url) in [
            ("PlantUML", &self.render.plantuml_server),
            ("Kroki", &self.render.kroki_server),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{} server must be an http(s) URL: {}", name, url);
            }
        }

        if self.render.timeout_secs == Some(0) {
            bail!("Timeout must be at least one second");
        }

        if !CodeHighlighter::available_themes().contains(&self.render.code_theme) {
            bail!(
                "Unknown code theme '{}' (available: {})",
                self.render.code_theme,
                CodeHighlighter::available_themes().join(", ")
            );
        }

        Ok(())
    }

    /// Markdown file the command operates on.
    pub fn input(&self) -> &Path {
        match &self.command {
            Command::Render { file, .. }
            | Command::Outline { file, .. }
            | Command::Watch { file, .. } => file,
        }
    }
}

impl RenderArgs {
    /// Presentation settings for the renderer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            theme: self.theme,
            code_theme: self.code_theme.clone(),
            toc_title: self.toc_title.clone(),
            smart_punctuation: self.smart,
        }
    }

    /// Service base URLs without trailing slashes.
    pub fn servers(&self) -> DiagramServers {
        DiagramServers {
            plantuml: self.plantuml_server.trim_end_matches('/').to_string(),
            kroki: self.kroki_server.trim_end_matches('/').to_string(),
        }
    }

    /// Builds the diagram renderer for the selected mode.
    ///
    /// Downloads are cached for the lifetime of the returned renderer.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn diagram_renderer(&self) -> Result<Option<Box<dyn DiagramRenderer>>> {
        Ok(match self.diagrams {
            DiagramMode::Off => None,
            DiagramMode::Link => Some(Box::new(LinkRenderer::new(self.servers()))),
            DiagramMode::Fetch => {
                let mut fetch =
                    FetchRenderer::new(self.servers()).context("Failed to create HTTP client")?;
                if let Some(secs) = self.timeout_secs {
                    fetch = fetch.with_timeout(Duration::from_secs(secs));
                }
                Some(Box::new(CachedRenderer::new(fetch)))
            }
        })
    }
}
