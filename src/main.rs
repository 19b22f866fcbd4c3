use anyhow::{Context, Result};
use markforge::{Command, Config, MarkdownRenderer, OutlineNode, build_tree, parse_headings};
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("markforge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    match &config.command {
        Command::Render {
            file,
            output,
            base_dir,
        } => {
            let renderer = build_renderer(&config)?;
            let html = render(&renderer, file, base_dir.as_deref())?;
            match output {
                Some(output) => write_output(output, &html)?,
                None => std::io::stdout()
                    .write_all(html.as_bytes())
                    .context("Failed to write to stdout")?,
            }
        }
        Command::Outline { file, tree } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print!("{}", format_outline(&text, *tree));
        }
        Command::Watch {
            file,
            output,
            debounce_ms,
        } => {
            let renderer = build_renderer(&config)?;
            let output = output
                .clone()
                .unwrap_or_else(|| file.with_extension("html"));

            let render_once = || -> Result<()> {
                let html = render(&renderer, file, None)?;
                write_output(&output, &html)
            };

            render_once()?;
            let delay = Duration::from_millis(*debounce_ms);
            markforge::watch::watch_file(file, delay, render_once)?;
        }
    }

    Ok(())
}

fn build_renderer(config: &Config) -> Result<MarkdownRenderer<'static>> {
    let renderer = MarkdownRenderer::with_options(config.render.render_options())?;
    Ok(renderer.with_boxed_diagram_renderer(config.render.diagram_renderer()?))
}

/// Renders a file, resolving links against `base_dir` or the file's directory.
fn render(
    renderer: &MarkdownRenderer<'_>,
    file: &Path,
    base_dir: Option<&Path>,
) -> Result<String> {
    match base_dir {
        Some(dir) => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            renderer.render_document(&text, Some(dir))
        }
        None => renderer.render_file(file),
    }
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Wrote preview");
    Ok(())
}

/// One line per heading: indented by level, or by nesting with `tree`.
fn format_outline(text: &str, tree: bool) -> String {
    let headings = parse_headings(text);
    let mut out = String::new();

    if tree {
        for node in build_tree(&headings) {
            write_node(&mut out, &node, 0);
        }
    } else {
        for heading in &headings {
            let indent = "  ".repeat(usize::from(heading.depth.saturating_sub(1)));
            let _ = writeln!(out, "{indent}{} (line {})", heading.title, heading.line + 1);
        }
    }

    out
}

fn write_node(out: &mut String, node: &OutlineNode, level: usize) {
    let _ = writeln!(
        out,
        "{}- {} (line {})",
        "  ".repeat(level),
        node.item.title,
        node.item.line + 1
    );
    for child in &node.children {
        write_node(out, child, level + 1);
    }
}
