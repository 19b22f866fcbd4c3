//! Shared test utilities for integration tests.
//!
//! Provides helpers for writing markdown documents into temporary
//! directories and a diagram renderer that never touches the network.

#![allow(dead_code)]

use anyhow::Result;
use markforge::diagram::{DiagramError, DiagramKind, DiagramRenderer};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Image URL returned by [`FixedRenderer`].
pub const FIXED_IMAGE: &str = "https://diagrams.test/fixed.svg";

/// Writes a markdown file into a fresh temporary directory.
///
/// # Arguments
///
/// * `name`: File name inside the directory
/// * `content`: Markdown text
///
/// # Returns
///
/// Temporary directory (kept alive by the caller) and the file path
///
/// # Errors
///
/// Returns error if the directory or file cannot be created
pub fn write_markdown(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}

/// Diagram renderer returning a fixed URL and remembering its inputs.
#[derive(Default)]
pub struct FixedRenderer {
    pub calls: Mutex<Vec<(DiagramKind, String)>>,
}

impl DiagramRenderer for FixedRenderer {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((kind, source.to_string()));
        }
        Ok(FIXED_IMAGE.to_string())
    }
}

/// Diagram renderer that always fails like an unreachable server.
pub struct FailingRenderer;

impl DiagramRenderer for FailingRenderer {
    fn render(&self, _kind: DiagramKind, _source: &str) -> Result<String, DiagramError> {
        Err(DiagramError::Status {
            url: "https://diagrams.test/".to_string(),
            status: 503,
        })
    }
}
