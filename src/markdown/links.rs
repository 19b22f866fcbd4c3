//! Base URL for resolving relative links and images in the preview.

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::Path;

/// Bytes escaped in the path of a `file://` URL.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the `<base href>` value for a document directory.
///
/// Relative links in the rendered preview resolve against it. Without a
/// directory the current working directory is used.
///
/// # Arguments
///
/// * `dir`: Directory of the document, if known
///
/// # Returns
///
/// `file://` URL of the absolute directory, ending in `/`
///
/// # Errors
///
/// Returns error if the current working directory cannot be determined
pub fn base_url(dir: Option<&Path>) -> Result<String> {
    let dir = match dir {
        Some(dir) => std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve base directory {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    Ok(file_url(&dir.to_string_lossy()))
}

fn file_url(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    if !path.starts_with('/') {
        // Drive letter paths
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }

    format!("file://{}", utf8_percent_encode(&path, PATH))
}
