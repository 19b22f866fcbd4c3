//! Kroki encoding for Mermaid diagrams.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Public Kroki instance.
pub const DEFAULT_SERVER: &str = "https://kroki.io";

/// Compresses with zlib and encodes as unpadded URL-safe base64.
///
/// # Errors
///
/// Returns error if compression fails
pub fn encode(text: &str) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes())?;
    Ok(URL_SAFE_NO_PAD.encode(encoder.finish()?))
}

/// Returns the Kroki URL rendering a Mermaid diagram as PNG.
///
/// # Errors
///
/// Returns error if compression fails
pub fn mermaid_png_url(server: &str, code: &str) -> std::io::Result<String> {
    Ok(format!(
        "{}/mermaid/png/{}",
        server.trim_end_matches('/'),
        encode(code)?
    ))
}
