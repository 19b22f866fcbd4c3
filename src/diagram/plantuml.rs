//! PlantUML text encoding for server URLs.
//!
//! The server expects the diagram source compressed with raw DEFLATE (no
//! zlib header) and written in a 6-bit alphabet that differs from base64.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

/// Public PlantUML server.
pub const DEFAULT_SERVER: &str = "https://www.plantuml.com/plantuml";

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Encodes diagram source for use in a server URL.
///
/// # Errors
///
/// Returns error if compression fails
pub fn encode(text: &str) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(encode_bytes(&compressed))
}

/// Applies the 6-bit alphabet to raw bytes.
///
/// Each 3-byte group becomes 4 characters. A trailing 2-byte group
/// yields 3 characters and a trailing single byte 2 characters.
fn encode_bytes(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);

        let quad = [
            b1 >> 2,
            ((b1 & 0x3) << 4) | (b2 >> 4),
            ((b2 & 0xF) << 2) | (b3 >> 6),
            b3 & 0x3F,
        ];
        let keep = chunk.len() + 1;

        for index in &quad[..keep] {
            result.push(ALPHABET[usize::from(*index & 0x3F)] as char);
        }
    }

    result
}

/// Returns the server URL rendering the diagram as SVG.
///
/// # Errors
///
/// Returns error if compression fails
pub fn svg_url(server: &str, text: &str) -> std::io::Result<String> {
    Ok(format!("{}/svg/{}", server.trim_end_matches('/'), encode(text)?))
}

/// Returns the server URL rendering the diagram as PNG.
///
/// # Errors
///
/// Returns error if compression fails
pub fn png_url(server: &str, text: &str) -> std::io::Result<String> {
    Ok(format!("{}/png/{}", server.trim_end_matches('/'), encode(text)?))
}
