//! Utility functions for markforge

/// Escapes HTML special characters.
///
/// Used for attribute values and for plain text that bypasses the
/// markdown processor.
///
/// # Arguments
///
/// * `text`: Plain text to escape
///
/// # Returns
///
/// HTML safe string
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escapes only the characters that would break element content.
///
/// Quotes are left alone so TeX source stays readable to MathJax.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Decodes HTML entities in code block content.
///
/// Comrak escapes special characters in code blocks. This function
/// reverses those escapes before passing to syntect.
///
/// # Arguments
///
/// * `html`: HTML encoded string
///
/// # Returns
///
/// Decoded string with actual characters
pub fn html_decode(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
