//! Input sanitizing and Base64 framing.
//!
//! ViewState strings arrive copied out of HTML attributes, HTTP captures
//! and URL query strings. Before Base64 decoding, the input is trimmed and,
//! when it carries `%` escapes, URL-decoded. A failed URL-decode keeps
//! the original text: the escapes may have been literal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Error, Result};

/// Trims, optionally URL-decodes, and Base64-decodes user input.
pub fn decode_input(text: &str, url_decode: bool) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyInput);
    }

    let candidate = if url_decode && trimmed.contains('%') {
        // '+' bleibt unangetastet: rohes Base64 enthaelt legitime '+'.
        percent_decode(trimmed).unwrap_or_else(|| trimmed.to_string())
    } else {
        trimmed.to_string()
    };

    let bytes = STANDARD
        .decode(candidate.as_bytes())
        .map_err(|e| Error::BadBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(bytes)
}

/// Base64 with the standard alphabet and `=` padding.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// `%XX` decoding. `None` on any malformed escape.
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_digit(*bytes.get(i + 1)?)?;
            let lo = hex_digit(*bytes.get(i + 2)?)?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
