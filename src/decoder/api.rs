//! Public decode entry points.
//!
//! `decode` takes the Base64 text a page embeds, `decode_octets` the raw
//! octet buffer. Structured parsing is attempted first; when it aborts, the
//! raw octets go to the content extractor and the decode still succeeds
//! (with a note) as long as anything readable was found.

use crate::error::{Error, Result};
use crate::extract;
use crate::header;
use crate::options::DecodeOptions;
use crate::sanitize;
use crate::stats::DecodeStats;
use crate::value::Value;

use super::Decoder;

/// A successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The decoded tree (or the extractor's content map).
    pub value: Value,
    /// Value-kind tallies from the structured parse.
    pub stats: DecodeStats,
    /// Octet count of the Base64-decoded input.
    pub raw_size: usize,
    /// Set when the structured parse failed and the content extractor
    /// produced the value instead.
    pub note: Option<String>,
}

/// Decodes a Base64 ViewState string with default options.
pub fn decode(text: &str) -> Result<Decoded> {
    decode_with_options(text, &DecodeOptions::default())
}

/// Decodes a Base64 ViewState string.
pub fn decode_with_options(text: &str, options: &DecodeOptions) -> Result<Decoded> {
    let bytes = sanitize::decode_input(text, options.url_decode)?;
    decode_octets(&bytes, options)
}

/// Decodes an already Base64-decoded octet buffer.
pub fn decode_octets(bytes: &[u8], options: &DecodeOptions) -> Result<Decoded> {
    if bytes.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut dec = Decoder::new(bytes, *options);
    header::read(&mut dec.cursor);
    match dec.read_value() {
        Ok(value) => Ok(Decoded {
            value,
            stats: dec.stats(),
            raw_size: bytes.len(),
            note: None,
        }),
        Err(err) if err.triggers_fallback() => {
            log::debug!("structured parse aborted: {err}");
            // Retry ab Offset 0 ohne Framing-Erkennung, Fehler geschluckt.
            // Ein nackter Unknown-Marker traegt nichts bei und zaehlt nicht
            // als geborgene Struktur.
            let structure = Decoder::new(bytes, *options)
                .read_value()
                .ok()
                .filter(|v| !matches!(v, Value::Unknown { .. }));
            match extract::fallback(bytes, options, structure) {
                Some(value) => Ok(Decoded {
                    value,
                    stats: dec.stats(),
                    raw_size: bytes.len(),
                    note: Some(format!(
                        "structured parse failed ({err}); showing content recovered by scanning the stream"
                    )),
                }),
                None => Err(Error::Unparseable),
            }
        }
        Err(err) => Err(err),
    }
}
