//! Stream framing.
//!
//! `LosFormatter` prefixes its output with a marker octet 0xFF and a format
//! version octet (0x01 in every framework release). Some embedders strip
//! the prefix, so the decoder accepts both framed and bare streams: when
//! the first octet is not the marker, the cursor is reset to zero and the
//! whole buffer is parsed as a single value.

use crate::cursor::{ByteCursor, ByteWriter};

/// Marker octet opening a framed stream.
pub const MARKER: u8 = 0xFF;

/// Format version emitted by every known serializer build.
pub const VERSION: u8 = 0x01;

/// Consumes the framing if present. Returns the version octet, or `None`
/// for a bare stream (cursor back at position 0).
pub fn read(cursor: &mut ByteCursor<'_>) -> Option<u8> {
    let start = cursor.checkpoint();
    match cursor.read_u8() {
        Ok(MARKER) => {
            // Versionsoktett folgt; Wert wird nicht geprueft, nur verworfen.
            Some(cursor.read_u8_lenient())
        }
        _ => {
            cursor.restore(start);
            None
        }
    }
}

/// Writes the `0xFF 0x01` framing. The encoder always frames.
pub fn write(writer: &mut ByteWriter) {
    writer.push(MARKER);
    writer.push(VERSION);
}
