//! Tag-level recovery.
//!
//! Streams produced by third-party serializers occasionally embed strings
//! without a string tag. When the dispatcher hits an octet outside the tag
//! table, it steps back one octet and speculatively reads a varint-length-
//! prefixed string from there: if that yields non-empty printable ASCII,
//! the octet was a length prefix and the string is kept. Otherwise the
//! speculation is rolled back to just past the tag and an in-band
//! `Unknown` marker records the position; the parse continues either way.

use crate::cursor::ByteCursor;
use crate::value::Value;
use crate::varint;

use super::Decoder;

/// Handles a tag octet outside the table. Never fails.
pub(super) fn unknown_tag(dec: &mut Decoder<'_>, tag: u8, tag_offset: usize) -> Value {
    log::debug!("unknown tag {tag:#04x} at offset {tag_offset}, trying string recovery");

    let after_tag = dec.cursor.checkpoint();
    dec.cursor.rewind_one();
    if let Some(s) = plausible_string(&mut dec.cursor) {
        dec.stats.strings += 1;
        return Value::Text(s);
    }

    // Spekulation verwerfen: weiter direkt hinter dem Tag-Oktett.
    dec.cursor.restore(after_tag);
    Value::Unknown { tag, offset: tag_offset }
}

/// Reads a varint length plus body and accepts it only as non-empty
/// printable ASCII. The read clamps to the remaining buffer.
fn plausible_string(cursor: &mut ByteCursor<'_>) -> Option<String> {
    let declared = varint::read(cursor).ok()?;
    if declared == 0 {
        return None;
    }
    let take = usize::try_from(declared).ok()?.min(cursor.remaining());
    let bytes = cursor.read_n(take);
    if bytes.is_empty() || !bytes.iter().all(|&b| (0x20..=0x7E).contains(&b)) {
        return None;
    }
    // Druckbares ASCII ist immer gueltiges UTF-8.
    Some(String::from_utf8_lossy(bytes).into_owned())
}
