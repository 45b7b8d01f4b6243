//! Length-prefixed string encoding.
//!
//! A string on the wire is a 7-bit encoded octet count followed by that many
//! UTF-8 octets. Zero length yields the empty string.
//!
//! Decoding is deliberately forgiving: a declared length larger than the
//! remaining buffer consumes only the available prefix, and octet sequences
//! that are not valid UTF-8 fall back to a per-octet Latin-1 reading so the
//! bytes stay visible instead of vanishing into replacement characters.

use crate::cursor::{ByteCursor, ByteWriter};
use crate::varint;
use crate::Result;

/// Encodes a string as varint octet count plus UTF-8 octets.
pub fn write(writer: &mut ByteWriter, value: &str) {
    varint::write(writer, value.len() as u64);
    writer.extend(value.as_bytes());
}

/// Decodes a length-prefixed string from the stream.
pub fn read(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let declared = varint::read(cursor)?;
    Ok(read_body(cursor, declared))
}

/// Liest den String-Body nach bereits gelesenem Laengen-Praefix.
/// Klemmt auf `remaining`; nie ein Fehler.
pub(crate) fn read_body(cursor: &mut ByteCursor<'_>, declared: u64) -> String {
    let take = usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(cursor.remaining());
    decode_octets(cursor.read_n(take))
}

/// UTF-8 mit Latin-1-Fallback pro Oktett.
pub(crate) fn decode_octets(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &str) -> String {
        let mut w = ByteWriter::new();
        write(&mut w, value);
        let data = w.into_vec();
        let mut c = ByteCursor::new(&data);
        let out = read(&mut c).unwrap();
        assert!(c.is_exhausted());
        out
    }

    #[test]
    fn empty_string() {
        assert_eq!(round_trip(""), "");
        let mut w = ByteWriter::new();
        write(&mut w, "");
        assert_eq!(w.into_vec(), vec![0x00]);
    }

    #[test]
    fn ascii_round_trip() {
        assert_eq!(round_trip("__VIEWSTATE"), "__VIEWSTATE");
    }

    #[test]
    fn length_prefix_counts_octets_not_chars() {
        // 'ä' ist 1 Zeichen, 2 UTF-8-Oktette
        let mut w = ByteWriter::new();
        write(&mut w, "ä");
        let data = w.into_vec();
        assert_eq!(data[0], 2);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn unicode_round_trip() {
        for s in ["grün", "データ", "a\u{10348}b", "🙂"] {
            assert_eq!(round_trip(s), s, "round-trip failed for {s}");
        }
    }

    #[test]
    fn truncated_body_decodes_available_prefix() {
        // declared 10, aber nur 3 Oktette vorhanden
        let data = [0x0A, b'a', b'b', b'c'];
        let mut c = ByteCursor::new(&data);
        assert_eq!(read(&mut c).unwrap(), "abc");
        assert!(c.is_exhausted());
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // 0xE9 allein ist kein gueltiges UTF-8; Latin-1: 'é'
        let data = [0x02, 0xE9, 0x21];
        let mut c = ByteCursor::new(&data);
        assert_eq!(read(&mut c).unwrap(), "é!");
    }

    #[test]
    fn huge_declared_length_is_clamped() {
        // Laengen-Praefix 2^28: darf weder allozieren noch ueberlaufen
        let data = [0x80, 0x80, 0x80, 0x80, 0x01, b'x'];
        let mut c = ByteCursor::new(&data);
        assert_eq!(read(&mut c).unwrap(), "x");
        assert!(c.is_exhausted());
    }

    #[test]
    fn written_octet_count_is_varint_plus_utf8() {
        for s in ["", "a", "hello", "grün", "🙂"] {
            let mut w = ByteWriter::new();
            write(&mut w, s);
            let expected = varint::encoded_len(s.len() as u64) + s.len();
            assert_eq!(w.into_vec().len(), expected, "for {s:?}");
        }
    }
}
