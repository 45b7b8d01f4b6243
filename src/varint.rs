//! Variable-length 7-bit unsigned integer encoding.
//!
//! The format LosFormatter inherits from `BinaryWriter.Write7BitEncodedInt`:
//! each octet carries 7 data bits in its low half and a continuation flag in
//! the MSB; the least significant group is written first.
//!
//! The reader accepts at most 5 octets (shift >= 35 is an overflow). On
//! exhaustion it returns the partial accumulation instead of failing, so
//! that tag-level recovery can keep walking a truncated stream.

use crate::cursor::{ByteCursor, ByteWriter};
use crate::{Error, Result};

/// Largest number of octets a well-formed value may occupy.
pub const MAX_OCTETS: usize = 5;

/// Encodes a nonnegative integer as a 7-bit variable-length sequence.
#[inline]
pub fn write(writer: &mut ByteWriter, value: u64) {
    let mut v = value;
    while v >= 0x80 {
        writer.push((v & 0x7F) as u8 | 0x80);
        v >>= 7;
    }
    writer.push(v as u8);
}

/// Number of octets [`write`] will emit for `value`.
pub fn encoded_len(value: u64) -> usize {
    let mut v = value;
    let mut n = 1;
    while v >= 0x80 {
        v >>= 7;
        n += 1;
    }
    n
}

/// Decodes a 7-bit variable-length integer from the stream.
///
/// Stoppt beim ersten Oktett ohne Continuation-Bit. Laeuft der Puffer
/// vorher aus, wird die partielle Akkumulation zurueckgegeben (lenient).
/// Ein sechstes Oktett waere shift 35, also Overflow.
#[inline]
pub fn read(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    let start = cursor.position();
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(byte) = cursor.peek_u8() else {
            // Exhaustion: partial result, damit Recovery weiterlaufen kann.
            return Ok(result);
        };
        if shift >= 35 {
            return Err(Error::VarintOverflow { offset: start });
        }
        cursor.read_u8()?;
        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u64) -> u64 {
        let mut w = ByteWriter::new();
        write(&mut w, value);
        let data = w.into_vec();
        let mut c = ByteCursor::new(&data);
        let out = read(&mut c).unwrap();
        assert!(c.is_exhausted(), "reader must consume exactly the written octets");
        out
    }

    #[test]
    fn encode_decode_0() {
        assert_eq!(round_trip(0), 0);
    }

    #[test]
    fn encode_decode_127() {
        assert_eq!(round_trip(127), 127);
        let mut w = ByteWriter::new();
        write(&mut w, 127);
        assert_eq!(w.into_vec(), vec![0x7F]);
    }

    #[test]
    fn encode_decode_128() {
        assert_eq!(round_trip(128), 128);
        let mut w = ByteWriter::new();
        write(&mut w, 128);
        // low7=0 mit Continuation, dann 1 ohne
        assert_eq!(w.into_vec(), vec![0x80, 0x01]);
    }

    #[test]
    fn encode_decode_16383() {
        assert_eq!(round_trip(16383), 16383);
        let mut w = ByteWriter::new();
        write(&mut w, 16383);
        assert_eq!(w.into_vec(), vec![0xFF, 0x7F]);
    }

    // 300 = 0b10_0101100: the classic two-octet example AC 02
    #[test]
    fn value_300_is_ac_02() {
        let mut w = ByteWriter::new();
        write(&mut w, 300);
        assert_eq!(w.into_vec(), vec![0xAC, 0x02]);
    }

    #[test]
    fn round_trip_diverse_values() {
        for &val in &[
            0u64,
            1,
            2,
            63,
            64,
            127,
            128,
            255,
            256,
            16383,
            16384,
            1_000_000,
            u64::from(u32::MAX),
            (1 << 35) - 1,
        ] {
            assert_eq!(round_trip(val), val, "round-trip failed for {val}");
        }
    }

    #[test]
    fn encoded_len_matches_writer() {
        for &val in &[0u64, 1, 127, 128, 16383, 16384, 1 << 21, (1 << 35) - 1] {
            let mut w = ByteWriter::new();
            write(&mut w, val);
            assert_eq!(w.into_vec().len(), encoded_len(val), "for {val}");
        }
    }

    #[test]
    fn five_octets_is_the_limit() {
        // (1 << 35) - 1 belegt genau 5 Oktette.
        assert_eq!(encoded_len((1 << 35) - 1), 5);
        assert_eq!(encoded_len(1 << 35), 6);
    }

    #[test]
    fn sixth_octet_overflows() {
        let data = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut c = ByteCursor::new(&data);
        assert_eq!(
            read(&mut c).unwrap_err(),
            Error::VarintOverflow { offset: 0 }
        );
    }

    #[test]
    fn exhaustion_returns_partial() {
        // Continuation-Bit gesetzt, aber keine weiteren Oktette:
        // partielle Akkumulation statt Fehler.
        let data = [0x85];
        let mut c = ByteCursor::new(&data);
        assert_eq!(read(&mut c).unwrap(), 5);

        let mut c = ByteCursor::new(&[]);
        assert_eq!(read(&mut c).unwrap(), 0);
    }

    #[test]
    fn multi_octet_partial_on_truncation() {
        // 300 = AC 02; nur das erste Oktett vorhanden
        let data = [0xAC];
        let mut c = ByteCursor::new(&data);
        assert_eq!(read(&mut c).unwrap(), 0x2C);
    }
}
