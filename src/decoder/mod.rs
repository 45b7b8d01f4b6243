//! Stream decoder.
//!
//! Reads one tag octet, then the value body the tag dictates, recursing for
//! composites. All per-call state (cursor, intern tables, statistics)
//! lives on the [`Decoder`], so separate calls can run in parallel without
//! coordination.
//!
//! The decoder is deliberately hard to kill: unknown tags go through
//! tag-level recovery, truncated bodies are read as far as the buffer
//! allows, and oversized collection counts collapse to empty collections.
//! Only exhaustion inside a fixed-width body and varint overflows abort the
//! structured parse; the API layer then hands the raw octets to the
//! content extractor.
//!
//! # Beispiel
//!
//! ```
//! use losfmt::{decode, Value};
//!
//! // 0xFF 0x01 0x67 - framed boolean true
//! let out = decode("/wFn").unwrap();
//! assert_eq!(out.value, Value::Bool(true));
//! ```

mod api;
mod recover;

pub use api::{decode, decode_octets, decode_with_options, Decoded};

use crate::cursor::ByteCursor;
use crate::extract;
use crate::intern::InternTables;
use crate::options::DecodeOptions;
use crate::stats::DecodeStats;
use crate::token;
use crate::unit::UnitKind;
use crate::value::{OpaqueBlob, Value};
use crate::varint;
use crate::vstring;
use crate::Result;

/// Nesting bound. Each level consumes at least one input octet, so without
/// the bound a long run of Pair tags would exhaust the thread stack.
const MAX_DEPTH: usize = 512;

/// One decode call's worth of parser state.
pub struct Decoder<'a> {
    cursor: ByteCursor<'a>,
    interns: InternTables,
    stats: DecodeStats,
    options: DecodeOptions,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over raw (Base64-decoded) octets.
    ///
    /// Die Intern-Tabellen beginnen leer: sie sind pro Stream definiert und
    /// werden nie zwischen Aufrufen wiederverwendet.
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            interns: InternTables::new(),
            stats: DecodeStats::default(),
            options,
            depth: 0,
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Reads one value, recursing through composites.
    pub fn read_value(&mut self) -> Result<Value> {
        let tag_offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        if self.depth >= MAX_DEPTH {
            log::warn!("nesting depth {MAX_DEPTH} exceeded at offset {tag_offset}");
            return Ok(Value::Unknown { tag, offset: tag_offset });
        }
        self.depth += 1;
        let result = self.read_body(tag, tag_offset);
        self.depth -= 1;
        result
    }

    fn read_body(&mut self, tag: u8, tag_offset: usize) -> Result<Value> {
        match tag {
            token::INT16 => {
                self.stats.integers += 1;
                let b = self.cursor.read_array::<2>()?;
                Ok(Value::Int16(i16::from_le_bytes(b)))
            }
            token::INT32 => {
                self.stats.integers += 1;
                let n = varint::read(&mut self.cursor)?;
                Ok(Value::Int32(n as i64))
            }
            token::BYTE => {
                self.stats.integers += 1;
                Ok(Value::Byte(self.cursor.read_u8()?))
            }
            token::CHAR => Ok(Value::Char(char::from(self.cursor.read_u8()?))),
            token::STRING => {
                self.stats.strings += 1;
                Ok(Value::Text(vstring::read(&mut self.cursor)?))
            }
            token::DATETIME => {
                let b = self.cursor.read_array::<8>()?;
                Ok(Value::DateTime { raw: u64::from_le_bytes(b) })
            }
            token::DOUBLE => {
                let b = self.cursor.read_array::<8>()?;
                Ok(Value::Float64(f64::from_le_bytes(b)))
            }
            token::SINGLE => {
                let b = self.cursor.read_array::<4>()?;
                Ok(Value::Float32(f32::from_le_bytes(b)))
            }
            token::COLOR => {
                let packed = varint::read(&mut self.cursor)?;
                Ok(Value::Color(packed as u32))
            }
            token::EMPTY | token::CONST_NULL => Ok(Value::Null),
            token::TRUE | token::CONST_TRUE => {
                self.stats.booleans += 1;
                Ok(Value::Bool(true))
            }
            token::FALSE | token::CONST_FALSE => {
                self.stats.booleans += 1;
                Ok(Value::Bool(false))
            }
            token::PAIR => {
                self.stats.pairs += 1;
                let first = self.read_value()?;
                let second = self.read_value()?;
                Ok(Value::Pair(Box::new(first), Box::new(second)))
            }
            token::TRIPLET => {
                self.stats.triplets += 1;
                let first = self.read_value()?;
                let second = self.read_value()?;
                let third = self.read_value()?;
                Ok(Value::Triplet(Box::new(first), Box::new(second), Box::new(third)))
            }
            token::ARRAY | token::STRING_ARRAY | token::ARRAY_LIST => self.read_list(),
            token::HASHTABLE | token::HYBRID_DICT => self.read_map(),
            token::TYPE_REF => {
                let name = vstring::read(&mut self.cursor)?;
                self.interns.push_type(&name);
                Ok(Value::TypeRef(name))
            }
            token::UNIT => {
                let b = self.cursor.read_array::<8>()?;
                let kind = varint::read(&mut self.cursor)?;
                Ok(Value::Unit {
                    value: f64::from_le_bytes(b),
                    kind: UnitKind::from_wire(kind),
                })
            }
            token::INTERNED_STRING => {
                self.stats.strings += 1;
                let s = vstring::read(&mut self.cursor)?;
                self.interns.push_string(&s);
                Ok(Value::Text(s))
            }
            token::STRING_REF => {
                self.stats.strings += 1;
                let index = varint::read(&mut self.cursor)?;
                Ok(Value::Text(self.interns.string_or_sentinel(index)))
            }
            token::SPARSE_ARRAY => self.read_sparse(),
            token::BINARY_SERIALIZED | token::BINARY_SERIALIZED_ALT => self.read_opaque(),
            token::TYPED_ARRAY => self.read_typed_array(),
            token::KNOWN_TYPE_REF => {
                let index = varint::read(&mut self.cursor)?;
                Ok(Value::TypeRef(self.interns.type_or_sentinel(index)))
            }
            token::CONST_EMPTY_STRING => {
                self.stats.strings += 1;
                Ok(Value::Text(String::new()))
            }
            token::CONST_ZERO => {
                self.stats.integers += 1;
                Ok(Value::Int32(0))
            }
            other => Ok(recover::unknown_tag(self, other, tag_offset)),
        }
    }

    /// Collection count with the defensive clamp. `None` means the declared
    /// count was oversized: the caller yields an empty collection without
    /// walking the claimed elements.
    fn read_count(&mut self) -> Result<Option<usize>> {
        let declared = varint::read(&mut self.cursor)?;
        if declared > self.options.max_elements as u64 {
            log::warn!(
                "collection count {declared} exceeds limit {}, yielding empty collection",
                self.options.max_elements
            );
            return Ok(None);
        }
        Ok(Some(declared as usize))
    }

    fn read_list(&mut self) -> Result<Value> {
        self.stats.arrays += 1;
        let Some(count) = self.read_count()? else {
            return Ok(Value::List(Vec::new()));
        };
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(Value::List(items))
    }

    fn read_map(&mut self) -> Result<Value> {
        let Some(count) = self.read_count()? else {
            return Ok(Value::Map(Vec::new()));
        };
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.read_value()?.key_string();
            let value = self.read_value()?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    /// Sparse array: declared length, entry count, then (index, value)
    /// entries. Materialized dense with Null holes.
    fn read_sparse(&mut self) -> Result<Value> {
        self.stats.arrays += 1;
        let Some(len) = self.read_count()? else {
            return Ok(Value::List(Vec::new()));
        };
        let Some(count) = self.read_count()? else {
            return Ok(Value::List(Vec::new()));
        };
        let mut items = vec![Value::Null; len];
        for _ in 0..count {
            let index = varint::read(&mut self.cursor)?;
            let value = self.read_value()?;
            if let Ok(i) = usize::try_from(index) {
                if i < items.len() {
                    items[i] = value;
                }
                // Out-of-range-Eintraege werden konsumiert und verworfen.
            }
        }
        Ok(Value::List(items))
    }

    fn read_typed_array(&mut self) -> Result<Value> {
        self.stats.arrays += 1;
        let type_index = varint::read(&mut self.cursor)?;
        let element_type = self.interns.type_or_sentinel(type_index);
        let Some(count) = self.read_count()? else {
            return Ok(Value::TypedArray { element_type, items: Vec::new() });
        };
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(Value::TypedArray { element_type, items })
    }

    /// Nested BinaryFormatter blob: length-prefixed octets, kept raw plus a
    /// structured extract.
    fn read_opaque(&mut self) -> Result<Value> {
        self.stats.opaque_objects += 1;
        let declared = varint::read(&mut self.cursor)?;
        let take = usize::try_from(declared)
            .unwrap_or(usize::MAX)
            .min(self.cursor.remaining());
        let bytes = self.cursor.read_n(take).to_vec();
        let extract = extract::scan_blob(&bytes, &self.options);
        Ok(Value::Opaque(OpaqueBlob { declared_len: declared, bytes, extract }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    fn parse(body: &[u8]) -> (Value, DecodeStats) {
        let mut framed = vec![header::MARKER, header::VERSION];
        framed.extend_from_slice(body);
        let mut dec = Decoder::new(&framed, DecodeOptions::default());
        header::read(&mut dec.cursor);
        let v = dec.read_value().expect("body parses");
        (v, dec.stats())
    }

    #[test]
    fn scalars() {
        assert_eq!(parse(&[0x03, 0x2A]).0, Value::Byte(42));
        assert_eq!(parse(&[0x02, 0xAC, 0x02]).0, Value::Int32(300));
        assert_eq!(parse(&[0x01, 0xFF, 0xFF]).0, Value::Int16(-1));
        assert_eq!(parse(&[0x04, 0x41]).0, Value::Char('A'));
        assert_eq!(parse(&[0x0B]).0, Value::Bool(true));
        assert_eq!(parse(&[0x0C]).0, Value::Bool(false));
        assert_eq!(parse(&[0x0A]).0, Value::Null);
        assert_eq!(parse(&[0x66]).0, Value::Int32(0));
        assert_eq!(parse(&[0x65]).0, Value::Text(String::new()));
    }

    #[test]
    fn int16_is_sign_extended() {
        // 0x8000 -> -32768
        assert_eq!(parse(&[0x01, 0x00, 0x80]).0, Value::Int16(i16::MIN));
    }

    #[test]
    fn floats_little_endian() {
        let mut body = vec![0x07];
        body.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(parse(&body).0, Value::Float64(1.5));

        let mut body = vec![0x08];
        body.extend_from_slice(&0.25f32.to_le_bytes());
        assert_eq!(parse(&body).0, Value::Float32(0.25));
    }

    #[test]
    fn pair_and_triplet() {
        let (v, stats) = parse(&[0x0F, 0x03, 0x01, 0x64]);
        assert_eq!(
            v,
            Value::Pair(Box::new(Value::Byte(1)), Box::new(Value::Null))
        );
        assert_eq!(stats.pairs, 1);

        let (v, stats) = parse(&[0x10, 0x64, 0x67, 0x68]);
        assert_eq!(
            v,
            Value::Triplet(
                Box::new(Value::Null),
                Box::new(Value::Bool(true)),
                Box::new(Value::Bool(false))
            )
        );
        assert_eq!(stats.triplets, 1);
        assert_eq!(stats.booleans, 2);
    }

    #[test]
    fn map_preserves_wire_order() {
        // {"a": 7, "b": 9}
        let body = [
            0x17, 0x02, 0x05, 0x01, b'a', 0x03, 0x07, 0x05, 0x01, b'b', 0x03, 0x09,
        ];
        let (v, _) = parse(&body);
        assert_eq!(
            v,
            Value::Map(vec![
                ("a".to_string(), Value::Byte(7)),
                ("b".to_string(), Value::Byte(9)),
            ])
        );
    }

    #[test]
    fn sparse_array_materializes_dense() {
        let body = [0x28, 0x05, 0x02, 0x01, 0x03, 0x2A, 0x03, 0x03, 0x2B];
        let (v, stats) = parse(&body);
        assert_eq!(
            v,
            Value::List(vec![
                Value::Null,
                Value::Byte(42),
                Value::Null,
                Value::Byte(43),
                Value::Null,
            ])
        );
        assert_eq!(stats.arrays, 1);
    }

    #[test]
    fn sparse_out_of_range_entry_is_dropped() {
        // len 2, ein Eintrag bei Index 9
        let body = [0x28, 0x02, 0x01, 0x09, 0x03, 0x2A];
        let (v, _) = parse(&body);
        assert_eq!(v, Value::List(vec![Value::Null, Value::Null]));
    }

    #[test]
    fn interned_strings_resolve_by_index() {
        // Ref vor dem Write ist unaufloesbar; nach dem Write zeigt
        // derselbe Index auf den internierten String.
        let body = [
            0x14, 0x03, //
            0x1F, 0x00, // noch nichts interniert -> Sentinel
            0x1E, 0x04, b'T', b'e', b'x', b't', //
            0x1F, 0x00, // jetzt aufloesbar
        ];
        let (v, stats) = parse(&body);
        assert_eq!(
            v,
            Value::List(vec![
                Value::Text("<StringRef:0>".to_string()),
                Value::Text("Text".to_string()),
                Value::Text("Text".to_string()),
            ])
        );
        assert_eq!(stats.strings, 3);
    }

    #[test]
    fn type_table_resolves_known_refs() {
        // TypeRef-Write, dann Aufloesung per Index, dann out-of-range
        let body = [
            0x14, 0x03, //
            0x19, 0x03, b'I', b'n', b't', //
            0x3C, 0x00, //
            0x3C, 0x07, //
        ];
        let (v, _) = parse(&body);
        assert_eq!(
            v,
            Value::List(vec![
                Value::TypeRef("Int".to_string()),
                Value::TypeRef("Int".to_string()),
                Value::TypeRef("<TypeRef:7>".to_string()),
            ])
        );
    }

    #[test]
    fn typed_array_carries_element_type() {
        let body = [
            0x14, 0x02, //
            0x19, 0x03, b'I', b'n', b't', //
            0x32, 0x00, 0x02, 0x03, 0x01, 0x03, 0x02, //
        ];
        let (v, stats) = parse(&body);
        let Value::List(items) = v else { panic!("list") };
        assert_eq!(
            items[1],
            Value::TypedArray {
                element_type: "Int".to_string(),
                items: vec![Value::Byte(1), Value::Byte(2)],
            }
        );
        assert_eq!(stats.arrays, 2);
    }

    #[test]
    fn oversized_count_yields_empty_list() {
        // count 10001 als Varint: 0x91 0x4E
        let body = [0x14, 0x91, 0x4E, 0x03, 0x07];
        let mut framed = vec![0xFF, 0x01];
        framed.extend_from_slice(&body);
        let mut dec = Decoder::new(&framed, DecodeOptions::default());
        header::read(&mut dec.cursor);
        assert_eq!(dec.read_value().unwrap(), Value::List(Vec::new()));
        // Cursor steht direkt hinter dem Count-Varint.
        assert_eq!(dec.cursor.position(), 2 + 3);
    }

    #[test]
    fn oversized_sparse_length_yields_empty_list() {
        let body = [0x28, 0x91, 0x4E, 0x01];
        let (v, _) = parse(&body);
        assert_eq!(v, Value::List(Vec::new()));
    }

    #[test]
    fn opaque_blob_keeps_octets() {
        let inner = b"\x00System.Data.DataTable\x00rest";
        let mut body = vec![0x29];
        body.push(inner.len() as u8);
        body.extend_from_slice(inner);
        let (v, stats) = parse(&body);
        let Value::Opaque(blob) = v else { panic!("opaque") };
        assert_eq!(blob.declared_len, inner.len() as u64);
        assert_eq!(blob.bytes, inner);
        assert_eq!(blob.extract.object_type.as_deref(), Some("DataTable"));
        assert_eq!(stats.opaque_objects, 1);
    }

    #[test]
    fn opaque_truncated_keeps_available_prefix() {
        // declared 100, nur 3 Oktette vorhanden
        let body = [0x2A, 0x64, b'a', b'b', b'c'];
        let (v, _) = parse(&body);
        let Value::Opaque(blob) = v else { panic!("opaque") };
        assert_eq!(blob.declared_len, 100);
        assert_eq!(blob.bytes, b"abc");
    }

    #[test]
    fn unknown_tag_yields_unknown_value() {
        let (v, _) = parse(&[0x77]);
        assert_eq!(v, Value::Unknown { tag: 0x77, offset: 2 });
    }

    #[test]
    fn unknown_tag_with_plausible_string_recovers_text() {
        // 0x0D ist kein Tag; als Laengen-Praefix gelesen ergibt es einen
        // 13-Oktett-String aus druckbarem ASCII.
        let mut body = vec![0x0D];
        body.extend_from_slice(b"PagedControl1");
        let (v, stats) = parse(&body);
        assert_eq!(v, Value::Text("PagedControl1".to_string()));
        assert_eq!(stats.strings, 1);
    }

    #[test]
    fn truncated_fixed_body_aborts() {
        // DateTime mit nur 3 Oktetten Body
        let framed = [0xFF, 0x01, 0x06, 0x01, 0x02, 0x03];
        let mut dec = Decoder::new(&framed, DecodeOptions::default());
        header::read(&mut dec.cursor);
        assert!(dec.read_value().is_err());
    }

    #[test]
    fn deep_nesting_is_bounded() {
        // 4000 Pair-Tags hintereinander: der Tiefen-Guard greift, bevor der
        // Thread-Stack leidet. Ob der Parse danach Ok oder Err liefert,
        // haengt vom Restpuffer ab - beides ist zulaessig.
        let mut data = vec![0xFF, 0x01];
        data.extend(std::iter::repeat(0x0F).take(4000));
        data.extend_from_slice(&[0x64, 0x64]);
        let mut dec = Decoder::new(&data, DecodeOptions::default());
        header::read(&mut dec.cursor);
        let _ = dec.read_value();
    }

    #[test]
    fn datetime_and_color_and_unit() {
        let mut body = vec![0x06];
        body.extend_from_slice(&630_822_816_000_000_000u64.to_le_bytes());
        assert_eq!(
            parse(&body).0,
            Value::DateTime { raw: 630_822_816_000_000_000 }
        );

        // Packed ARGB 0xFF336699 als Varint
        let mut w = crate::cursor::ByteWriter::new();
        varint::write(&mut w, 0xFF33_6699);
        let mut body = vec![0x09];
        body.extend_from_slice(&w.into_vec());
        assert_eq!(parse(&body).0, Value::Color(0xFF33_6699));

        let mut body = vec![0x1B];
        body.extend_from_slice(&50.0f64.to_le_bytes());
        body.push(0x03);
        assert_eq!(
            parse(&body).0,
            Value::Unit { value: 50.0, kind: UnitKind::Percentage }
        );
    }
}
