//! losfmt – LosFormatter/ObjectStateFormatter ViewState codec
//!
//! A bidirectional codec for the binary wire format of the .NET
//! `LosFormatter`/`ObjectStateFormatter` serializers, the format ASP.NET
//! pages round-trip in the `__VIEWSTATE` hidden field. Decoding yields a
//! typed [`Value`] tree plus statistics; encoding turns a tree back into a
//! framed, Base64-encoded stream.
//!
//! The decoder is built for hostile input: unknown tags recover in-band,
//! truncated bodies are read as far as the buffer allows, oversized
//! collection counts collapse to empty collections, and a stream the
//! structured parser cannot handle at all is scanned for readable content
//! (XML schemas, .NET type names, printable strings) instead of failing.
//!
//! # Beispiel
//!
//! ```
//! use losfmt::{decode, encode, Value};
//!
//! // 0xFF 0x01 0x67 - framed boolean true
//! let decoded = decode("/wFn").unwrap();
//! assert_eq!(decoded.value, Value::Bool(true));
//!
//! // Encode -> Decode Round-Trip
//! let tree = Value::Pair(
//!     Box::new(Value::Text("__EVENTTARGET".into())),
//!     Box::new(Value::Null),
//! );
//! let encoded = encode(&tree).unwrap();
//! let back = decode(&encoded.encoded).unwrap();
//! assert_eq!(back.value, tree);
//! ```
//!
//! MAC validation, decryption and the deflate variant are out of scope: the
//! codec reads the serialized payload, it does not authenticate it.

pub mod color;
pub mod cursor;
pub mod datetime;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod header;
pub mod intern;
pub mod json;
pub mod options;
pub mod sanitize;
pub mod stats;
pub mod token;
pub mod unit;
pub mod value;
pub mod varint;
pub mod vstring;

pub use error::{Error, Result};

/// IndexSet mit ahash (Einfuege-Reihenfolge + schnelles Hashing) fuer die
/// Dedupe-Pfade des Extraktors.
pub(crate) type FastIndexSet<T> = indexmap::IndexSet<T, ahash::RandomState>;

// Public API: Decoder/Encoder
pub use decoder::{decode, decode_octets, decode_with_options, Decoded, Decoder};
pub use encoder::{encode, encode_json_text, Encoded};

// Public API: Types
pub use extract::{OpaqueExtract, SchemaColumn, SchemaExtract};
pub use options::DecodeOptions;
pub use stats::DecodeStats;
pub use unit::UnitKind;
pub use value::{OpaqueBlob, Value};

// Public API: JSON surface
pub use json::JsonValidation;
