//! The decoded value tree.
//!
//! Every node the parser produces is one of these variants. Values are
//! immutable once built: the editor surface replaces whole subtrees by
//! constructing new ones, so there is no aliasing and no cycles.

use crate::color;
use crate::datetime;
use crate::extract::OpaqueExtract;
use crate::unit::{self, UnitKind};

/// A nested BinaryFormatter blob (tags 0x29/0x2A).
///
/// The inner object graph is not parsed; the raw octets are kept so
/// re-encoding can emit the identical blob, alongside a best-effort
/// structured extract of anything readable inside.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBlob {
    /// Octet count declared on the wire (may exceed `bytes.len()` when the
    /// stream was truncated).
    pub declared_len: u64,
    /// The octets actually present.
    pub bytes: Vec<u8>,
    /// Readable structure salvaged from the octets.
    pub extract: OpaqueExtract,
}

/// A value decoded from (or encodable to) the LosFormatter wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null / Empty.
    Null,
    Bool(bool),
    Byte(u8),
    /// Little-endian on the wire, sign-extended from bit 15.
    Int16(i16),
    /// Varint on the wire. Der Traeger ist i64: adversarielle Varints
    /// koennen 32 Bit ueberschreiten und sollen sichtbar bleiben.
    Int32(i64),
    Float32(f32),
    Float64(f64),
    /// One octet on the wire, read as a code point.
    Char(char),
    Text(String),
    /// Raw `DateTime.ToBinary()` value; see [`crate::datetime`].
    DateTime { raw: u64 },
    /// Packed ARGB.
    Color(u32),
    /// Magnitude plus CSS unit kind.
    Unit { value: f64, kind: UnitKind },
    Pair(Box<Value>, Box<Value>),
    Triplet(Box<Value>, Box<Value>, Box<Value>),
    /// Array, StringArray, ArrayList and materialized SparseArray bodies.
    List(Vec<Value>),
    /// Hashtable / HybridDictionary. Insertion order is the wire order;
    /// keys are stringified at decode time.
    Map(Vec<(String, Value)>),
    /// A type name (tag 0x19 write, or a resolved 0x3C reference).
    TypeRef(String),
    /// Array with an element type from the type table.
    TypedArray {
        element_type: String,
        items: Vec<Value>,
    },
    /// Nested BinaryFormatter blob.
    Opaque(OpaqueBlob),
    /// Produced only by tag-level recovery.
    Unknown { tag: u8, offset: usize },
}

impl Value {
    /// True for the absent-value sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stringification used for Hashtable keys.
    ///
    /// Skalare rendern wie in der Baumansicht; Komposita (als Key nur in
    /// manipulierten Streams) bekommen einen wohlgeformten Platzhalter.
    pub fn key_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Byte(n) => n.to_string(),
            Self::Int16(n) => n.to_string(),
            Self::Int32(n) => n.to_string(),
            Self::Float32(f) => f.to_string(),
            Self::Float64(f) => f.to_string(),
            Self::Char(c) => c.to_string(),
            Self::Text(s) => s.clone(),
            Self::DateTime { raw } => datetime::display(*raw),
            Self::Color(argb) => color::rgba_string(*argb),
            Self::Unit { value, kind } => unit::display(*value, *kind),
            Self::TypeRef(name) => name.clone(),
            Self::Pair(..) => "<Pair>".to_string(),
            Self::Triplet(..) => "<Triplet>".to_string(),
            Self::List(_) => "<Array>".to_string(),
            Self::Map(_) => "<Hashtable>".to_string(),
            Self::TypedArray { .. } => "<TypedArray>".to_string(),
            Self::Opaque(_) => "<Opaque>".to_string(),
            Self::Unknown { tag, .. } => format!("<Unknown:{tag:#04x}>"),
        }
    }
}
