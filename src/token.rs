//! Tag octets of the LosFormatter/ObjectStateFormatter wire format.
//!
//! Every serialized value starts with one of these tags; the body layout is
//! decided by the tag alone (the format is self-describing). The constants
//! mirror the token table of .NET's `ObjectStateFormatter`.

/// Int16, two octets little-endian.
pub const INT16: u8 = 0x01;
/// Int32 as 7-bit varint.
pub const INT32: u8 = 0x02;
/// A single octet.
pub const BYTE: u8 = 0x03;
/// One octet interpreted as a code point.
pub const CHAR: u8 = 0x04;
/// Length-prefixed UTF-8 string.
pub const STRING: u8 = 0x05;
/// 8 octets little-endian .NET ticks.
pub const DATETIME: u8 = 0x06;
/// 8 octets little-endian IEEE-754.
pub const DOUBLE: u8 = 0x07;
/// 4 octets little-endian IEEE-754.
pub const SINGLE: u8 = 0x08;
/// Packed ARGB as varint.
pub const COLOR: u8 = 0x09;
/// Empty value, no body.
pub const EMPTY: u8 = 0x0A;
/// Boolean true, no body.
pub const TRUE: u8 = 0x0B;
/// Boolean false, no body.
pub const FALSE: u8 = 0x0C;
/// Two values.
pub const PAIR: u8 = 0x0F;
/// Three values.
pub const TRIPLET: u8 = 0x10;
/// Varint count, then N values.
pub const ARRAY: u8 = 0x14;
/// String-typed array; same body as [`ARRAY`].
pub const STRING_ARRAY: u8 = 0x15;
/// ArrayList; same body as [`ARRAY`].
pub const ARRAY_LIST: u8 = 0x16;
/// Hashtable: varint count, then N (key value, value) pairs.
pub const HASHTABLE: u8 = 0x17;
/// HybridDictionary; same body as [`HASHTABLE`].
pub const HYBRID_DICT: u8 = 0x18;
/// Length-prefixed type name; appends to the type table.
pub const TYPE_REF: u8 = 0x19;
/// Float64 body plus varint unit kind.
pub const UNIT: u8 = 0x1B;
/// Length-prefixed string; appends to the string table.
pub const INTERNED_STRING: u8 = 0x1E;
/// Varint index into the string table.
pub const STRING_REF: u8 = 0x1F;
/// Varint length, varint count, then N (varint index, value) entries.
pub const SPARSE_ARRAY: u8 = 0x28;
/// Varint length, then that many octets of a nested BinaryFormatter stream.
pub const BINARY_SERIALIZED: u8 = 0x29;
/// Alias of [`BINARY_SERIALIZED`].
pub const BINARY_SERIALIZED_ALT: u8 = 0x2A;
/// Varint type-table index, varint length, then N values.
pub const TYPED_ARRAY: u8 = 0x32;
/// Varint index into the type table.
pub const KNOWN_TYPE_REF: u8 = 0x3C;
/// Null constant, no body.
pub const CONST_NULL: u8 = 0x64;
/// Empty-string constant, no body.
pub const CONST_EMPTY_STRING: u8 = 0x65;
/// Int32 zero constant, no body.
pub const CONST_ZERO: u8 = 0x66;
/// Boolean true constant alias.
pub const CONST_TRUE: u8 = 0x67;
/// Boolean false constant alias.
pub const CONST_FALSE: u8 = 0x68;

/// Human-readable tag name for diagnostics. `None` for unassigned tags.
pub fn name(tag: u8) -> Option<&'static str> {
    Some(match tag {
        INT16 => "Int16",
        INT32 => "Int32",
        BYTE => "Byte",
        CHAR => "Char",
        STRING => "String",
        DATETIME => "DateTime",
        DOUBLE => "Double",
        SINGLE => "Single",
        COLOR => "Color",
        EMPTY => "Empty",
        TRUE => "True",
        FALSE => "False",
        PAIR => "Pair",
        TRIPLET => "Triplet",
        ARRAY => "Array",
        STRING_ARRAY => "StringArray",
        ARRAY_LIST => "ArrayList",
        HASHTABLE => "Hashtable",
        HYBRID_DICT => "HybridDictionary",
        TYPE_REF => "TypeRef",
        UNIT => "Unit",
        INTERNED_STRING => "InternedString",
        STRING_REF => "StringRef",
        SPARSE_ARRAY => "SparseArray",
        BINARY_SERIALIZED | BINARY_SERIALIZED_ALT => "BinarySerialized",
        TYPED_ARRAY => "TypedArray",
        KNOWN_TYPE_REF => "KnownTypeRef",
        CONST_NULL => "Null",
        CONST_EMPTY_STRING => "EmptyString",
        CONST_ZERO => "Zero",
        CONST_TRUE => "True",
        CONST_FALSE => "False",
        _ => return None,
    })
}
