//! JSON embedding of the value tree.
//!
//! The editor surface works on JSON text: scalars map to their JSON
//! counterparts, List to an array, Map to an object, and everything JSON
//! cannot express natively (Pair, Triplet, TypeRef, TypedArray, Opaque,
//! Unknown) becomes an object with a `"type"` discriminator. An Opaque
//! blob additionally carries its raw octets Base64-encoded under `"data"`,
//! so an untouched blob survives the editor round trip octet-identical.

use serde_json::{json, Map as JsonMap, Value as Json};

use crate::datetime;
use crate::color;
use crate::extract;
use crate::options::DecodeOptions;
use crate::sanitize;
use crate::unit;
use crate::value::{OpaqueBlob, Value};
use crate::{Error, Result};

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// Renders a value tree as a `serde_json::Value`.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Byte(n) => json!(n),
        Value::Int16(n) => json!(n),
        Value::Int32(n) => json!(n),
        Value::Float32(f) => float_json(f64::from(*f)),
        Value::Float64(f) => float_json(*f),
        Value::Char(c) => json!(c.to_string()),
        Value::Text(s) => json!(s),
        Value::DateTime { raw } => json!(datetime::display(*raw)),
        Value::Color(argb) => json!(color::rgba_string(*argb)),
        Value::Unit { value, kind } => json!(unit::display(*value, *kind)),
        Value::Pair(first, second) => json!({
            "type": "Pair",
            "first": to_json(first),
            "second": to_json(second),
        }),
        Value::Triplet(first, second, third) => json!({
            "type": "Triplet",
            "first": to_json(first),
            "second": to_json(second),
            "third": to_json(third),
        }),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut map = JsonMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), to_json(value));
            }
            Json::Object(map)
        }
        Value::TypeRef(name) => json!({ "type": "TypeRef", "name": name }),
        Value::TypedArray { element_type, items } => json!({
            "type": "TypedArray",
            "elementType": element_type,
            "items": items.iter().map(to_json).collect::<Vec<_>>(),
        }),
        Value::Opaque(blob) => opaque_json(blob),
        Value::Unknown { tag, offset } => json!({
            "type": "Unknown",
            "tag": tag,
            "offset": offset,
        }),
    }
}

/// Compact JSON text of a value tree.
pub fn to_json_string(value: &Value) -> String {
    to_json(value).to_string()
}

/// Pretty-printed JSON text of a value tree.
pub fn to_json_string_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(&to_json(value)).unwrap_or_else(|_| "null".to_string())
}

/// Parses editor JSON into a value tree.
pub fn parse(text: &str) -> Result<Value> {
    let json: Json = serde_json::from_str(text).map_err(bad_json)?;
    Ok(from_json(&json))
}

/// Pretty-prints JSON text without interpreting it as a value tree.
pub fn format(text: &str) -> Result<String> {
    let json: Json = serde_json::from_str(text).map_err(bad_json)?;
    serde_json::to_string_pretty(&json).map_err(bad_json)
}

/// Syntax check with the error position serde_json derives from the byte
/// offset of the failure.
pub fn validate(text: &str) -> JsonValidation {
    match serde_json::from_str::<Json>(text) {
        Ok(_) => JsonValidation {
            valid: true,
            error: None,
            line: None,
            column: None,
        },
        Err(e) => JsonValidation {
            valid: false,
            error: Some(e.to_string()),
            line: Some(e.line()),
            column: Some(e.column()),
        },
    }
}

fn bad_json(e: serde_json::Error) -> Error {
    Error::BadJson {
        message: e.to_string(),
        line: e.line(),
        column: e.column(),
    }
}

/// NaN und Unendlichkeiten sind in JSON nicht darstellbar: null.
fn float_json(f: f64) -> Json {
    serde_json::Number::from_f64(f).map_or(Json::Null, Json::Number)
}

fn opaque_json(blob: &OpaqueBlob) -> Json {
    let mut map = JsonMap::new();
    map.insert("type".into(), json!("Opaque"));
    map.insert("length".into(), json!(blob.declared_len));
    map.insert("data".into(), json!(sanitize::to_base64(&blob.bytes)));
    if let Some(object_type) = &blob.extract.object_type {
        map.insert("objectType".into(), json!(object_type));
    }
    if let Some(schema) = &blob.extract.schema {
        map.insert(
            "schema".into(),
            schema_json(schema),
        );
    }
    map.insert("hasDiffgram".into(), json!(blob.extract.has_diffgram));
    map.insert("strings".into(), json!(&blob.extract.strings));
    Json::Object(map)
}

fn schema_json(schema: &extract::SchemaExtract) -> Json {
    let mut map = JsonMap::new();
    map.insert("type".into(), json!("DataTable Schema"));
    if let Some(name) = &schema.table_name {
        map.insert("tableName".into(), json!(name));
    }
    map.insert(
        "columns".into(),
        Json::Array(
            schema
                .columns
                .iter()
                .map(|c| json!({ "name": &c.name, "type": &c.ty }))
                .collect(),
        ),
    );
    map.insert("hasDiffgram".into(), json!(schema.has_diffgram));
    Json::Object(map)
}

/// JSON → value tree. Objects with a recognized `"type"` discriminator and
/// the matching fields become typed nodes; everything else stays a Map.
fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int32(i)
            } else {
                Value::Float64(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(from_json).collect()),
        Json::Object(map) => from_object(map),
    }
}

fn from_object(map: &JsonMap<String, Json>) -> Value {
    match map.get("type").and_then(Json::as_str) {
        Some("Pair") => {
            if let (Some(first), Some(second)) = (map.get("first"), map.get("second")) {
                return Value::Pair(
                    Box::new(from_json(first)),
                    Box::new(from_json(second)),
                );
            }
        }
        Some("Triplet") => {
            if let (Some(first), Some(second), Some(third)) =
                (map.get("first"), map.get("second"), map.get("third"))
            {
                return Value::Triplet(
                    Box::new(from_json(first)),
                    Box::new(from_json(second)),
                    Box::new(from_json(third)),
                );
            }
        }
        Some("TypeRef") => {
            if let Some(name) = map.get("name").and_then(Json::as_str) {
                return Value::TypeRef(name.to_string());
            }
        }
        Some("TypedArray") => {
            if let Some(items) = map.get("items").and_then(Json::as_array) {
                return Value::TypedArray {
                    element_type: map
                        .get("elementType")
                        .and_then(Json::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    items: items.iter().map(from_json).collect(),
                };
            }
        }
        Some("Opaque") => return opaque_from_object(map),
        Some("Unknown") => {
            if let Some(tag) = map.get("tag").and_then(Json::as_u64) {
                return Value::Unknown {
                    tag: tag as u8,
                    offset: map
                        .get("offset")
                        .and_then(Json::as_u64)
                        .and_then(|o| usize::try_from(o).ok())
                        .unwrap_or(0),
                };
            }
        }
        _ => {}
    }
    // Kein (vollstaendiger) Diskriminator: gewoehnliches Objekt.
    Value::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), from_json(v)))
            .collect(),
    )
}

fn opaque_from_object(map: &JsonMap<String, Json>) -> Value {
    let bytes = map
        .get("data")
        .and_then(Json::as_str)
        .and_then(|b64| {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.decode(b64).ok()
        })
        .unwrap_or_default();
    let declared_len = map
        .get("length")
        .and_then(Json::as_u64)
        .unwrap_or(bytes.len() as u64);
    // Der Extract wird aus den Oktetten neu abgeleitet statt dem Editor
    // zu vertrauen.
    let extract = extract::scan_blob(&bytes, &DecodeOptions::default());
    Value::Opaque(OpaqueBlob { declared_len, bytes, extract })
}
