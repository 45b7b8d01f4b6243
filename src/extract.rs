//! Content extraction from unparseable streams and BinaryFormatter blobs.
//!
//! Two callers: the stream-level fallback (structured parse failed; salvage
//! whatever is readable from the raw octets) and the Opaque blob handler
//! (the nested BinaryFormatter graph is out of scope; surface its embedded
//! XML schema, type names and printable strings instead).

use std::sync::LazyLock;

use memchr::memmem;
use regex::{Regex, RegexSet};

use crate::options::DecodeOptions;
use crate::value::Value;
use crate::vstring;
use crate::FastIndexSet;

/// Minimum printable-ASCII run length worth surfacing.
const MIN_RUN: usize = 4;

/// Unterminated XML blocks are bounded at start + this many octets.
const XML_BLOCK_CAP: usize = 5000;

/// `element name="..."` with an optional `type="..."` in the same tag.
static ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"element name="([^"]+)"(?:[^>]*?type="([^"]+)")?"#).expect("static regex")
});

/// .NET type names embedded in a BinaryFormatter stream.
static DOTNET_TYPE_RE: LazyLock<regex::bytes::Regex> = LazyLock::new(|| {
    regex::bytes::Regex::new(r"System\.[A-Za-z.]+").expect("static regex")
});

/// Druckbare Laeufe, die nur Kodierungs-Rauschen sind: reine Ziffern, reines
/// Hex, A/=-Laeufe, Base64-Restzeichen und generierte Control-IDs.
static NOISE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^[0-9]+$",
        r"^[0-9a-fA-F]+$",
        r"^[A=]+$",
        r"^[+/=]+$",
        r"^ctl[0-9]+$",
        r"^ImageButton[0-9]+$",
    ])
    .expect("static regex set")
});

/// Well-known type names checked before the generic scan.
const KNOWN_TYPES: [&str; 3] = [
    "System.Data.DataTable",
    "System.Data.DataSet",
    "System.Version",
];

/// Structured extract of one BinaryFormatter blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaqueExtract {
    /// `"DataTable"` when the blob carries a serialized `DataTable`.
    pub object_type: Option<String>,
    /// Scraped XML schema, when one is embedded.
    pub schema: Option<SchemaExtract>,
    /// Whether a diffgram section is present.
    pub has_diffgram: bool,
    /// Printable-ASCII runs, deduplicated, capped.
    pub strings: Vec<String>,
}

/// Scraped shape of an embedded `xs:schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaExtract {
    /// First `element name`; by DataSet convention the table name.
    pub table_name: Option<String>,
    /// Column elements with their schema types.
    pub columns: Vec<SchemaColumn>,
    /// Whether the slice carries a diffgram.
    pub has_diffgram: bool,
}

/// One scraped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub ty: String,
}

/// Best-effort extract for one Opaque blob (tags 0x29/0x2A).
pub fn scan_blob(bytes: &[u8], opts: &DecodeOptions) -> OpaqueExtract {
    let object_type = memmem::find(bytes, b"System.Data.DataTable")
        .map(|_| "DataTable".to_string());

    let schema = find_between(bytes, b"<?xml", b"</xs:schema>")
        .map(|slice| parse_schema(&vstring::decode_octets(slice)));

    OpaqueExtract {
        object_type,
        schema,
        has_diffgram: memmem::find(bytes, b"<diffgr:diffgram").is_some(),
        strings: printable_runs(bytes, opts.max_blob_strings),
    }
}

/// Stream-level fallback: salvage readable content from the raw octets.
///
/// `structure` is the result of the swallowed structured retry, when it
/// produced anything. Returns `None` when nothing readable was found; the
/// decode then fails for real.
pub(crate) fn fallback(
    buf: &[u8],
    opts: &DecodeOptions,
    structure: Option<Value>,
) -> Option<Value> {
    log::debug!("structured parse failed, scanning {} octets for content", buf.len());

    let mut content: Vec<(String, Value)> = Vec::new();

    let schemas: Vec<Value> = xml_blocks(buf)
        .iter()
        .map(|block| schema_to_value(parse_schema(block)))
        .collect();
    if !schemas.is_empty() {
        content.push(("xmlSchemas".to_string(), Value::List(schemas)));
    }

    let types = dotnet_types(buf);
    if !types.is_empty() {
        content.push((
            "dotNetTypes".to_string(),
            Value::List(types.into_iter().map(Value::Text).collect()),
        ));
    }

    let strings = printable_runs(buf, opts.max_fallback_strings);
    if !strings.is_empty() {
        content.push((
            "strings".to_string(),
            Value::List(strings.into_iter().map(Value::Text).collect()),
        ));
    }

    if let Some(v) = structure {
        content.push(("structure".to_string(), v));
    }

    if content.is_empty() {
        return None;
    }

    Some(Value::Map(vec![
        ("type".to_string(), Value::Text("ViewState".to_string())),
        ("format".to_string(), Value::Text("LosFormatter".to_string())),
        ("content".to_string(), Value::Map(content)),
    ]))
}

/// Scrapes table name, columns and diffgram flag out of a schema slice.
pub fn parse_schema(text: &str) -> SchemaExtract {
    let mut table_name = None;
    let mut columns = Vec::new();

    for cap in ELEMENT_RE.captures_iter(text) {
        let name = cap[1].to_string();
        if table_name.is_none() {
            table_name = Some(name);
            continue;
        }
        // Das Wurzelelement und der DataSet-Wrapper sind keine Spalten.
        if Some(name.as_str()) == table_name.as_deref() || name.contains("DataSet") {
            continue;
        }
        let ty = cap
            .get(2)
            .map_or_else(|| "string".to_string(), |m| m.as_str().to_string());
        columns.push(SchemaColumn { name, ty });
    }

    SchemaExtract {
        table_name,
        columns,
        has_diffgram: text.contains("<diffgr:diffgram"),
    }
}

/// Map shape of a schema extract, as shown in the fallback tree.
pub(crate) fn schema_to_value(schema: SchemaExtract) -> Value {
    let mut map = vec![(
        "type".to_string(),
        Value::Text("DataTable Schema".to_string()),
    )];
    if let Some(name) = schema.table_name {
        map.push(("tableName".to_string(), Value::Text(name)));
    }
    map.push((
        "columns".to_string(),
        Value::List(
            schema
                .columns
                .into_iter()
                .map(|c| {
                    Value::Map(vec![
                        ("name".to_string(), Value::Text(c.name)),
                        ("type".to_string(), Value::Text(c.ty)),
                    ])
                })
                .collect(),
        ),
    ));
    map.push(("hasDiffgram".to_string(), Value::Bool(schema.has_diffgram)));
    Value::Map(map)
}

/// Printable-ASCII runs of length >= 4, deduplicated in insertion order,
/// minus encoding noise, capped at `cap` entries.
pub(crate) fn printable_runs(buf: &[u8], cap: usize) -> Vec<String> {
    let mut seen: FastIndexSet<String> = FastIndexSet::default();
    let mut run_start = None;

    for (i, &b) in buf.iter().chain(std::iter::once(&0u8)).enumerate() {
        let printable = i < buf.len() && (0x20..=0x7E).contains(&b);
        match (printable, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                run_start = None;
                if i - start >= MIN_RUN {
                    let s = vstring::decode_octets(&buf[start..i]);
                    if !NOISE.is_match(&s) {
                        seen.insert(s);
                        if seen.len() >= cap {
                            break;
                        }
                    }
                }
            }
            _ => {}
        }
    }
    seen.into_iter().collect()
}

/// .NET type names, well-known names first, deduplicated in insertion order.
fn dotnet_types(buf: &[u8]) -> Vec<String> {
    let mut seen: FastIndexSet<String> = FastIndexSet::default();
    for known in KNOWN_TYPES {
        if memmem::find(buf, known.as_bytes()).is_some() {
            seen.insert(known.to_string());
        }
    }
    for m in DOTNET_TYPE_RE.find_iter(buf) {
        seen.insert(vstring::decode_octets(m.as_bytes()));
    }
    seen.into_iter().collect()
}

/// XML blocks starting at `<?xml`, `<xs:schema` or `<diffgr:`. Unterminated
/// blocks are bounded at `start + XML_BLOCK_CAP`.
fn xml_blocks(buf: &[u8]) -> Vec<String> {
    let mut starts: Vec<(usize, bool)> = Vec::new();
    for pat in [&b"<?xml"[..], &b"<xs:schema"[..]] {
        starts.extend(memmem::find_iter(buf, pat).map(|p| (p, false)));
    }
    starts.extend(memmem::find_iter(buf, b"<diffgr:").map(|p| (p, true)));
    starts.sort_unstable();

    let mut blocks = Vec::new();
    let mut cursor = 0usize;
    for (start, is_diffgram) in starts {
        if start < cursor {
            continue; // Start innerhalb eines bereits erfassten Blocks
        }
        let closing: &[u8] = if is_diffgram {
            b"</diffgr:diffgram>"
        } else {
            b"</xs:schema>"
        };
        let end = match memmem::find(&buf[start..], closing) {
            Some(rel) => start + rel + closing.len(),
            None => (start + XML_BLOCK_CAP).min(buf.len()),
        };
        blocks.push(vstring::decode_octets(&buf[start..end]));
        cursor = end;
    }
    blocks
}

/// Slice from the first `open` through the first following `close`,
/// inclusive of the closing token.
fn find_between<'a>(buf: &'a [u8], open: &[u8], close: &[u8]) -> Option<&'a [u8]> {
    let start = memmem::find(buf, open)?;
    let rel = memmem::find(&buf[start..], close)?;
    Some(&buf[start..start + rel + close.len()])
}
