//! String and type intern tables.
//!
//! The wire format assigns implicit indices to interned strings (tag 0x1E)
//! and type names (tag 0x19) in the order they appear; reference tags
//! (0x1F, 0x3C) address them by index. Both tables are append-only vectors
//! scoped to a single decode call: a fresh [`InternTables`] per stream, the
//! tables are never reused across streams.
//!
//! Out-of-range references are an in-band malformation: they resolve to a
//! well-formed sentinel string instead of failing the parse.

use std::rc::Rc;

/// Per-decode intern state for strings and type names.
#[derive(Default)]
pub struct InternTables {
    strings: Vec<Rc<str>>,
    types: Vec<Rc<str>>,
}

impl InternTables {
    /// Creates empty tables. One per decode call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a string write (tag 0x1E). Returns its index.
    ///
    /// Kein Dedupe: der Index ist durch die Schreibreihenfolge auf dem
    /// Draht definiert, auch bei doppelten Werten.
    pub fn push_string(&mut self, value: &str) -> usize {
        self.strings.push(value.into());
        self.strings.len() - 1
    }

    /// Appends a type-name write (tag 0x19). Returns its index.
    pub fn push_type(&mut self, name: &str) -> usize {
        self.types.push(name.into());
        self.types.len() - 1
    }

    /// Resolves a string reference (tag 0x1F).
    pub fn string(&self, index: u64) -> Option<Rc<str>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .cloned()
    }

    /// Resolves a type reference (tag 0x3C).
    pub fn type_name(&self, index: u64) -> Option<Rc<str>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.types.get(i))
            .cloned()
    }

    /// Resolves a string reference, or the `"<StringRef:i>"` sentinel.
    pub fn string_or_sentinel(&self, index: u64) -> String {
        match self.string(index) {
            Some(s) => s.to_string(),
            None => format!("<StringRef:{index}>"),
        }
    }

    /// Resolves a type reference, or the `"<TypeRef:i>"` sentinel.
    pub fn type_or_sentinel(&self, index: u64) -> String {
        match self.type_name(index) {
            Some(s) => s.to_string(),
            None => format!("<TypeRef:{index}>"),
        }
    }

    /// Number of interned strings.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Number of interned type names.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
