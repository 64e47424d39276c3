//! Shared strings table for Excel files.
//!
//! Worksheet cells of type `s` hold a 0-based index into `xl/sharedStrings.xml`.
//! The table here is append-only: existing `si` entries are never removed,
//! reordered or rewritten, so every index handed out before an update stays
//! valid after it. New strings go to the end.

use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use std::collections::HashMap;

/// Shared strings table backed by the parsed `sst` part.
#[derive(Debug, Clone)]
pub struct SharedStringTable {
    doc: XmlDocument,
    naming: TagNaming,
    /// Plain text of every entry, in table order
    strings: Vec<String>,
    /// First index of each distinct text
    lookup: HashMap<String, usize>,
    appended: usize,
}

impl SharedStringTable {
    /// An empty table.
    pub fn new() -> Self {
        let root = Element::new("sst")
            .with_attr("xmlns", namespace::SML_MAIN)
            .with_attr("count", "0")
            .with_attr("uniqueCount", "0");
        Self {
            doc: XmlDocument::new(root),
            naming: TagNaming::Unprefixed,
            strings: Vec::new(),
            lookup: HashMap::new(),
            appended: 0,
        }
    }

    /// Parse `xl/sharedStrings.xml`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse_bytes(bytes)?;
        if doc.root().local_name() != "sst" {
            return Err(OoxmlError::Xml(format!(
                "shared strings part has root <{}>, expected <sst>",
                doc.root().name()
            )));
        }
        let naming = TagNaming::of(doc.root());

        let strings: Vec<String> = doc
            .root()
            .elements()
            .filter(|e| naming.is(e, "si"))
            .map(|si| item_text(si, &naming))
            .collect();
        let mut lookup = HashMap::with_capacity(strings.len());
        for (i, s) in strings.iter().enumerate() {
            lookup.entry(s.clone()).or_insert(i);
        }

        Ok(Self {
            doc,
            naming,
            strings,
            lookup,
            appended: 0,
        })
    }

    /// Get a string by its index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Index of the first entry whose text equals `text` exactly.
    #[inline]
    pub fn index_of(&self, text: &str) -> Option<usize> {
        self.lookup.get(text).copied()
    }

    /// Index of `text`, appending a new entry when no entry matches.
    pub fn get_or_append(&mut self, text: &str) -> usize {
        if let Some(index) = self.index_of(text) {
            return index;
        }
        let index = self.strings.len();
        let mut t = Element::new(self.naming.qualify("t")).with_text(text);
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            t.set_attr("xml:space", "preserve");
        }
        let si = Element::new(self.naming.qualify("si")).with_child(t);
        self.doc.root_mut().push(si);
        self.strings.push(text.to_string());
        self.lookup.insert(text.to_string(), index);
        self.appended += 1;
        index
    }

    /// Get the number of strings in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Get all strings.
    #[inline]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Entries added since the table was read.
    #[inline]
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Serialize with `uniqueCount` set to the entry count and `count` (total
    /// references) raised to at least that.
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let unique = self.strings.len();
        let root = self.doc.root_mut();
        let count = root
            .attr("count")
            .and_then(|c| c.trim().parse::<usize>().ok())
            .unwrap_or(0)
            .saturating_add(self.appended)
            .max(unique);
        root.set_attr("count", count.to_string());
        root.set_attr("uniqueCount", unique.to_string());
        self.doc.to_bytes()
    }
}

impl Default for SharedStringTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of one `si`: its `t`, or the concatenated `t` of its rich-text runs.
/// Phonetic runs (`rPh`) are not part of the value.
fn item_text(si: &Element, naming: &TagNaming) -> String {
    let mut text = String::new();
    for child in si.elements() {
        if naming.is(child, "t") {
            text.push_str(&child.text());
        } else if naming.is(child, "r") {
            for t in child.elements().filter(|e| naming.is(e, "t")) {
                text.push_str(&t.text());
            }
        }
    }
    text
}
