//! The `[Content_Types].xml` part.
//!
//! Parts this crate creates (chart copies) are registered with an `Override`
//! keyed by part name; workbook parts are covered by the package's `Default`
//! for `xlsx` and need no entry. Part names compare ASCII case-insensitively as
//! OPC requires.

use crate::common::xml::dom::XmlError;
use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

/// Member name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

#[derive(Debug, Clone)]
pub struct ContentTypes {
    doc: XmlDocument,
}

impl ContentTypes {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = XmlDocument::parse_bytes(bytes).map_err(|e| OpcError::xml(CONTENT_TYPES_PART, e))?;
        if doc.root().local_name() != "Types" {
            return Err(OpcError::xml(
                CONTENT_TYPES_PART,
                XmlError::Syntax(format!("root <{}>, expected <Types>", doc.root().name())),
            ));
        }
        Ok(Self { doc })
    }

    fn overrides(&self) -> impl Iterator<Item = &Element> {
        self.doc.root().elements().filter(|e| e.local_name() == "Override")
    }

    /// Content type registered by an `Override` for `partname`.
    pub fn override_for(&self, partname: &PackURI) -> Option<&str> {
        self.overrides()
            .find(|e| {
                e.attr_local("PartName")
                    .is_some_and(|p| p.eq_ignore_ascii_case(partname.as_str()))
            })
            .and_then(|e| e.attr_local("ContentType"))
    }

    #[inline]
    pub fn has_override(&self, partname: &PackURI) -> bool {
        self.override_for(partname).is_some()
    }

    /// Register an `Override` unless one already exists; returns whether one was added.
    pub fn add_override(&mut self, partname: &PackURI, content_type: &str) -> bool {
        if self.has_override(partname) {
            return false;
        }
        let naming = TagNaming::of(self.doc.root());
        let element = Element::new(naming.qualify("Override"))
            .with_attr("PartName", partname.as_str())
            .with_attr("ContentType", content_type);
        self.doc.root_mut().push(element);
        true
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.doc.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="xlsx" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"/><Override PartName="/word/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/></Types>"#;

    #[test]
    fn test_lookup_override() {
        let types = ContentTypes::parse(TYPES.as_bytes()).unwrap();
        let chart = PackURI::new("/WORD/charts/chart1.xml").unwrap();
        assert_eq!(types.override_for(&chart), Some(content_type::DML_CHART));
        // covered by the xlsx default only
        let book = PackURI::new("/word/embeddings/b.xlsx").unwrap();
        assert!(!types.has_override(&book));
        assert_eq!(types.override_for(&book), None);
    }

    #[test]
    fn test_rejects_other_root() {
        assert!(ContentTypes::parse(b"<Relationships/>").is_err());
    }

    #[test]
    fn test_add_override_once() {
        let mut types = ContentTypes::parse(TYPES.as_bytes()).unwrap();
        let chart2 = PackURI::new("/word/charts/chart2.xml").unwrap();
        assert!(types.add_override(&chart2, content_type::DML_CHART));
        assert!(!types.add_override(&chart2, content_type::DML_CHART));
        let xml = String::from_utf8(types.to_bytes()).unwrap();
        assert_eq!(xml.matches("/word/charts/chart2.xml").count(), 1);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Types"));
    }
}
