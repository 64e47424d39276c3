//! Relationship-related objects for OPC packages.
//!
//! A `.rels` part is kept as the element tree it was read from, so
//! relationships this crate does not touch are written back exactly as found
//! (attribute order, unknown attributes, comments). Lookups return borrowed
//! [`Relationship`] views over the `Relationship` elements.

use crate::common::id::next_relationship_id;
use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::opc::constants::{namespace, relationship_type, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

/// A single relationship from a source part to a target.
///
/// Represents a connection between parts in an OPC package, identified by an rId
/// (relationship ID). Can be either internal (pointing to another part) or external
/// (pointing to an external URL).
#[derive(Debug, Clone, Copy)]
pub struct Relationship<'a> {
    element: &'a Element,
    base_uri: &'a str,
}

impl<'a> Relationship<'a> {
    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &'a str {
        self.element.attr_local("Id").unwrap_or_default()
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &'a str {
        self.element.attr_local("Type").unwrap_or_default()
    }

    /// Get the target reference exactly as stored.
    ///
    /// For internal relationships, this is a part reference relative to the
    /// source part's directory. For external relationships, this is an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &'a str {
        self.element.attr_local("Target").unwrap_or_default()
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.element.attr_local("TargetMode") == Some(target_mode::EXTERNAL)
    }

    /// Whether the relationship type is `reltype` (transitional or strict URI).
    #[inline]
    pub fn is_type(&self, reltype: &str) -> bool {
        relationship_type::matches(self.reltype(), reltype)
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(format!(
                "cannot resolve external relationship {} as a part",
                self.r_id()
            )));
        }
        PackURI::from_rel_ref(self.base_uri, self.target_ref()).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source part.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Directory of the source part, used to resolve targets
    base_uri: String,

    doc: XmlDocument,
}

impl Relationships {
    /// Create a new empty relationships collection.
    ///
    /// # Arguments
    /// * `base_uri` - Directory of the source part (e.g. "/word")
    pub fn new(base_uri: impl Into<String>) -> Self {
        let root = Element::new("Relationships").with_attr("xmlns", namespace::OPC_RELATIONSHIPS);
        Self {
            base_uri: base_uri.into(),
            doc: XmlDocument::new(root),
        }
    }

    /// Parse the `.rels` part of `source`.
    ///
    /// # Arguments
    /// * `source` - The part the relationships belong to (not the `.rels` part)
    /// * `bytes` - Raw `.rels` XML
    pub fn parse(source: &PackURI, bytes: &[u8]) -> Result<Self> {
        let rels_uri = source.rels_uri();
        let doc = XmlDocument::parse_bytes(bytes)
            .map_err(|e| OpcError::xml(rels_uri.membername(), e))?;
        if doc.root().local_name() != "Relationships" {
            return Err(OpcError::InvalidRelationship(format!(
                "{} has root <{}>, expected <Relationships>",
                rels_uri.membername(),
                doc.root().name()
            )));
        }
        Ok(Self {
            base_uri: source.base_uri().to_string(),
            doc,
        })
    }

    /// Directory the targets are resolved against.
    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    fn view<'a>(&'a self, element: &'a Element) -> Relationship<'a> {
        Relationship {
            element,
            base_uri: &self.base_uri,
        }
    }

    fn is_relationship(element: &Element) -> bool {
        element.local_name() == "Relationship"
    }

    /// Get an iterator over all relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = Relationship<'_>> {
        self.doc
            .root()
            .elements()
            .filter(|e| Self::is_relationship(e))
            .map(|e| self.view(e))
    }

    /// Get a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<Relationship<'_>> {
        self.iter().find(|rel| rel.r_id() == r_id)
    }

    /// The internal relationship of type `reltype` whose resolved target is `partname`.
    pub fn find_target(&self, reltype: &str, partname: &PackURI) -> Option<Relationship<'_>> {
        self.iter().find(|rel| {
            rel.is_type(reltype)
                && !rel.is_external()
                && rel.target_partname().is_ok_and(|p| &p == partname)
        })
    }

    /// Every relationship ID in this part.
    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|rel| rel.r_id()).collect()
    }

    /// Add an internal relationship under a freshly allocated ID and return the ID.
    pub fn add(&mut self, reltype: &str, target_ref: &str) -> String {
        let r_id = next_relationship_id(self.ids());
        let naming = TagNaming::of(self.doc.root());
        let element = Element::new(naming.qualify("Relationship"))
            .with_attr("Id", r_id.as_str())
            .with_attr("Type", reltype)
            .with_attr("Target", target_ref);
        self.doc.root_mut().push(element);
        r_id
    }

    /// Point an existing relationship at a new target; returns false if `r_id` is absent.
    pub fn set_target(&mut self, r_id: &str, target_ref: &str) -> bool {
        let slot = self
            .doc
            .root_mut()
            .elements_mut()
            .find(|e| Self::is_relationship(e) && e.attr_local("Id") == Some(r_id));
        match slot {
            Some(element) => element.set_attr_local("Target", target_ref),
            None => false,
        }
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Serialize relationships to XML format.
    pub fn to_xml(&self) -> String {
        self.doc.to_xml()
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.doc.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="charts/chart1.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/></Relationships>"#;

    fn document() -> PackURI {
        PackURI::new("/word/document.xml").unwrap()
    }

    #[test]
    fn test_parse_and_lookup() {
        let rels = Relationships::parse(&document(), DOC_RELS.as_bytes()).unwrap();
        assert_eq!(rels.len(), 3);
        let chart = rels.get("rId5").unwrap();
        assert!(chart.is_type(relationship_type::CHART));
        assert_eq!(chart.target_partname().unwrap().as_str(), "/word/charts/chart1.xml");
        assert!(rels.get("rId9").unwrap().is_external());
        assert!(rels.get("rId9").unwrap().target_partname().is_err());
    }

    #[test]
    fn test_find_target() {
        let rels = Relationships::parse(&document(), DOC_RELS.as_bytes()).unwrap();
        let part = PackURI::new("/word/charts/chart1.xml").unwrap();
        assert_eq!(rels.find_target(relationship_type::CHART, &part).unwrap().r_id(), "rId5");
        let other = PackURI::new("/word/charts/chart2.xml").unwrap();
        assert!(rels.find_target(relationship_type::CHART, &other).is_none());
    }

    #[test]
    fn test_add_allocates_above_max() {
        let mut rels = Relationships::parse(&document(), DOC_RELS.as_bytes()).unwrap();
        let r_id = rels.add(relationship_type::CHART, "charts/chart2.xml");
        assert_eq!(r_id, "rId10");
        let xml = rels.to_xml();
        assert!(xml.contains(r#"<Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="charts/chart2.xml"/>"#));
        assert!(xml.contains(r#"TargetMode="External""#));
    }

    #[test]
    fn test_new_and_set_target() {
        let mut rels = Relationships::new("/word/charts");
        assert!(rels.is_empty());
        let r_id = rels.add(relationship_type::PACKAGE, "../embeddings/a1.xlsx");
        assert_eq!(r_id, "rId1");
        assert!(rels.set_target("rId1", "../embeddings/a2.xlsx"));
        assert!(!rels.set_target("rId2", "x"));
        let target = rels.get("rId1").unwrap().target_partname().unwrap();
        assert_eq!(target.as_str(), "/word/embeddings/a2.xlsx");
    }
}
