//! Inline chart drawings in the document body.
//!
//! A chart appears in `word/document.xml` as a paragraph holding
//! `w:drawing/wp:inline/a:graphic/a:graphicData/c:chart[@r:id]`. This module
//! finds the paragraph of an existing chart drawing and generates the
//! paragraph for a new one.

use crate::common::xml::{Element, TagNaming};
use crate::ooxml::opc::constants::namespace;

/// `graphicData/@uri` of a chart graphic frame.
pub const CHART_GRAPHIC_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Where a chart drawing sits in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingAnchor {
    /// Root-relative path of the paragraph enclosing the drawing
    pub paragraph_path: Vec<usize>,
    /// `wp:extent` of the drawing, in EMU
    pub extent: Option<(u64, u64)>,
    /// Paragraph properties of the enclosing paragraph, section break removed
    pub paragraph_properties: Option<Element>,
}

/// Locate the drawing that references chart relationship `r_id`.
///
/// Returns `None` when no `c:chart` element carries that relationship ID or
/// when it is not inside a paragraph.
pub fn locate_chart_drawing(root: &Element, r_id: &str) -> Option<DrawingAnchor> {
    let chart_path = root.path_to(|e| e.local_name() == "chart" && e.attr_local("id") == Some(r_id))?;
    let w = TagNaming::for_namespace(root, namespace::WML_MAIN, "w");

    let mut paragraph_len = None;
    let mut extent = None;
    for len in (1..chart_path.len()).rev() {
        let Some(ancestor) = root.at_path(&chart_path[..len]) else {
            continue;
        };
        if extent.is_none() && matches!(ancestor.local_name(), "inline" | "anchor") {
            extent = ancestor
                .child(|e| e.local_name() == "extent")
                .and_then(|e| Some((e.attr("cx")?.parse().ok()?, e.attr("cy")?.parse().ok()?)));
        }
        if w.is(ancestor, "p") {
            paragraph_len = Some(len);
            break;
        }
    }
    let paragraph_path = chart_path[..paragraph_len?].to_vec();

    let paragraph_properties = root.at_path(&paragraph_path).and_then(|p| {
        let mut properties = p.child(|e| w.is(e, "pPr"))?.clone();
        properties.remove_children(|e| w.is(e, "sectPr"));
        Some(properties)
    });

    Some(DrawingAnchor {
        paragraph_path,
        extent,
        paragraph_properties,
    })
}

/// A new inline chart drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDrawing {
    /// Document relationship ID of the chart part
    pub r_id: String,
    /// `wp:docPr/@id`, unique across the document, headers and footers
    pub doc_pr_id: u32,
    /// Width and height in EMU
    pub extent: (u64, u64),
}

impl ChartDrawing {
    /// Build the paragraph holding this drawing. Paragraph elements use the
    /// document's WordprocessingML naming; the DrawingML elements declare
    /// their own namespaces.
    pub fn to_paragraph(&self, w: &TagNaming, paragraph_properties: Option<Element>) -> Element {
        let (cx, cy) = self.extent;
        let name = format!("Chart {}", self.doc_pr_id);

        let chart = Element::new("c:chart")
            .with_attr("xmlns:c", namespace::DML_CHART)
            .with_attr("xmlns:r", namespace::OFC_RELATIONSHIPS)
            .with_attr("r:id", self.r_id.as_str());
        let graphic = Element::new("a:graphic")
            .with_attr("xmlns:a", namespace::DML_MAIN)
            .with_child(
                Element::new("a:graphicData")
                    .with_attr("uri", CHART_GRAPHIC_URI)
                    .with_child(chart),
            );
        let inline = Element::new("wp:inline")
            .with_attr("xmlns:wp", namespace::DML_WORDPROCESSING_DRAWING)
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_child(
                Element::new("wp:extent")
                    .with_attr("cx", cx.to_string())
                    .with_attr("cy", cy.to_string()),
            )
            .with_child(
                Element::new("wp:effectExtent")
                    .with_attr("l", "0")
                    .with_attr("t", "0")
                    .with_attr("r", "0")
                    .with_attr("b", "0"),
            )
            .with_child(
                Element::new("wp:docPr")
                    .with_attr("id", self.doc_pr_id.to_string())
                    .with_attr("name", name),
            )
            .with_child(Element::new("wp:cNvGraphicFramePr"))
            .with_child(graphic);

        let run = Element::new(w.qualify("r"))
            .with_child(Element::new(w.qualify("drawing")).with_child(inline));
        let mut paragraph = Element::new(w.qualify("p"));
        if let Some(properties) = paragraph_properties {
            paragraph.push(properties);
        }
        paragraph.push(run);
        paragraph
    }
}

/// Insert `paragraph` right after the paragraph at `anchor`. Returns false if
/// the anchor no longer resolves.
pub fn insert_after_anchor(root: &mut Element, anchor: &DrawingAnchor, paragraph: Element) -> bool {
    let Some((&index, parent_path)) = anchor.paragraph_path.split_last() else {
        return false;
    };
    match root.at_path_mut(parent_path) {
        Some(parent) => {
            parent.insert_after(index, [paragraph]);
            true
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlDocument;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:r><w:t>Intro</w:t></w:r></w:p><w:p><w:pPr><w:jc w:val="center"/><w:sectPr/></w:pPr><w:r><w:drawing><wp:inline><wp:extent cx="4000000" cy="2000000"/><wp:docPr id="7" name="Chart 1"/><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="rId5"/></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p><w:p><w:r><w:t>Outro</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_locate_chart_drawing() {
        let doc = XmlDocument::parse(DOCUMENT).unwrap();
        let anchor = locate_chart_drawing(doc.root(), "rId5").unwrap();
        assert_eq!(anchor.paragraph_path, vec![0, 1]);
        assert_eq!(anchor.extent, Some((4_000_000, 2_000_000)));
        let properties = anchor.paragraph_properties.unwrap();
        assert_eq!(properties.to_xml(), r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
        assert!(locate_chart_drawing(doc.root(), "rId6").is_none());
    }

    #[test]
    fn test_insert_generated_paragraph_after_source() {
        let mut doc = XmlDocument::parse(DOCUMENT).unwrap();
        let anchor = locate_chart_drawing(doc.root(), "rId5").unwrap();
        let drawing = ChartDrawing {
            r_id: "rId9".to_string(),
            doc_pr_id: 8,
            extent: anchor.extent.unwrap(),
        };
        let w = TagNaming::for_namespace(doc.root(), namespace::WML_MAIN, "w");
        let paragraph = drawing.to_paragraph(&w, anchor.paragraph_properties.clone());
        assert!(insert_after_anchor(doc.root_mut(), &anchor, paragraph));

        let xml = doc.to_xml();
        let source = xml.find(r#"r:id="rId5""#).unwrap();
        let copy = xml.find(r#"r:id="rId9""#).unwrap();
        let outro = xml.find("Outro").unwrap();
        assert!(source < copy && copy < outro);
        assert!(xml.contains(r#"<wp:extent cx="4000000" cy="2000000"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="8" name="Chart 8"/>"#));
        assert_eq!(xml.matches("<w:sectPr/>").count(), 1);

        let reparsed = XmlDocument::parse(&xml).unwrap();
        assert_eq!(locate_chart_drawing(reparsed.root(), "rId9").unwrap().paragraph_path, vec![0, 2]);
    }
}
