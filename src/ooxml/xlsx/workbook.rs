//! Embedded workbook packages.
//!
//! A chart's backing data lives in a complete `.xlsx` package stored as a
//! single part of the outer document (`word/embeddings/*.xlsx`). The package
//! is opened into memory, edited part by part and zipped back.

use crate::common::xml::{TagNaming, XmlDocument};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{MemPackage, PackURI, PartStore};
use crate::ooxml::xlsx::shared_strings::SharedStringTable;
use log::debug;

/// Workbook part of a spreadsheet package.
pub const WORKBOOK_PART: &str = "/xl/workbook.xml";
/// Worksheet used when the workbook does not name its sheets.
pub const DEFAULT_SHEET_PART: &str = "/xl/worksheets/sheet1.xml";
/// Shared strings part used when the workbook has no relationship to one.
pub const DEFAULT_SHARED_STRINGS_PART: &str = "/xl/sharedStrings.xml";

/// The first worksheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLocation {
    /// Sheet name as shown on its tab; `None` when `workbook.xml` does not say
    pub name: Option<String>,
    pub part: PackURI,
}

/// An embedded `.xlsx` package opened in memory.
#[derive(Debug, Clone)]
pub struct EmbeddedWorkbook {
    package: MemPackage,
}

impl EmbeddedWorkbook {
    /// Open the ZIP bytes of an embedded workbook.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = MemPackage::from_zip(bytes)?;
        debug!("opened embedded workbook with {} parts", package.len());
        Ok(Self { package })
    }

    /// Repackage as ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.package.to_zip()?)
    }

    #[inline]
    pub fn package(&self) -> &MemPackage {
        &self.package
    }

    #[inline]
    pub fn package_mut(&mut self) -> &mut MemPackage {
        &mut self.package
    }

    fn workbook_uri() -> Result<PackURI> {
        PackURI::new(WORKBOOK_PART).map_err(|e| OpcError::InvalidPackUri(e).into())
    }

    /// Locate the first worksheet through `xl/workbook.xml` and its
    /// relationships, falling back to `xl/worksheets/sheet1.xml`.
    pub fn first_sheet(&self) -> Result<SheetLocation> {
        if let Some(found) = self.first_sheet_from_workbook()? {
            return Ok(found);
        }
        let part = PackURI::new(DEFAULT_SHEET_PART).map_err(OpcError::InvalidPackUri)?;
        if !self.package.contains_part(part.membername()) {
            return Err(OpcError::PartNotFound(part.membername().to_string()).into());
        }
        Ok(SheetLocation { name: None, part })
    }

    fn first_sheet_from_workbook(&self) -> Result<Option<SheetLocation>> {
        let workbook_uri = Self::workbook_uri()?;
        if !self.package.contains_part(workbook_uri.membername()) {
            return Ok(None);
        }
        let doc = self.package.read_xml(workbook_uri.membername())?;
        let naming = TagNaming::of(doc.root());
        let Some(sheet) = doc
            .root()
            .child(|e| naming.is(e, "sheets"))
            .and_then(|sheets| sheets.child(|e| naming.is(e, "sheet")))
        else {
            return Ok(None);
        };
        let name = sheet.attr("name").map(str::to_string);

        let Some(rels) = self.package.read_rels(&workbook_uri)? else {
            return Ok(None);
        };
        let target = sheet
            .attr_local("id")
            .and_then(|r_id| rels.get(r_id))
            .filter(|rel| !rel.is_external())
            .map(|rel| rel.target_partname())
            .transpose()?;
        Ok(target
            .filter(|part| self.package.contains_part(part.membername()))
            .map(|part| SheetLocation { name, part }))
    }

    /// Shared strings part, found through the workbook relationship of type
    /// `sharedStrings` or at `xl/sharedStrings.xml`.
    pub fn shared_strings_part(&self) -> Result<Option<PackURI>> {
        let workbook_uri = Self::workbook_uri()?;
        if let Some(rels) = self.package.read_rels(&workbook_uri)? {
            let linked = rels
                .iter()
                .find(|rel| rel.is_type(relationship_type::SHARED_STRINGS) && !rel.is_external());
            if let Some(rel) = linked {
                let part = rel.target_partname()?;
                if self.package.contains_part(part.membername()) {
                    return Ok(Some(part));
                }
            }
        }
        let fallback = PackURI::new(DEFAULT_SHARED_STRINGS_PART).map_err(OpcError::InvalidPackUri)?;
        Ok(self.package.contains_part(fallback.membername()).then_some(fallback))
    }

    /// The shared strings table and where it lives, if the workbook has one.
    pub fn read_shared_strings(&self) -> Result<Option<(PackURI, SharedStringTable)>> {
        let Some(part) = self.shared_strings_part()? else {
            return Ok(None);
        };
        let bytes = self.package.read_part(part.membername())?;
        let table = SharedStringTable::parse(&bytes)?;
        Ok(Some((part, table)))
    }

    /// Table parts linked from a worksheet through its `tableParts` element.
    pub fn table_parts(&self, sheet: &PackURI, sheet_doc: &XmlDocument) -> Result<Vec<PackURI>> {
        let naming = TagNaming::of(sheet_doc.root());
        let ids: Vec<&str> = sheet_doc
            .root()
            .child(|e| naming.is(e, "tableParts"))
            .map(|parts| {
                parts
                    .elements()
                    .filter(|e| naming.is(e, "tablePart"))
                    .filter_map(|e| e.attr_local("id"))
                    .collect()
            })
            .unwrap_or_default();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let Some(rels) = self.package.read_rels(sheet)? else {
            return Ok(Vec::new());
        };

        let mut parts = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(rel) = rels.get(id) else {
                continue;
            };
            if rel.is_external() || !rel.is_type(relationship_type::TABLE) {
                continue;
            }
            let part = rel.target_partname()?;
            if self.package.contains_part(part.membername()) {
                parts.push(part);
            }
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::phys_pkg::write_archive;

    const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Q1 Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/data.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="strings.xml"/></Relationships>"#;

    const SST_XML: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1"><si><t>Critical</t></si></sst>"#;

    const SHEET_XML: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#;

    #[test]
    fn test_first_sheet_through_workbook_relationships() {
        let bytes = write_archive([
            ("xl/workbook.xml", WORKBOOK_XML.as_bytes()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
            ("xl/worksheets/data.xml", SHEET_XML.as_bytes()),
            ("xl/strings.xml", SST_XML.as_bytes()),
        ])
        .unwrap();
        let workbook = EmbeddedWorkbook::from_bytes(&bytes).unwrap();
        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(sheet.name.as_deref(), Some("Q1 Data"));
        assert_eq!(sheet.part.as_str(), "/xl/worksheets/data.xml");

        let (part, table) = workbook.read_shared_strings().unwrap().unwrap();
        assert_eq!(part.as_str(), "/xl/strings.xml");
        assert_eq!(table.get(0), Some("Critical"));
    }

    #[test]
    fn test_fallback_parts() {
        let bytes = write_archive([("xl/worksheets/sheet1.xml", SHEET_XML.as_bytes())]).unwrap();
        let workbook = EmbeddedWorkbook::from_bytes(&bytes).unwrap();
        let sheet = workbook.first_sheet().unwrap();
        assert_eq!(sheet.name, None);
        assert_eq!(sheet.part.as_str(), DEFAULT_SHEET_PART);
        assert!(workbook.read_shared_strings().unwrap().is_none());
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let bytes = write_archive([("xl/styles.xml", b"<styleSheet/>".as_slice())]).unwrap();
        let workbook = EmbeddedWorkbook::from_bytes(&bytes).unwrap();
        assert!(workbook.first_sheet().is_err());
    }
}
