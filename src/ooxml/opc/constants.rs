//! Constant values related to the Open Packaging Convention.
//!
//! Content type URIs, XML namespaces and relationship types touched by the
//! chart engine. Relationship types are matched on their final path segment
//! as well (see [`relationship_type::matches`]) because strict-conformance
//! packages use the `purl.oclc.org` URIs instead of the transitional ones.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    pub const DML_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
    pub const OFC_PACKAGE: &str = "application/vnd.openxmlformats-officedocument.package";
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const SML_SHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const XML: &str = "application/xml";
}

/// XML namespace URIs
pub mod namespace {
    /// DrawingML chart namespace
    pub const DML_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
    /// DrawingML main namespace (text runs, graphic frames)
    pub const DML_MAIN: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    /// DrawingML wordprocessing drawing namespace
    pub const DML_WORDPROCESSING_DRAWING: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
    /// Office relationships namespace
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// OPC relationships namespace
    pub const OPC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    /// OPC content types namespace
    pub const OPC_CONTENT_TYPES: &str =
        "http://schemas.openxmlformats.org/package/2006/content-types";
    /// SpreadsheetML main namespace
    pub const SML_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    /// WordprocessingML main namespace
    pub const WML_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
}

/// Open XML relationship target modes
pub mod target_mode {
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs used in OPC packages
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const PACKAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const TABLE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

    /// Whether `actual` denotes the same relationship kind as `expected`,
    /// comparing the trailing segment so transitional and strict URIs agree.
    pub fn matches(actual: &str, expected: &str) -> bool {
        actual == expected || last_segment(actual) == last_segment(expected)
    }

    #[inline]
    fn last_segment(uri: &str) -> &str {
        uri.rsplit('/').next().unwrap_or(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::relationship_type;

    #[test]
    fn test_relationship_type_matches_strict_uri() {
        assert!(relationship_type::matches(
            "http://purl.oclc.org/ooxml/officeDocument/relationships/chart",
            relationship_type::CHART
        ));
        assert!(!relationship_type::matches(
            relationship_type::PACKAGE,
            relationship_type::CHART
        ));
    }
}
