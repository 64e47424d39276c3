//! Chart editing for word-processing packages.
//!
//! [`ChartEditor`] is the entry point of the crate: it reads, updates and
//! copies the charts of one package held in a [`PartStore`]. Every call is a
//! complete read-modify-write cycle; nothing is cached between calls, and all
//! parts an operation touches are computed before the first one is written.

use crate::common::id::{next_chart_index, next_drawing_id, next_part_suffix, parse_suffix, IdPattern};
use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::charts::chart::ChartDocument;
use crate::ooxml::charts::models::{ChartData, ChartView, UpdateReport};
use crate::ooxml::charts::reader::read_view;
use crate::ooxml::charts::writer::apply_update;
use crate::ooxml::docx::drawing::{ChartDrawing, insert_after_anchor, locate_chart_drawing};
use crate::ooxml::docx::options::ChartEditOptions;
use crate::ooxml::docx::{CHARTS_DIR, DOCUMENT_PART};
use crate::ooxml::error::{ChartContext, OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type, namespace, relationship_type};
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{PackURI, PartStore};
use crate::ooxml::xlsx::sync::{SyncReport, sync_embedded};
use crate::ooxml::xlsx::workbook::EmbeddedWorkbook;
use log::{debug, warn};

/// Reads, updates and copies the charts of one package.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::ooxml::charts::{ChartData, Series};
/// use longan::ooxml::docx::ChartEditor;
/// use longan::ooxml::opc::MemPackage;
///
/// let bytes = std::fs::read("report.docx")?;
/// let mut editor = ChartEditor::new(MemPackage::from_zip(&bytes)?);
///
/// let data = ChartData::new(
///     ["Device A", "Device B"],
///     vec![Series::new("Critical", vec![4.0, 3.0])],
/// );
/// editor.update_chart(1, &data)?;
/// let copy = editor.copy_chart(1)?;
/// println!("chart {} now holds {} series", copy, editor.chart_data(copy)?.series.len());
///
/// std::fs::write("report-updated.docx", editor.into_inner().to_zip()?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ChartEditor<S: PartStore> {
    store: S,
    options: ChartEditOptions,
}

/// A chart's workbook link, resolved against the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookLink {
    /// Relationship ID stored in `externalData/@r:id`
    pub r_id: String,
    pub part: PackURI,
}

impl<S: PartStore> ChartEditor<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ChartEditOptions::default())
    }

    pub fn with_options(store: S, options: ChartEditOptions) -> Self {
        Self { store, options }
    }

    #[inline]
    pub fn options(&self) -> &ChartEditOptions {
        &self.options
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the package back.
    #[inline]
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Part name of chart `index` (`/word/charts/chart{index}.xml`).
    pub fn chart_part(index: u32) -> Result<PackURI> {
        PackURI::new(format!("/{}chart{}.xml", CHARTS_DIR, index))
            .map_err(|e| OpcError::InvalidPackUri(e).into())
    }

    fn document_part() -> Result<PackURI> {
        PackURI::new(DOCUMENT_PART).map_err(|e| OpcError::InvalidPackUri(e).into())
    }

    /// Indexes of every `chartN.xml` part, ascending.
    pub fn chart_indices(&self) -> Result<Vec<u32>> {
        let pattern = IdPattern::PartName { stem: "chart", ext: "xml" };
        let mut indices: Vec<u32> = self
            .store
            .part_names()?
            .iter()
            .filter_map(|name| name.strip_prefix(CHARTS_DIR))
            .filter(|rest| !rest.contains('/'))
            .filter_map(|rest| parse_suffix(rest, pattern))
            .filter(|&i| i > 0)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    fn read_chart(&self, index: u32) -> Result<(PackURI, ChartDocument)> {
        let part = Self::chart_part(index)?;
        if !self.store.contains_part(part.membername()) {
            return Err(OoxmlError::ChartNotFound { index });
        }
        let bytes = self.store.read_part(part.membername())?;
        let raw = String::from_utf8(bytes)
            .map_err(|e| OoxmlError::Xml(format!("{}: {}", part, e)))
            .in_chart(index)?;
        let doc = ChartDocument::parse(&raw).in_chart(index)?;
        Ok((part, doc))
    }

    /// Read the data of chart `index` back out of its XML.
    pub fn chart_data(&self, index: u32) -> Result<ChartView> {
        debug!("reading chart {}", index);
        let (_, doc) = self.read_chart(index)?;
        read_view(&doc).in_chart(index)
    }

    /// Resolve the workbook behind chart `index` to a part of the package.
    ///
    /// # Errors
    /// [`OoxmlError::ExternalDataMissing`] when the chart has no `externalData`,
    /// [`OoxmlError::RelationshipNotFound`] when the chart's relationships do not
    /// define its ID, and [`OoxmlError::WorkbookNotFound`] when the target is
    /// external or absent from the package.
    pub fn resolve_workbook(&self, index: u32) -> Result<PackURI> {
        let (part, doc) = self.read_chart(index)?;
        Ok(self.resolve_link(index, &part, &doc)?.part)
    }

    fn resolve_link(&self, index: u32, chart: &PackURI, doc: &ChartDocument) -> Result<WorkbookLink> {
        let r_id = doc
            .external_data_id()
            .ok_or(OoxmlError::ExternalDataMissing { index })?
            .to_string();
        let not_found = || OoxmlError::RelationshipNotFound {
            index,
            r_id: r_id.clone(),
        };
        let rels = self.store.read_rels(chart)?.ok_or_else(not_found)?;
        let rel = rels.get(&r_id).ok_or_else(not_found)?;
        let missing = |path: String| OoxmlError::WorkbookNotFound {
            index,
            r_id: r_id.clone(),
            path,
        };
        if rel.is_external() {
            return Err(missing(rel.target_ref().to_string()));
        }
        let part = rel.target_partname()?;
        if !self.store.contains_part(part.membername()) {
            return Err(missing(part.membername().to_string()));
        }
        debug!("chart {} workbook {} -> {}", index, r_id, part);
        Ok(WorkbookLink { r_id, part })
    }

    /// Like [`Self::resolve_link`], but a chart without `externalData` is
    /// `None` when the options allow cache-only updates.
    fn optional_link(&self, index: u32, chart: &PackURI, doc: &ChartDocument) -> Result<Option<WorkbookLink>> {
        match self.resolve_link(index, chart, doc) {
            Ok(link) => Ok(Some(link)),
            Err(OoxmlError::ExternalDataMissing { .. }) if !self.options.require_workbook => {
                warn!("chart {} has no workbook link, updating the chart cache only", index);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    fn open_workbook(&self, link: &WorkbookLink) -> Result<EmbeddedWorkbook> {
        EmbeddedWorkbook::from_bytes(&self.store.read_part(link.part.membername())?)
    }

    /// Replace the data of chart `index` and mirror it into its workbook.
    ///
    /// The data is validated before anything is read. The chart and workbook
    /// parts are only written once both have been rebuilt, so a failure leaves
    /// the package as it was.
    pub fn update_chart(&mut self, index: u32, data: &ChartData) -> Result<UpdateReport> {
        data.validate()?;
        debug!(
            "updating chart {}: {} categories, {} series",
            index,
            data.categories.len(),
            data.series.len()
        );
        let (part, mut doc) = self.read_chart(index)?;
        let link = self.optional_link(index, &part, &doc)?;

        let mut workbook = match &link {
            Some(link) => Some(self.open_workbook(link).in_chart(index)?),
            None => None,
        };
        let sheet_name = match &workbook {
            Some(workbook) => workbook.first_sheet().in_chart(index)?.name,
            None => None,
        };

        let mut report = apply_update(&mut doc, data, sheet_name.as_deref(), &self.options).in_chart(index)?;

        let workbook_bytes = match workbook.as_mut() {
            Some(workbook) => {
                sync_embedded(workbook, data, report.kind, &self.options).in_chart(index)?;
                Some(workbook.to_bytes().in_chart(index)?)
            },
            None => None,
        };

        self.store.write_part(part.membername(), doc.to_xml().as_bytes())?;
        if let (Some(link), Some(bytes)) = (&link, workbook_bytes) {
            self.store.write_part(link.part.membername(), &bytes)?;
            report.workbook_synced = true;
        }
        Ok(report)
    }

    /// Rewrite only the workbook of chart `index`; the chart part is not touched.
    pub fn sync_workbook(&mut self, index: u32, data: &ChartData) -> Result<SyncReport> {
        data.validate()?;
        let (part, doc) = self.read_chart(index)?;
        let (kind, _) = doc.type_group().in_chart(index)?;
        let link = self.resolve_link(index, &part, &doc)?;
        let mut workbook = self.open_workbook(&link).in_chart(index)?;
        let report = sync_embedded(&mut workbook, data, kind, &self.options).in_chart(index)?;
        let bytes = workbook.to_bytes().in_chart(index)?;
        self.store.write_part(link.part.membername(), &bytes)?;
        Ok(report)
    }

    /// Duplicate chart `index` together with its workbook and place the copy
    /// right after the paragraph of the source drawing. Returns the new index.
    pub fn copy_chart(&mut self, index: u32) -> Result<u32> {
        let (source_part, source_doc) = self.read_chart(index)?;
        let link = self.optional_link(index, &source_part, &source_doc)?;
        let part_names = self.store.part_names()?;

        let new_index = next_chart_index(&part_names);
        let new_part = Self::chart_part(new_index)?;
        let chart_bytes = self.store.read_part(source_part.membername())?;

        // Workbook copy and the chart relationships pointing at it
        let mut chart_rels = self.store.read_rels(&source_part)?;
        let workbook_copy = match &link {
            Some(link) => {
                let target = self.workbook_copy_name(&link.part, new_index, &part_names)?;
                let bytes = self.store.read_part(link.part.membername())?;
                let relinked = chart_rels
                    .as_mut()
                    .is_some_and(|rels| rels.set_target(&link.r_id, &target.relative_ref(new_part.base_uri())));
                if !relinked {
                    return Err(OpcError::RelationshipNotFound(format!(
                        "{} in {}",
                        link.r_id,
                        source_part.rels_uri()
                    ))
                    .into());
                }
                Some((link.part.clone(), target, bytes))
            },
            None => None,
        };

        // Content types
        let mut types = self.store.read_content_types()?;
        types.add_override(&new_part, content_type::DML_CHART);
        if let Some((source, target, _)) = &workbook_copy {
            if let Some(ct) = types.override_for(source).map(str::to_string) {
                types.add_override(target, &ct);
            }
        }

        // Document relationship and drawing
        let document_part = Self::document_part()?;
        let mut document_rels = self
            .store
            .read_rels(&document_part)?
            .ok_or(OoxmlError::ChartNotReferenced { index })?;
        let source_r_id = document_rels
            .find_target(relationship_type::CHART, &source_part)
            .map(|rel| rel.r_id().to_string())
            .ok_or(OoxmlError::ChartNotReferenced { index })?;
        let new_r_id = document_rels.add(
            relationship_type::CHART,
            &new_part.relative_ref(document_part.base_uri()),
        );

        let mut document = self.store.read_xml(document_part.membername())?;
        let anchor = locate_chart_drawing(document.root(), &source_r_id).ok_or_else(|| {
            OoxmlError::DrawingNotFound {
                index,
                r_id: source_r_id.clone(),
            }
        })?;
        let drawing = ChartDrawing {
            r_id: new_r_id.clone(),
            doc_pr_id: self.next_doc_pr_id(&document, &part_names)?,
            extent: anchor.extent.unwrap_or(self.options.drawing_extent),
        };
        let w = TagNaming::for_namespace(document.root(), namespace::WML_MAIN, "w");
        let paragraph = drawing.to_paragraph(&w, anchor.paragraph_properties.clone());
        if !insert_after_anchor(document.root_mut(), &anchor, paragraph) {
            return Err(OoxmlError::DrawingNotFound {
                index,
                r_id: source_r_id,
            });
        }

        self.store.write_part(new_part.membername(), &chart_bytes)?;
        if let Some(rels) = &chart_rels {
            self.store.write_rels(&new_part, rels)?;
        }
        if let Some((_, target, bytes)) = &workbook_copy {
            self.store.write_part(target.membername(), bytes)?;
        }
        self.store.write_content_types(&types)?;
        self.store.write_rels(&document_part, &document_rels)?;
        self.store.write_part(document_part.membername(), &document.to_bytes())?;

        debug!(
            "copied chart {} to chart {} (relationship {}, drawing {})",
            index, new_index, new_r_id, drawing.doc_pr_id
        );
        Ok(new_index)
    }

    /// Name for the copy of workbook `source`: its numeric suffix replaced by
    /// the new chart index, or the next free suffix when that name is taken.
    fn workbook_copy_name(&self, source: &PackURI, new_index: u32, part_names: &[String]) -> Result<PackURI> {
        let candidate = source.with_idx(new_index);
        if !part_names.iter().any(|n| n == candidate.membername()) {
            return Ok(candidate);
        }
        let dir = format!("{}/", source.base_uri().trim_start_matches('/'));
        let suffix = next_part_suffix(part_names, &dir, source.stem_without_idx(), source.ext());
        let fallback = source.with_idx(suffix.max(new_index));
        if part_names.iter().any(|n| n == fallback.membername()) {
            return Err(OpcError::InvalidPackUri(format!("no free name for a copy of {}", source)).into());
        }
        Ok(fallback)
    }

    /// Next `wp:docPr/@id` across the document body, headers and footers.
    fn next_doc_pr_id(&self, document: &XmlDocument, part_names: &[String]) -> Result<u32> {
        let mut others: Vec<XmlDocument> = Vec::new();
        for name in part_names {
            let Some(rest) = name.strip_prefix("word/") else {
                continue;
            };
            let is_header_footer =
                (rest.starts_with("header") || rest.starts_with("footer")) && rest.ends_with(".xml") && !rest.contains('/');
            if is_header_footer {
                others.push(self.store.read_xml(name)?);
            }
        }
        let roots: Vec<&Element> = std::iter::once(document.root())
            .chain(others.iter().map(XmlDocument::root))
            .collect();
        Ok(next_drawing_id(roots))
    }
}
