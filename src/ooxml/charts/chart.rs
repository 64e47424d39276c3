//! A parsed chart part.
//!
//! [`ChartDocument`] owns the element tree of one `chartN.xml` together with
//! the tag naming detected from its root, and knows where the structural
//! anchors of a chart live: the `chart` element, the plot area, the chart-type
//! element, the axes and the title elements.

use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::charts::types::{AxisType, ChartKind};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;

/// Tag naming for the two namespaces a chart part mixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartNames {
    /// Chart elements (`c:ser`, or bare `ser` under a default namespace)
    pub chart: TagNaming,
    /// DrawingML text elements (`a:t`)
    pub drawing: TagNaming,
}

impl ChartNames {
    /// Detect the naming from the root element; `None` unless it is a `chartSpace`.
    pub fn detect(root: &Element) -> Option<Self> {
        if root.local_name() != "chartSpace" {
            return None;
        }
        Some(Self {
            chart: TagNaming::of(root),
            drawing: TagNaming::for_namespace(root, namespace::DML_MAIN, "a"),
        })
    }

    #[inline]
    pub fn is(&self, element: &Element, local: &str) -> bool {
        self.chart.is(element, local)
    }

    #[inline]
    pub fn qualify(&self, local: &str) -> String {
        self.chart.qualify(local)
    }
}

/// Which title a lookup or update addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSlot {
    Chart,
    Axis(AxisType),
}

#[derive(Debug, Clone)]
pub struct ChartDocument {
    doc: XmlDocument,
    names: ChartNames,
}

impl ChartDocument {
    /// Parse chart XML.
    ///
    /// # Errors
    /// [`OoxmlError::Xml`] for malformed XML, [`OoxmlError::MissingChartRoot`]
    /// when the root is not a `chartSpace` element.
    pub fn parse(raw: &str) -> Result<Self> {
        let doc = XmlDocument::parse(raw)?;
        let names = ChartNames::detect(doc.root()).ok_or(OoxmlError::MissingChartRoot)?;
        Ok(Self { doc, names })
    }

    #[inline]
    pub fn names(&self) -> &ChartNames {
        &self.names
    }

    #[inline]
    pub fn root(&self) -> &Element {
        self.doc.root()
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        self.doc.root_mut()
    }

    /// Serialize, declaration first and followed by a line break.
    #[inline]
    pub fn to_xml(&self) -> String {
        self.doc.to_xml()
    }

    fn chart_index(&self) -> Option<usize> {
        self.root().child_position(|e| self.names.is(e, "chart"))
    }

    fn plot_area_path(&self) -> Option<Vec<usize>> {
        let chart_idx = self.chart_index()?;
        let chart = self.root().at_path(&[chart_idx])?;
        let plot_idx = chart.child_position(|e| self.names.is(e, "plotArea"))?;
        Some(vec![chart_idx, plot_idx])
    }

    /// The `chart` element.
    pub fn chart(&self) -> Option<&Element> {
        self.root().child(|e| self.names.is(e, "chart"))
    }

    /// The `plotArea` element.
    pub fn plot_area(&self) -> Option<&Element> {
        self.chart()?.child(|e| self.names.is(e, "plotArea"))
    }

    /// Kind and root-relative path of the first supported chart-type element
    /// in the plot area.
    pub fn type_group_path(&self) -> Result<(ChartKind, Vec<usize>)> {
        let mut path = self.plot_area_path().ok_or(OoxmlError::UnsupportedChartType)?;
        let plot_area = self.root().at_path(&path).ok_or(OoxmlError::UnsupportedChartType)?;
        for (i, node) in plot_area.children().iter().enumerate() {
            let Some(element) = node.as_element() else {
                continue;
            };
            let kind = ChartKind::ALL
                .into_iter()
                .find(|k| self.names.is(element, k.xml_element_name()));
            if let Some(kind) = kind {
                path.push(i);
                return Ok((kind, path));
            }
        }
        Err(OoxmlError::UnsupportedChartType)
    }

    /// The first supported chart-type element and its kind.
    pub fn type_group(&self) -> Result<(ChartKind, &Element)> {
        let (kind, path) = self.type_group_path()?;
        let group = self.root().at_path(&path).ok_or(OoxmlError::UnsupportedChartType)?;
        Ok((kind, group))
    }

    /// Child index in the plot area of the axis playing `role`.
    ///
    /// The category axis is the first `catAx`/`dateAx`; charts without one
    /// (scatter) use their horizontal `valAx`. The value axis is the first
    /// `valAx` that is not already the category axis.
    fn axis_index(&self, plot_area: &Element, role: AxisType) -> Option<usize> {
        let axes: Vec<(usize, &Element)> = plot_area
            .children()
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_element().map(|e| (i, e)))
            .filter(|(_, e)| self.names.chart.is_any(e, &["catAx", "dateAx", "valAx", "serAx"]))
            .collect();

        let category = axes
            .iter()
            .find(|(_, e)| self.names.chart.is_any(e, &["catAx", "dateAx"]))
            .or_else(|| {
                let values = axes.iter().filter(|(_, e)| self.names.is(e, "valAx"));
                let mut horizontal = values.clone().filter(|(_, e)| {
                    e.child(|p| self.names.is(p, "axPos"))
                        .and_then(|p| p.attr_local("val"))
                        .is_some_and(|pos| pos == "b" || pos == "t")
                });
                horizontal.next().or_else(|| values.clone().next())
            })
            .map(|(i, _)| *i);

        match role {
            AxisType::Category => category,
            AxisType::Value => axes
                .iter()
                .find(|(i, e)| self.names.is(e, "valAx") && Some(*i) != category)
                .map(|(i, _)| *i),
        }
    }

    /// Root-relative path of the `title` element for `slot`, if present.
    ///
    /// The chart title is the `title` directly under `chart`; axis titles never
    /// stand in for it.
    pub fn title_path(&self, slot: TitleSlot) -> Option<Vec<usize>> {
        let mut path = match slot {
            TitleSlot::Chart => vec![self.chart_index()?],
            TitleSlot::Axis(role) => {
                let mut path = self.plot_area_path()?;
                let plot_area = self.root().at_path(&path)?;
                path.push(self.axis_index(plot_area, role)?);
                path
            },
        };
        let owner = self.root().at_path(&path)?;
        path.push(owner.child_position(|e| self.names.is(e, "title"))?);
        Some(path)
    }

    /// The `title` element for `slot`, if present.
    pub fn title(&self, slot: TitleSlot) -> Option<&Element> {
        let path = self.title_path(slot)?;
        self.root().at_path(&path)
    }

    /// DrawingML naming in scope at the element `path` points to. Declarations
    /// on any element between the root and the target override the root's.
    fn drawing_naming_at(&self, path: &[usize]) -> TagNaming {
        let mut naming = self.names.drawing.clone();
        let mut element = self.root();
        for &i in path {
            let Some(child) = element.at_path(&[i]) else {
                break;
            };
            element = child;
            if let Some(declared) = TagNaming::declared_on(element, namespace::DML_MAIN) {
                naming = declared;
            }
        }
        naming
    }

    /// Paths, relative to the title at `path`, of its DrawingML text runs.
    fn title_run_paths(&self, path: &[usize]) -> Vec<Vec<usize>> {
        let Some(title) = self.root().at_path(path) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        text_runs(title, &self.drawing_naming_at(path), &mut Vec::new(), &mut out);
        out
    }

    /// Text of the title for `slot`: its first DrawingML text run, or the first
    /// cached value of a formula-backed title.
    pub fn title_text(&self, slot: TitleSlot) -> Option<String> {
        let path = self.title_path(slot)?;
        let title = self.root().at_path(&path)?;
        match self.title_run_paths(&path).first() {
            Some(run) => title.at_path(run).map(Element::text),
            None => title.find(|e| self.names.is(e, "v")).map(Element::text),
        }
    }

    /// Replace the title text for `slot`. Returns false, leaving the tree
    /// untouched, when there is no title element or no text node inside it.
    ///
    /// The first text node takes the new text; any further runs are emptied so
    /// a multi-run title does not keep a tail of the old text.
    pub fn set_title_text(&mut self, slot: TitleSlot, text: &str) -> bool {
        let Some(path) = self.title_path(slot) else {
            return false;
        };
        let Some(title) = self.root().at_path(&path) else {
            return false;
        };
        let mut targets = self.title_run_paths(&path);
        if targets.is_empty() {
            targets = title.paths_to_all(|e| self.names.is(e, "v"));
        }
        let Some((first, rest)) = targets.split_first() else {
            return false;
        };

        let Some(title) = self.root_mut().at_path_mut(&path) else {
            return false;
        };
        for run in rest {
            if let Some(node) = title.at_path_mut(run) {
                node.set_text("");
            }
        }
        if let Some(node) = title.at_path_mut(first) {
            node.set_text(text);
        }
        true
    }

    /// Relationship ID stored in `externalData/@r:id`.
    pub fn external_data_id(&self) -> Option<&str> {
        self.root()
            .child(|e| self.names.is(e, "externalData"))
            .and_then(|e| e.attr_local("id"))
    }
}

/// Collect the paths of `t` elements under `element`, rebinding the DrawingML
/// naming wherever a descendant declares the namespace itself.
fn text_runs(element: &Element, naming: &TagNaming, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (i, node) in element.children().iter().enumerate() {
        let Some(child) = node.as_element() else {
            continue;
        };
        let declared = TagNaming::declared_on(child, namespace::DML_MAIN);
        let naming = declared.as_ref().unwrap_or(naming);
        path.push(i);
        if naming.is(child, "t") {
            out.push(path.clone());
        } else {
            text_runs(child, naming, path, out);
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefix_declared_on_nested_element() {
        let raw = r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:title><c:tx><c:rich xmlns:d="http://schemas.openxmlformats.org/drawingml/2006/main"><d:p><d:r><d:t>Old</d:t></d:r><d:r><d:t> title</d:t></d:r></d:p></c:rich></c:tx></c:title><c:plotArea><c:barChart/></c:plotArea></c:chart></c:chartSpace>"#;
        let mut doc = ChartDocument::parse(raw).unwrap();
        assert_eq!(doc.title_text(TitleSlot::Chart).as_deref(), Some("Old"));
        assert!(doc.set_title_text(TitleSlot::Chart, "New"));
        let xml = doc.to_xml();
        assert!(xml.contains("<d:r><d:t>New</d:t></d:r><d:r><d:t/></d:r>"));
    }

    #[test]
    fn test_title_default_namespace_on_paragraph() {
        let raw = r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:title><c:tx><c:rich><p xmlns="http://schemas.openxmlformats.org/drawingml/2006/main"><r><t>Plain</t></r></p></c:rich></c:tx></c:title></c:chart></c:chartSpace>"#;
        let doc = ChartDocument::parse(raw).unwrap();
        assert_eq!(doc.title_text(TitleSlot::Chart).as_deref(), Some("Plain"));
    }

    #[test]
    fn test_formula_title_falls_back_to_cached_value() {
        let raw = r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:title><c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>Cached</c:v></c:pt></c:strCache></c:strRef></c:tx></c:title></c:chart></c:chartSpace>"#;
        let doc = ChartDocument::parse(raw).unwrap();
        assert_eq!(doc.title_text(TitleSlot::Chart).as_deref(), Some("Cached"));
    }
}
