//! Chart XML writer.
//!
//! Rewrites the series of an existing chart part from a [`ChartData`]. Every
//! `ser` block of the chart-type element is replaced; the elements around the
//! series (`barDir`, `gapWidth`, `dLbls`, `axId`, ...) keep their place and
//! content. Series formulas address the grid the workbook synchronizer
//! writes: names in row 1 from column B, categories in column A from row 2,
//! values below each name.

use crate::common::number::{format_number, parse_number};
use crate::common::xml::Element;
use crate::ooxml::charts::chart::{ChartDocument, ChartNames, TitleSlot};
use crate::ooxml::charts::models::{ChartData, TitleOutcome, UpdateReport};
use crate::ooxml::charts::types::{AxisType, ChartKind};
use crate::ooxml::docx::options::ChartEditOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::{CellRange, CellRef, quote_sheet_name, sheet_of_formula};
use log::{debug, warn};

/// Series children carried over from the old series at the same position,
/// in the order they precede the data blocks.
const CARRIED_BEFORE_DATA: [&str; 9] = [
    "spPr",
    "invertIfNegative",
    "pictureOptions",
    "marker",
    "explosion",
    "dPt",
    "dLbls",
    "trendline",
    "errBars",
];

/// Series children carried over that follow the data blocks.
const CARRIED_AFTER_DATA: [&str; 2] = ["shape", "smooth"];

/// Rewrite chart XML with new data.
///
/// Returns the new XML and a report of what was written. The data is
/// validated before the XML is even parsed.
///
/// # Errors
/// [`OoxmlError::Validation`] for inconsistent data, the parse errors of
/// [`ChartDocument::parse`], [`OoxmlError::UnsupportedChartType`], and
/// [`OoxmlError::NonNumericCategory`] when a scatter chart gets textual X values.
pub fn update_chart(raw: &str, data: &ChartData, options: &ChartEditOptions) -> Result<(String, UpdateReport)> {
    data.validate()?;
    let mut doc = ChartDocument::parse(raw)?;
    let report = apply_update(&mut doc, data, None, options)?;
    Ok((doc.to_xml(), report))
}

/// Apply new data to a parsed chart in place.
///
/// Series formulas name `sheet_name` when given; otherwise the sheet of the
/// chart's existing formulas, and failing that the configured default.
pub fn apply_update(
    doc: &mut ChartDocument,
    data: &ChartData,
    sheet_name: Option<&str>,
    options: &ChartEditOptions,
) -> Result<UpdateReport> {
    data.validate()?;
    let names = doc.names().clone();
    let (kind, group_path) = doc.type_group_path()?;

    let x_values = if kind.supports_categories() {
        None
    } else {
        Some(numeric_categories(&data.categories)?)
    };

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => {
            let group = doc.root().at_path(&group_path).ok_or(OoxmlError::UnsupportedChartType)?;
            group
                .find_all(|e| names.is(e, "f"))
                .into_iter()
                .find_map(|f| sheet_of_formula(&f.text()))
                .unwrap_or_else(|| options.default_sheet_name.clone())
        },
    };
    let sheet = quote_sheet_name(&sheet);

    let group = doc
        .root_mut()
        .at_path_mut(&group_path)
        .ok_or(OoxmlError::UnsupportedChartType)?;
    let first_position = group.child_position(|e| names.is(e, "ser"));
    let old_series = group.remove_children(|e| names.is(e, "ser"));

    let rows = data.categories.len() as u32;
    let new_series: Vec<Element> = data
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            let block = SeriesBlock {
                kind,
                names: &names,
                sheet: &sheet,
                index: i,
                rows,
                number_format: &options.number_format,
            };
            block.build(&series.name, &series.values, &data.categories, x_values.as_deref(), old_series.get(i))
        })
        .collect();

    match first_position {
        Some(position) => {
            for (offset, ser) in new_series.into_iter().enumerate() {
                group.insert(position + offset, ser);
            }
        },
        None => {
            let leading = kind.leading_elements();
            let anchor = group
                .children()
                .iter()
                .enumerate()
                .filter(|(_, n)| n.as_element().is_some_and(|e| names.chart.is_any(e, leading)))
                .map(|(i, _)| i)
                .last();
            match anchor {
                Some(i) => group.insert_after(i, new_series),
                None => {
                    for (offset, ser) in new_series.into_iter().enumerate() {
                        group.insert(offset, ser);
                    }
                },
            }
        },
    }

    let report = UpdateReport {
        kind,
        series_written: data.series.len(),
        series_replaced: old_series.len(),
        title: apply_title(doc, TitleSlot::Chart, data.title.as_deref()),
        category_axis_title: apply_title(
            doc,
            TitleSlot::Axis(AxisType::Category),
            data.category_axis_title.as_deref(),
        ),
        value_axis_title: apply_title(doc, TitleSlot::Axis(AxisType::Value), data.value_axis_title.as_deref()),
        workbook_synced: false,
    };
    debug!(
        "rewrote {} chart: {} series replaced by {}",
        kind, report.series_replaced, report.series_written
    );
    Ok(report)
}

/// Scatter X values; the first non-numeric category is an error.
pub fn numeric_categories(categories: &[String]) -> Result<Vec<f64>> {
    categories
        .iter()
        .enumerate()
        .map(|(index, text)| {
            parse_number(text).ok_or_else(|| OoxmlError::NonNumericCategory {
                index,
                value: text.clone(),
            })
        })
        .collect()
}

fn apply_title(doc: &mut ChartDocument, slot: TitleSlot, text: Option<&str>) -> TitleOutcome {
    let Some(text) = text else {
        return TitleOutcome::NotRequested;
    };
    if doc.set_title_text(slot, text) {
        TitleOutcome::Updated
    } else {
        warn!("{:?} title requested but the chart has no title text to replace; left unchanged", slot);
        TitleOutcome::AnchorMissing
    }
}

/// Everything needed to generate one `ser` element.
struct SeriesBlock<'a> {
    kind: ChartKind,
    names: &'a ChartNames,
    sheet: &'a str,
    index: usize,
    rows: u32,
    number_format: &'a str,
}

impl SeriesBlock<'_> {
    fn el(&self, local: &str) -> Element {
        Element::new(self.names.qualify(local))
    }

    fn val(&self, local: &str, value: impl Into<String>) -> Element {
        self.el(local).with_attr("val", value)
    }

    fn formula(&self, range: impl std::fmt::Display) -> Element {
        self.el("f").with_text(format!("{}!{}", self.sheet, range))
    }

    fn column_range(&self, col: u32) -> String {
        CellRange::new(CellRef::new(col, 2), CellRef::new(col, self.rows + 1)).absolute()
    }

    fn points(&self, texts: impl IntoIterator<Item = String>) -> impl Iterator<Item = Element> {
        texts.into_iter().enumerate().map(|(i, text)| {
            self.el("pt")
                .with_attr("idx", i.to_string())
                .with_child(self.el("v").with_text(text))
        })
    }

    fn str_ref(&self, range: String, texts: &[String]) -> Element {
        let mut cache = self.el("strCache").with_child(self.val("ptCount", texts.len().to_string()));
        for pt in self.points(texts.iter().cloned()) {
            cache.push(pt);
        }
        self.el("strRef").with_child(self.formula(range)).with_child(cache)
    }

    fn num_ref(&self, range: String, values: &[f64]) -> Element {
        let mut cache = self
            .el("numCache")
            .with_child(self.el("formatCode").with_text(self.number_format))
            .with_child(self.val("ptCount", values.len().to_string()));
        for pt in self.points(values.iter().map(|v| format_number(*v))) {
            cache.push(pt);
        }
        self.el("numRef").with_child(self.formula(range)).with_child(cache)
    }

    fn carried<'o>(&self, old: Option<&'o Element>, locals: &[&str]) -> Vec<&'o Element> {
        let Some(old) = old else {
            return Vec::new();
        };
        locals
            .iter()
            .flat_map(|local| old.elements().filter(move |e| self.names.is(e, local)))
            .collect()
    }

    fn build(
        &self,
        name: &str,
        values: &[f64],
        categories: &[String],
        x_values: Option<&[f64]>,
        old: Option<&Element>,
    ) -> Element {
        let position = self.index.to_string();
        let value_col = self.index as u32 + 2;
        let (cat_local, val_local) = self.kind.data_element_names();

        let name_cell = CellRef::new(value_col, 1).absolute();
        let mut ser = self
            .el("ser")
            .with_child(self.val("idx", position.clone()))
            .with_child(self.val("order", position))
            .with_child(self.el("tx").with_child(self.str_ref(name_cell, &[name.to_string()])));

        for styling in self.carried(old, &CARRIED_BEFORE_DATA) {
            ser.push(styling.clone());
        }

        let category_block = match x_values {
            Some(xs) => self.num_ref(self.column_range(1), xs),
            None => self.str_ref(self.column_range(1), categories),
        };
        ser.push(self.el(cat_local).with_child(category_block));
        ser.push(self.el(val_local).with_child(self.num_ref(self.column_range(value_col), values)));

        for trailing in self.carried(old, &CARRIED_AFTER_DATA) {
            ser.push(trailing.clone());
        }
        ser
    }
}
