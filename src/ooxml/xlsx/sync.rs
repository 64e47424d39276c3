//! Mirroring chart data into the embedded workbook.
//!
//! The first worksheet holds the chart data as a grid anchored at `A1`:
//!
//! ```text
//!        A           B            C
//!   1   (kept)      Critical     Non-critical
//!   2   Device A    4            8
//!   3   Device B    3            7
//! ```
//!
//! `sheetData` is rebuilt on every sync. The previous data block is the
//! contiguous region anchored at `A1`: header cells run along row 1 from `B1`
//! and data rows follow until the first empty row. Cells of that block and of
//! the new grid are replaced, the `A1` corner cell is kept as it was, and
//! rewritten cells keep their style index. Every other cell survives; formulas
//! among them get their ranges re-spanned to the new data extent.

use crate::common::number::{format_number, parse_number};
use crate::common::xml::{Element, TagNaming, XmlDocument};
use crate::ooxml::charts::models::ChartData;
use crate::ooxml::charts::types::ChartKind;
use crate::ooxml::docx::options::ChartEditOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::PartStore;
use crate::ooxml::xlsx::cell::{CellRange, CellRef, respan_formula};
use crate::ooxml::xlsx::shared_strings::SharedStringTable;
use crate::ooxml::xlsx::workbook::EmbeddedWorkbook;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Worksheet children that precede `dimension`.
const BEFORE_DIMENSION: [&str; 1] = ["sheetPr"];
/// Worksheet children that precede `sheetData`.
const BEFORE_SHEET_DATA: [&str; 5] = ["sheetPr", "dimension", "sheetViews", "sheetFormatPr", "cols"];

/// A cell value as read back from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// What a sync changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Worksheet part that was rewritten
    pub sheet_part: String,
    /// Data block before the sync, if the sheet had one
    pub previous_range: Option<CellRange>,
    /// Data block after the sync (`A1` to the last value)
    pub range: CellRange,
    /// Entries appended to the shared strings table
    pub strings_appended: usize,
    /// Table parts resized
    pub tables_updated: usize,
}

/// Rewrite the ZIP bytes of an embedded workbook with new chart data.
///
/// Scatter charts get numeric cells in column A; all other kinds get text.
pub fn sync_workbook(
    bytes: &[u8],
    data: &ChartData,
    kind: ChartKind,
    options: &ChartEditOptions,
) -> Result<(Vec<u8>, SyncReport)> {
    data.validate()?;
    let mut workbook = EmbeddedWorkbook::from_bytes(bytes)?;
    let report = sync_embedded(&mut workbook, data, kind, options)?;
    Ok((workbook.to_bytes()?, report))
}

/// Rewrite an opened workbook in place.
pub fn sync_embedded(
    workbook: &mut EmbeddedWorkbook,
    data: &ChartData,
    kind: ChartKind,
    options: &ChartEditOptions,
) -> Result<SyncReport> {
    let sheet = workbook.first_sheet()?;
    let mut sheet_doc = workbook.package().read_xml(sheet.part.membername())?;
    let mut strings = workbook.read_shared_strings()?;

    let numeric_categories = !kind.supports_categories();
    let (previous_range, range) = write_grid(
        &mut sheet_doc,
        sheet.name.as_deref(),
        data,
        numeric_categories,
        strings.as_mut().map(|(_, table)| table),
    )?;

    let mut tables_updated = 0;
    if options.sync_table_parts {
        let headers: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        for table_part in workbook.table_parts(&sheet.part, &sheet_doc)? {
            let mut table_doc = workbook.package().read_xml(table_part.membername())?;
            if resize_table(&mut table_doc, &range, &headers)? {
                workbook
                    .package_mut()
                    .write_part(table_part.membername(), &table_doc.to_bytes())?;
                tables_updated += 1;
            }
        }
    }

    workbook
        .package_mut()
        .write_part(sheet.part.membername(), &sheet_doc.to_bytes())?;

    let mut strings_appended = 0;
    if let Some((part, mut table)) = strings {
        strings_appended = table.appended();
        workbook.package_mut().write_part(part.membername(), &table.to_bytes())?;
    }

    debug!(
        "synced worksheet {} to {} ({} strings appended, {} tables resized)",
        sheet.part, range, strings_appended, tables_updated
    );
    Ok(SyncReport {
        sheet_part: sheet.part.membername().to_string(),
        previous_range,
        range,
        strings_appended,
        tables_updated,
    })
}

/// Existing cells of the sheet, keyed by `(row, column)`.
type CellMap = BTreeMap<(u32, u32), Element>;

/// Rebuild `sheetData` of a worksheet for `data`.
///
/// `sheet_name` is the tab name of the worksheet, used to tell formulas over
/// its own data from ranges on other sheets. Returns the previous data block
/// and the new one.
pub fn write_grid(
    sheet: &mut XmlDocument,
    sheet_name: Option<&str>,
    data: &ChartData,
    numeric_categories: bool,
    mut strings: Option<&mut SharedStringTable>,
) -> Result<(Option<CellRange>, CellRange)> {
    let naming = TagNaming::of(sheet.root());
    if !naming.is(sheet.root(), "worksheet") {
        return Err(OoxmlError::Xml(format!(
            "worksheet part has root <{}>, expected <worksheet>",
            sheet.root().name()
        )));
    }
    let root = sheet.root_mut();
    let sheet_data_idx = match root.child_position(|e| naming.is(e, "sheetData")) {
        Some(i) => i,
        None => {
            let at = insertion_point(root, &naming, &BEFORE_SHEET_DATA);
            root.insert(at, Element::new(naming.qualify("sheetData")));
            at
        },
    };
    let Some(sheet_data) = root.at_path_mut(&[sheet_data_idx]) else {
        return Err(OoxmlError::Xml("worksheet has no sheetData".to_string()));
    };

    let old_rows = sheet_data.remove_children(|e| naming.is(e, "row"));
    let mut row_attributes: BTreeMap<u32, Vec<(String, String)>> = BTreeMap::new();
    let mut old_cells = CellMap::new();
    for (position, row) in old_rows.into_iter().enumerate() {
        let row_number = row
            .attr("r")
            .and_then(|r| r.trim().parse::<u32>().ok())
            .unwrap_or(position as u32 + 1);
        let mut next_col = 1;
        for cell in row.elements().filter(|e| naming.is(e, "c")) {
            let col = cell
                .attr("r")
                .and_then(CellRef::parse)
                .map_or(next_col, |r| r.col);
            next_col = col + 1;
            let mut cell = cell.clone();
            cell.set_attr("r", CellRef::new(col, row_number).to_string());
            old_cells.insert((row_number, col), cell);
        }
        let attributes = row
            .attributes()
            .iter()
            .filter(|(k, _)| k != "spans" && k != "r")
            .cloned()
            .collect();
        row_attributes.insert(row_number, attributes);
    }

    let is_formula = |cell: &Element| cell.child(|e| naming.is(e, "f")).is_some();
    let previous = previous_block(&old_cells, &naming);

    let last = CellRef::new(data.series.len() as u32 + 1, data.categories.len() as u32 + 1);
    let range = CellRange::new(CellRef::new(1, 1), last);

    let mut cells = CellMap::new();
    if let Some(corner) = old_cells.remove(&(1, 1)) {
        cells.insert((1, 1), corner);
    }
    for ((row, col), mut cell) in std::mem::take(&mut old_cells) {
        let at = CellRef::new(col, row);
        if range.contains(at) {
            old_cells.insert((row, col), cell);
            continue;
        }
        if is_formula(&cell) {
            if let Some(previous) = &previous {
                respan_cell(&mut cell, &naming, sheet_name, previous, &range);
            }
        } else if previous.is_some_and(|p| p.contains(at)) {
            continue;
        }
        cells.insert((row, col), cell);
    }

    let mut writer = CellWriter {
        naming: &naming,
        old_cells: &old_cells,
        strings: strings.as_deref_mut(),
    };
    for (i, series) in data.series.iter().enumerate() {
        let col = i as u32 + 2;
        cells.insert((1, col), writer.text(CellRef::new(col, 1), &series.name));
    }
    for (i, category) in data.categories.iter().enumerate() {
        let at = CellRef::new(1, i as u32 + 2);
        let cell = match numeric_categories.then(|| parse_number(category)).flatten() {
            Some(x) => writer.number(at, x),
            None => writer.text(at, category),
        };
        cells.insert((at.row, at.col), cell);
    }
    for (s, series) in data.series.iter().enumerate() {
        for (i, value) in series.values.iter().enumerate() {
            let at = CellRef::new(s as u32 + 2, i as u32 + 2);
            cells.insert((at.row, at.col), writer.number(at, *value));
        }
    }

    let mut extent = range;
    let mut rows: BTreeMap<u32, Vec<Element>> = BTreeMap::new();
    for ((row, col), cell) in cells {
        extent.end.row = extent.end.row.max(row);
        extent.end.col = extent.end.col.max(col);
        rows.entry(row).or_default().push(cell);
    }
    for (row_number, row_cells) in rows {
        let mut row = Element::new(naming.qualify("row")).with_attr("r", row_number.to_string());
        for (k, v) in row_attributes.remove(&row_number).unwrap_or_default() {
            row.set_attr(k, v);
        }
        for cell in row_cells {
            row.push(cell);
        }
        sheet_data.push(row);
    }

    set_dimension(root, &naming, &extent);
    Ok((previous, range))
}

fn insertion_point(root: &Element, naming: &TagNaming, before: &[&str]) -> usize {
    root.children()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.as_element().is_some_and(|e| naming.is_any(e, before)))
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0)
}

fn set_dimension(root: &mut Element, naming: &TagNaming, extent: &CellRange) {
    match root.child_mut(|e| naming.is(e, "dimension")) {
        Some(dimension) => dimension.set_attr("ref", extent.to_string()),
        None => {
            let at = insertion_point(root, naming, &BEFORE_DIMENSION);
            root.insert(
                at,
                Element::new(naming.qualify("dimension")).with_attr("ref", extent.to_string()),
            );
        },
    }
}

/// The data block a previous sync left behind: `A1` to the last header in
/// row 1 (from `B1` on, without gaps) and down to the last row before the
/// first row with no value in those columns. `None` when neither a header nor
/// a category is present.
fn previous_block(old_cells: &CellMap, naming: &TagNaming) -> Option<CellRange> {
    let has_value = |row: u32, col: u32| {
        old_cells.get(&(row, col)).is_some_and(|cell| {
            cell.child(|e| naming.is(e, "f")).is_none() && cell.child(|e| naming.is_any(e, &["v", "is"])).is_some()
        })
    };
    let mut last_col = 1;
    while has_value(1, last_col + 1) {
        last_col += 1;
    }
    let mut last_row = 1;
    while (1..=last_col).any(|col| has_value(last_row + 1, col)) {
        last_row += 1;
    }
    (last_col > 1 || last_row > 1).then(|| CellRange::new(CellRef::new(1, 1), CellRef::new(last_col, last_row)))
}

/// Re-span the formula of a kept cell; a changed formula drops its stale
/// cached value.
fn respan_cell(
    cell: &mut Element,
    naming: &TagNaming,
    sheet_name: Option<&str>,
    previous: &CellRange,
    range: &CellRange,
) {
    let Some(f) = cell.child_mut(|e| naming.is(e, "f")) else {
        return;
    };
    let old = f.text();
    let new = respan_formula(&old, sheet_name, previous, range);
    if new == old {
        return;
    }
    debug!("re-spanned formula {} -> {}", old, new);
    f.set_text(new);
    cell.remove_children(|e| naming.is(e, "v"));
}

struct CellWriter<'a> {
    naming: &'a TagNaming,
    old_cells: &'a CellMap,
    strings: Option<&'a mut SharedStringTable>,
}

impl CellWriter<'_> {
    fn cell(&self, at: CellRef) -> Element {
        let mut cell = Element::new(self.naming.qualify("c")).with_attr("r", at.to_string());
        if let Some(style) = self.old_cells.get(&(at.row, at.col)).and_then(|c| c.attr("s")) {
            cell.set_attr("s", style);
        }
        cell
    }

    fn number(&self, at: CellRef, value: f64) -> Element {
        self.cell(at)
            .with_child(Element::new(self.naming.qualify("v")).with_text(format_number(value)))
    }

    fn text(&mut self, at: CellRef, text: &str) -> Element {
        let cell = self.cell(at);
        match self.strings.as_deref_mut() {
            Some(table) => {
                let index = table.get_or_append(text);
                cell.with_attr("t", "s")
                    .with_child(Element::new(self.naming.qualify("v")).with_text(index.to_string()))
            },
            None => {
                let mut t = Element::new(self.naming.qualify("t")).with_text(text);
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    t.set_attr("xml:space", "preserve");
                }
                cell.with_attr("t", "inlineStr")
                    .with_child(Element::new(self.naming.qualify("is")).with_child(t))
            },
        }
    }
}

/// Resize a table part to `range` and rename its columns: the first column
/// keeps its name, the others take the series names.
///
/// Tables that do not start at `A1` are not the chart data and are left alone
/// (returns false).
pub fn resize_table(table: &mut XmlDocument, range: &CellRange, headers: &[&str]) -> Result<bool> {
    let naming = TagNaming::of(table.root());
    if !naming.is(table.root(), "table") {
        return Err(OoxmlError::Xml(format!(
            "table part has root <{}>, expected <table>",
            table.root().name()
        )));
    }
    let root = table.root_mut();
    let current = root.attr("ref").and_then(CellRange::parse);
    if current.is_none_or(|r| r.start != range.start) {
        warn!(
            "table {} does not cover the chart data block, left unchanged",
            root.attr("name").unwrap_or_default()
        );
        return Ok(false);
    }

    root.set_attr("ref", range.to_string());
    if let Some(filter) = root.child_mut(|e| naming.is(e, "autoFilter")) {
        filter.set_attr("ref", range.to_string());
    }

    let Some(columns) = root.child_mut(|e| naming.is(e, "tableColumns")) else {
        return Ok(true);
    };
    let mut existing = columns.remove_children(|e| naming.is(e, "tableColumn"));
    let first_name = existing
        .first()
        .and_then(|c| c.attr("name"))
        .unwrap_or("Category")
        .to_string();
    let mut names = vec![first_name];
    names.extend(headers.iter().map(|h| h.to_string()));
    let names = unique_column_names(names);

    let mut next_id = existing
        .iter()
        .filter_map(|c| c.attr("id").and_then(|id| id.parse::<u32>().ok()))
        .max()
        .unwrap_or(0)
        + 1;
    existing.truncate(names.len());
    let mut existing = existing.into_iter();
    for name in &names {
        let column = match existing.next() {
            Some(mut column) => {
                column.set_attr("name", name.as_str());
                column
            },
            None => {
                let column = Element::new(naming.qualify("tableColumn"))
                    .with_attr("id", next_id.to_string())
                    .with_attr("name", name.as_str());
                next_id += 1;
                column
            },
        };
        columns.push(column);
    }
    columns.set_attr("count", names.len().to_string());
    Ok(true)
}

/// Table column names must be unique; repeats get a numeric suffix.
fn unique_column_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 2;
        while out.iter().any(|o| o.eq_ignore_ascii_case(&candidate)) {
            candidate = format!("{name}{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

/// Value of one cell of a worksheet, resolving shared strings.
pub fn read_cell(sheet: &XmlDocument, at: CellRef, strings: Option<&SharedStringTable>) -> Option<CellValue> {
    let naming = TagNaming::of(sheet.root());
    let reference = at.to_string();
    let cell = sheet
        .root()
        .child(|e| naming.is(e, "sheetData"))?
        .elements()
        .filter(|row| naming.is(row, "row"))
        .flat_map(|row| row.elements())
        .find(|c| naming.is(c, "c") && c.attr("r") == Some(reference.as_str()))?;

    let value = || cell.child(|e| naming.is(e, "v")).map(Element::text);
    match cell.attr("t") {
        Some("s") => {
            let index = value()?.trim().parse::<usize>().ok()?;
            strings?.get(index).map(|s| CellValue::Text(s.to_string()))
        },
        Some("inlineStr") => cell
            .child(|e| naming.is(e, "is"))
            .map(|is| CellValue::Text(is.text())),
        Some("str") | Some("e") => value().map(CellValue::Text),
        _ => {
            let text = value()?;
            Some(parse_number(&text).map_or(CellValue::Text(text), CellValue::Number))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::charts::models::Series;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:C3"/><sheetData><row r="1" spans="1:3"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s" s="4"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row><row r="2" spans="1:3" ht="20" customHeight="1"><c r="A2" t="s"><v>3</v></c><c r="B2" s="7"><v>1</v></c><c r="C2"><v>2</v></c></row><row r="3"><c r="A3" t="s"><v>4</v></c><c r="B3"><v>3</v></c><c r="C3"><v>4</v></c></row><row r="5"><c r="B5"><f>SUM(B2:B3)</f><v>4</v></c><c r="E5"><f>C3*2</f><v>8</v></c></row></sheetData><tableParts count="0"/></worksheet>"#;

    const SST: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="5"><si><t>Region</t></si><si><t>Critical</t></si><si><t>Non-critical</t></si><si><t>Old 1</t></si><si><t>Old 2</t></si></sst>"#;

    fn data() -> ChartData {
        ChartData::new(
            ["Device A", "Device B", "Device C"],
            vec![
                Series::new("Critical", vec![4.0, 3.0, 2.0]),
                Series::new("Non-critical", vec![8.0, 7.0, 6.0]),
            ],
        )
    }

    fn cell(doc: &XmlDocument, reference: &str, strings: Option<&SharedStringTable>) -> Option<CellValue> {
        read_cell(doc, CellRef::parse(reference).unwrap(), strings)
    }

    #[test]
    fn test_grid_with_shared_strings() {
        let mut doc = XmlDocument::parse(SHEET).unwrap();
        let mut table = SharedStringTable::parse(SST.as_bytes()).unwrap();
        let (previous, range) = write_grid(&mut doc, Some("Sheet1"), &data(), false, Some(&mut table)).unwrap();
        assert_eq!(previous.unwrap().to_string(), "A1:C3");
        assert_eq!(range.to_string(), "A1:C4");

        let strings = Some(&table);
        assert_eq!(cell(&doc, "A1", strings), Some(CellValue::Text("Region".into())));
        assert_eq!(cell(&doc, "B1", strings), Some(CellValue::Text("Critical".into())));
        assert_eq!(cell(&doc, "A2", strings), Some(CellValue::Text("Device A".into())));
        assert_eq!(cell(&doc, "C4", strings), Some(CellValue::Number(6.0)));
        assert_eq!(cell(&doc, "B3", strings), Some(CellValue::Number(3.0)));

        // existing entries keep their index, new ones are appended
        assert_eq!(table.index_of("Critical"), Some(1));
        assert_eq!(table.index_of("Old 1"), Some(3));
        assert_eq!(table.index_of("Device A"), Some(5));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_grid_keeps_styles_and_row_attributes() {
        let mut doc = XmlDocument::parse(SHEET).unwrap();
        write_grid(&mut doc, Some("Sheet1"), &data(), false, None).unwrap();
        let xml = doc.to_xml();
        assert!(xml.contains(r#"<c r="B1" s="4" t="inlineStr"><is><t>Critical</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B2" s="7"><v>4</v></c>"#));
        assert!(xml.contains(r#"<row r="2" ht="20" customHeight="1">"#));
        assert!(!xml.contains("spans"));
        assert!(xml.contains(r#"<c r="A2" t="inlineStr"><is><t>Device A</t></is></c>"#));
    }

    #[test]
    fn test_formulas_outside_grid_are_respanned() {
        let mut doc = XmlDocument::parse(SHEET).unwrap();
        write_grid(&mut doc, Some("Sheet1"), &data(), false, None).unwrap();
        let xml = doc.to_xml();
        assert!(xml.contains(r#"<c r="B5"><f>SUM(B2:B4)</f></c>"#));
        // formula not addressing a range keeps its cached value
        assert!(xml.contains(r#"<c r="E5"><f>C3*2</f><v>8</v></c>"#));
        assert!(xml.contains(r#"<dimension ref="A1:E5"/>"#));
    }

    #[test]
    fn test_cells_outside_data_block_are_kept() {
        let raw = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="B1" t="inlineStr"><is><t>Critical</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Old 1</t></is></c><c r="B2"><v>1</v></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>Old 2</t></is></c><c r="B3"><v>2</v></c></row><row r="5"><c r="B5"><f>SUM(B2:B3)</f><v>3</v></c></row><row r="10"><c r="A10" t="inlineStr"><is><t>Source: survey</t></is></c></row></sheetData></worksheet>"#;
        let mut doc = XmlDocument::parse(raw).unwrap();
        let three = ChartData::new(
            ["Device A", "Device B", "Device C"],
            vec![Series::new("Critical", vec![4.0, 3.0, 2.0])],
        );
        let (previous, range) = write_grid(&mut doc, Some("Sheet1"), &three, false, None).unwrap();
        assert_eq!(previous.unwrap().to_string(), "A1:B3");
        assert_eq!(range.to_string(), "A1:B4");

        let xml = doc.to_xml();
        assert!(xml.contains(r#"<c r="B5"><f>SUM(B2:B4)</f></c>"#));
        assert_eq!(cell(&doc, "A10", None), Some(CellValue::Text("Source: survey".into())));
        assert_eq!(cell(&doc, "B4", None), Some(CellValue::Number(2.0)));
    }

    #[test]
    fn test_formulas_on_other_sheets_are_not_respanned() {
        let raw = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="B1" t="inlineStr"><is><t>Critical</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Old 1</t></is></c><c r="B2"><v>1</v></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>Old 2</t></is></c><c r="B3"><v>2</v></c></row><row r="6"><c r="B6"><f>SUM(Other!B2:B3)</f><v>9</v></c><c r="C6"><f>SUM(Sheet1!B2:B3)</f><v>3</v></c></row></sheetData></worksheet>"#;
        let mut doc = XmlDocument::parse(raw).unwrap();
        let three = ChartData::new(["A", "B", "C"], vec![Series::new("Critical", vec![4.0, 3.0, 2.0])]);
        write_grid(&mut doc, Some("Sheet1"), &three, false, None).unwrap();
        let xml = doc.to_xml();
        assert!(xml.contains(r#"<c r="B6"><f>SUM(Other!B2:B3)</f><v>9</v></c>"#));
        assert!(xml.contains(r#"<c r="C6"><f>SUM(Sheet1!B2:B4)</f></c>"#));
    }

    #[test]
    fn test_grid_shrinks() {
        let mut doc = XmlDocument::parse(SHEET).unwrap();
        let small = ChartData::new(["Only"], vec![Series::new("Critical", vec![9.0])]);
        let (_, range) = write_grid(&mut doc, Some("Sheet1"), &small, false, None).unwrap();
        assert_eq!(range.to_string(), "A1:B2");
        assert_eq!(cell(&doc, "C2", None), None);
        assert_eq!(cell(&doc, "A3", None), None);
        assert_eq!(cell(&doc, "B2", None), Some(CellValue::Number(9.0)));
        let xml = doc.to_xml();
        assert!(xml.contains("<f>SUM(B2:B2)</f>"));
    }

    #[test]
    fn test_scatter_categories_are_numbers() {
        let mut doc = XmlDocument::parse(SHEET).unwrap();
        let xy = ChartData::new(["0.5", "1.5"], vec![Series::new("Temp", vec![20.0, 21.0])]);
        write_grid(&mut doc, Some("Sheet1"), &xy, true, None).unwrap();
        assert_eq!(cell(&doc, "A3", None), Some(CellValue::Number(1.5)));
    }

    #[test]
    fn test_missing_sheet_data_and_dimension_are_created() {
        let mut doc = XmlDocument::parse(r#"<x:worksheet xmlns:x="urn:x"><x:sheetPr/></x:worksheet>"#).unwrap();
        write_grid(&mut doc, Some("Sheet1"), &data(), false, None).unwrap();
        let xml = doc.to_xml();
        assert!(xml.contains(r#"<x:sheetPr/><x:dimension ref="A1:C4"/><x:sheetData><x:row r="1">"#));
        assert_eq!(cell(&doc, "C4", None), Some(CellValue::Number(6.0)));
    }

    #[test]
    fn test_resize_table() {
        let mut table = XmlDocument::parse(
            r#"<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="1" name="Table1" ref="A1:D3"><autoFilter ref="A1:D3"/><tableColumns count="4"><tableColumn id="1" name="Region"/><tableColumn id="2" name="Critical"/><tableColumn id="3" name="Old"/><tableColumn id="4" name="Older"/></tableColumns></table>"#,
        )
        .unwrap();
        let range = CellRange::parse("A1:C4").unwrap();
        assert!(resize_table(&mut table, &range, &["Critical", "critical"]).unwrap());
        let xml = table.to_xml();
        assert!(xml.contains(r#"ref="A1:C4"><autoFilter ref="A1:C4"/>"#));
        assert!(xml.contains(
            r#"<tableColumns count="3"><tableColumn id="1" name="Region"/><tableColumn id="2" name="Critical"/><tableColumn id="3" name="critical2"/></tableColumns>"#
        ));
    }

    #[test]
    fn test_resize_table_skips_unrelated_tables() {
        let raw = r#"<table ref="F1:G4"><tableColumns count="1"><tableColumn id="1" name="Notes"/></tableColumns></table>"#;
        let mut table = XmlDocument::parse(raw).unwrap();
        let range = CellRange::parse("A1:C4").unwrap();
        assert!(!resize_table(&mut table, &range, &["Critical"]).unwrap());
        assert!(table.to_xml().contains(r#"ref="F1:G4""#));
    }

    #[test]
    fn test_rejects_non_worksheet() {
        let mut doc = XmlDocument::parse("<sst/>").unwrap();
        assert!(write_grid(&mut doc, Some("Sheet1"), &data(), false, None).is_err());
    }
}
