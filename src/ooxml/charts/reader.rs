//! Chart XML reader.
//!
//! Reads a chart part into a [`ChartView`]. The read path is lenient about
//! incomplete documents: missing titles read as empty text, value caches
//! shorter than the category cache are padded with zero and longer ones
//! truncated. Only a missing chart root, an unsupported chart type and
//! non-numeric scatter X values are errors.

use crate::common::number::parse_number;
use crate::common::xml::Element;
use crate::ooxml::charts::chart::{ChartDocument, ChartNames, TitleSlot};
use crate::ooxml::charts::models::{Categories, ChartView, Series};
use crate::ooxml::charts::types::{AxisType, ChartKind};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::{MAX_ROW, sheet_of_formula};
use log::warn;

/// Data-source wrappers accepted inside `cat`/`xVal`, with the cache element
/// each one holds (`None` for literals, which are their own cache).
const CATEGORY_SOURCES: [(&str, Option<&str>); 5] = [
    ("strRef", Some("strCache")),
    ("numRef", Some("numCache")),
    ("multiLvlStrRef", Some("multiLvlStrCache")),
    ("strLit", None),
    ("numLit", None),
];

const VALUE_SOURCES: [(&str, Option<&str>); 2] = [("numRef", Some("numCache")), ("numLit", None)];

/// Parse chart XML into a [`ChartView`].
///
/// # Errors
/// [`OoxmlError::MissingChartRoot`], [`OoxmlError::UnsupportedChartType`],
/// [`OoxmlError::NonNumericCategory`] for scatter charts, and
/// [`OoxmlError::Xml`] for malformed XML.
pub fn parse_chart(raw: &str) -> Result<ChartView> {
    let doc = ChartDocument::parse(raw)?;
    read_view(&doc)
}

/// Read the view out of an already parsed chart.
pub fn read_view(doc: &ChartDocument) -> Result<ChartView> {
    let names = doc.names();
    let (kind, group) = doc.type_group()?;
    let (cat_local, val_local) = kind.data_element_names();

    let series_elements: Vec<&Element> = group.elements().filter(|e| names.is(e, "ser")).collect();

    let raw_categories: Vec<Option<String>> = series_elements
        .first()
        .and_then(|ser| data_block(ser, names, cat_local, "cat"))
        .map(|block| read_points(block, names, &CATEGORY_SOURCES))
        .unwrap_or_default();

    let mut series = Vec::with_capacity(series_elements.len());
    for ser in &series_elements {
        let name = series_name(ser, names);
        let values: Vec<f64> = data_block(ser, names, val_local, "val")
            .map(|block| read_points(block, names, &VALUE_SOURCES))
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, point)| match point {
                None => 0.0,
                Some(text) => parse_number(&text).unwrap_or_else(|| {
                    warn!("series '{}' point {} has non-numeric cached value '{}', reading 0", name, i, text);
                    0.0
                }),
            })
            .collect();
        series.push(Series { name, values });
    }

    // Without a category cache the chart plots against 1..n.
    let raw_categories = if raw_categories.is_empty() {
        let n = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        (1..=n).map(|i| Some(i.to_string())).collect()
    } else {
        raw_categories
    };

    let categories = if kind.supports_categories() {
        Categories::Labels(raw_categories.into_iter().map(Option::unwrap_or_default).collect())
    } else {
        let mut xs = Vec::with_capacity(raw_categories.len());
        for (index, point) in raw_categories.into_iter().enumerate() {
            let x = match point {
                None => 0.0,
                Some(text) => parse_number(&text).ok_or(OoxmlError::NonNumericCategory { index, value: text })?,
            };
            xs.push(x);
        }
        Categories::XValues(xs)
    };

    let expected = categories.len();
    for s in &mut series {
        if s.values.len() != expected {
            warn!(
                "series '{}' caches {} values for {} categories, {}",
                s.name,
                s.values.len(),
                expected,
                if s.values.len() < expected { "padding with 0" } else { "truncating" }
            );
            s.values.resize(expected, 0.0);
        }
    }

    let sheet_name = series_elements
        .iter()
        .flat_map(|ser| ser.find_all(|e| names.is(e, "f")))
        .find_map(|f| sheet_of_formula(&f.text()));

    Ok(ChartView {
        kind,
        title: doc.title_text(TitleSlot::Chart).unwrap_or_default(),
        category_axis_title: doc.title_text(TitleSlot::Axis(AxisType::Category)).unwrap_or_default(),
        value_axis_title: doc.title_text(TitleSlot::Axis(AxisType::Value)).unwrap_or_default(),
        categories,
        series,
        sheet_name,
        external_data: doc.external_data_id().map(str::to_string),
    })
}

/// The category or value block of a series, preferring the element the chart
/// kind calls for (`xVal`) over the generic one (`cat`).
fn data_block<'a>(ser: &'a Element, names: &ChartNames, preferred: &str, fallback: &str) -> Option<&'a Element> {
    ser.child(|e| names.is(e, preferred))
        .or_else(|| ser.child(|e| names.is(e, fallback)))
}

/// Series name from `tx`: the cached string of a `strRef`, or a literal `v`.
fn series_name(ser: &Element, names: &ChartNames) -> String {
    ser.child(|e| names.is(e, "tx"))
        .and_then(|tx| tx.find(|e| names.is(e, "v")))
        .map(Element::text)
        .unwrap_or_default()
}

/// Points of a data block, placed by `pt/@idx`. `ptCount` fixes the length
/// when present; indexes without a point read as `None`. No block is longer
/// than a worksheet column.
fn read_points(block: &Element, names: &ChartNames, sources: &[(&str, Option<&str>)]) -> Vec<Option<String>> {
    let cache = sources.iter().find_map(|(source, cache)| {
        let source_el = block.child(|e| names.is(e, source))?;
        match cache {
            Some(cache) => source_el.find(|e| names.is(e, cache)),
            None => Some(source_el),
        }
    });
    let Some(mut cache) = cache else {
        return Vec::new();
    };
    // Multi-level caches keep one `lvl` per level; the first is the innermost.
    if let Some(level) = cache.child(|e| names.is(e, "lvl")) {
        cache = level;
    }

    let declared = cache
        .child(|e| names.is(e, "ptCount"))
        .and_then(|e| e.attr_local("val"))
        .and_then(|v| v.trim().parse::<usize>().ok());

    let mut points: Vec<(usize, String)> = Vec::new();
    for (position, pt) in cache.elements().filter(|e| names.is(e, "pt")).enumerate() {
        let idx = pt
            .attr_local("idx")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(position);
        let text = pt.child(|e| names.is(e, "v")).map(Element::text).unwrap_or_default();
        points.push((idx, text));
    }

    let len = declared.unwrap_or_else(|| points.iter().map(|(i, _)| i.saturating_add(1)).max().unwrap_or(0));
    let limit = MAX_ROW as usize;
    if len > limit {
        warn!("chart cache claims {} points, reading the first {}", len, limit);
    }
    let mut out = vec![None; len.min(limit)];
    for (idx, text) in points {
        if let Some(slot) = out.get_mut(idx) {
            *slot = Some(text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR_CHART: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><c:chart><c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>Findings</a:t></a:r></a:p></c:rich></c:tx></c:title><c:plotArea><c:barChart><c:barDir val="col"/><c:grouping val="clustered"/><c:varyColors val="0"/><c:ser><c:idx val="0"/><c:order val="0"/><c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>Critical</c:v></c:pt></c:strCache></c:strRef></c:tx><c:cat><c:strRef><c:f>Sheet1!$A$2:$A$3</c:f><c:strCache><c:ptCount val="2"/><c:pt idx="0"><c:v>Old 1</c:v></c:pt><c:pt idx="1"><c:v>Old 2</c:v></c:pt></c:strCache></c:strRef></c:cat><c:val><c:numRef><c:f>Sheet1!$B$2:$B$3</c:f><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="2"/><c:pt idx="0"><c:v>1</c:v></c:pt><c:pt idx="1"><c:v>2</c:v></c:pt></c:numCache></c:numRef></c:val></c:ser><c:ser><c:idx val="1"/><c:order val="1"/><c:tx><c:v>Non-critical</c:v></c:tx><c:cat><c:strRef><c:f>Sheet1!$A$2:$A$3</c:f></c:strRef></c:cat><c:val><c:numRef><c:f>Sheet1!$C$2:$C$3</c:f><c:numCache><c:ptCount val="2"/><c:pt idx="1"><c:v>5.5</c:v></c:pt></c:numCache></c:numRef></c:val></c:ser><c:gapWidth val="150"/><c:axId val="1"/><c:axId val="2"/></c:barChart><c:catAx><c:axId val="1"/><c:title><c:tx><c:rich><a:p><a:r><a:t>Devices</a:t></a:r></a:p></c:rich></c:tx></c:title></c:catAx><c:valAx><c:axId val="2"/></c:valAx></c:plotArea></c:chart><c:externalData r:id="rId2"><c:autoUpdate val="0"/></c:externalData></c:chartSpace>"#;

    #[test]
    fn test_parse_bar_chart() {
        let view = parse_chart(BAR_CHART).unwrap();
        assert_eq!(view.kind, ChartKind::Bar);
        assert_eq!(view.title, "Findings");
        assert_eq!(view.category_axis_title, "Devices");
        assert_eq!(view.value_axis_title, "");
        assert_eq!(view.categories, Categories::Labels(vec!["Old 1".into(), "Old 2".into()]));
        assert_eq!(view.series.len(), 2);
        assert_eq!(view.series[0], Series::new("Critical", vec![1.0, 2.0]));
        // gap at idx 0 reads as zero
        assert_eq!(view.series[1], Series::new("Non-critical", vec![0.0, 5.5]));
        assert_eq!(view.sheet_name.as_deref(), Some("Sheet1"));
        assert_eq!(view.external_data.as_deref(), Some("rId2"));
    }

    #[test]
    fn test_parse_unprefixed_chart() {
        let raw = r#"<chartSpace xmlns="http://schemas.openxmlformats.org/drawingml/2006/chart"><chart><plotArea><lineChart><ser><tx><v>Trend</v></tx><cat><strLit><ptCount val="3"/><pt idx="0"><v>Q1</v></pt><pt idx="2"><v>Q3</v></pt></strLit></cat><val><numLit><pt idx="0"><v>1</v></pt><pt idx="1"><v>2</v></pt><pt idx="2"><v>3</v></pt><pt idx="3"><v>4</v></pt></numLit></val></ser></lineChart></plotArea></chart></chartSpace>"#;
        let view = parse_chart(raw).unwrap();
        assert_eq!(view.kind, ChartKind::Line);
        assert_eq!(view.title, "");
        assert_eq!(view.categories, Categories::Labels(vec!["Q1".into(), "".into(), "Q3".into()]));
        // four cached values for three categories: truncated
        assert_eq!(view.series[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(view.sheet_name, None);
    }

    #[test]
    fn test_parse_scatter_numeric_x_values() {
        let raw = r#"<c:chartSpace xmlns:c="urn:c"><c:chart><c:plotArea><c:scatterChart><c:scatterStyle val="lineMarker"/><c:ser><c:tx><c:v>Temp</c:v></c:tx><c:xVal><c:numRef><c:f>'Raw Data'!$A$2:$A$3</c:f><c:numCache><c:ptCount val="2"/><c:pt idx="0"><c:v>0.5</c:v></c:pt><c:pt idx="1"><c:v>1.5</c:v></c:pt></c:numCache></c:numRef></c:xVal><c:yVal><c:numRef><c:numCache><c:ptCount val="2"/><c:pt idx="0"><c:v>20</c:v></c:pt></c:numCache></c:numRef></c:yVal></c:ser></c:scatterChart><c:valAx><c:axPos val="l"/><c:title><c:tx><c:rich><a:p xmlns:a="urn:a"><a:r><a:t>Degrees</a:t></a:r></a:p></c:rich></c:tx></c:title></c:valAx><c:valAx><c:axPos val="b"/><c:title><c:tx><c:rich><a:p xmlns:a="urn:a"><a:r><a:t>Hours</a:t></a:r></a:p></c:rich></c:tx></c:title></c:valAx></c:plotArea></c:chart></c:chartSpace>"#;
        let view = parse_chart(raw).unwrap();
        assert_eq!(view.kind, ChartKind::Scatter);
        assert_eq!(view.categories, Categories::XValues(vec![0.5, 1.5]));
        assert_eq!(view.series[0].values, vec![20.0, 0.0]);
        assert_eq!(view.category_axis_title, "Hours");
        assert_eq!(view.value_axis_title, "Degrees");
        assert_eq!(view.sheet_name.as_deref(), Some("Raw Data"));
    }

    #[test]
    fn test_scatter_non_numeric_category_is_error() {
        let raw = r#"<c:chartSpace xmlns:c="urn:c"><c:chart><c:plotArea><c:scatterChart><c:ser><c:xVal><c:strRef><c:strCache><c:pt idx="0"><c:v>1</c:v></c:pt><c:pt idx="1"><c:v>Device B</c:v></c:pt></c:strCache></c:strRef></c:xVal></c:ser></c:scatterChart></c:plotArea></c:chart></c:chartSpace>"#;
        match parse_chart(raw) {
            Err(OoxmlError::NonNumericCategory { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "Device B");
            },
            other => panic!("expected NonNumericCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(parse_chart("<w:document/>"), Err(OoxmlError::MissingChartRoot)));
        let radar = r#"<c:chartSpace xmlns:c="urn:c"><c:chart><c:plotArea><c:radarChart/></c:plotArea></c:chart></c:chartSpace>"#;
        assert!(matches!(parse_chart(radar), Err(OoxmlError::UnsupportedChartType)));
        assert!(matches!(parse_chart("<c:chartSpace>"), Err(OoxmlError::Xml(_))));
    }

    #[test]
    fn test_axis_title_is_not_chart_title() {
        let raw = r#"<c:chartSpace xmlns:c="urn:c" xmlns:a="urn:a"><c:chart><c:plotArea><c:pieChart><c:ser><c:tx><c:v>S</c:v></c:tx><c:cat><c:strLit><c:pt idx="0"><c:v>x</c:v></c:pt></c:strLit></c:cat><c:val><c:numLit><c:pt idx="0"><c:v>1</c:v></c:pt></c:numLit></c:val></c:ser></c:pieChart><c:catAx><c:title><c:tx><c:rich><a:p><a:r><a:t>Axis</a:t></a:r></a:p></c:rich></c:tx></c:title></c:catAx></c:plotArea></c:chart></c:chartSpace>"#;
        let view = parse_chart(raw).unwrap();
        assert_eq!(view.title, "");
        assert_eq!(view.category_axis_title, "Axis");
    }

    #[test]
    fn test_oversized_point_count_is_capped() {
        let raw = r#"<c:chartSpace xmlns:c="urn:c"><c:chart><c:plotArea><c:pieChart><c:ser><c:tx><c:v>S</c:v></c:tx><c:cat><c:strLit><c:ptCount val="4000000000000"/><c:pt idx="0"><c:v>x</c:v></c:pt><c:pt idx="9000000000000"><c:v>far</c:v></c:pt></c:strLit></c:cat><c:val><c:numLit><c:pt idx="0"><c:v>1</c:v></c:pt></c:numLit></c:val></c:ser></c:pieChart></c:plotArea></c:chart></c:chartSpace>"#;
        let view = parse_chart(raw).unwrap();
        assert_eq!(view.categories.len(), MAX_ROW as usize);
        assert_eq!(view.categories.labels()[0], "x");
        assert_eq!(view.series[0].values.len(), MAX_ROW as usize);
        assert_eq!(view.series[0].values[0], 1.0);
    }
}
