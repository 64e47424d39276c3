//! Longan - chart and embedded-workbook synchronization for Office Open XML
//!
//! A chart inside a `.docx` package carries its data twice: once as the cached
//! values in `word/charts/chartN.xml` and once as cells of an embedded `.xlsx`
//! workbook. This library rewrites both together so Word renders the new data
//! and "Edit Data" opens a workbook that agrees with it.
//!
//! # Features
//!
//! - **Chart parsing**: read categories, series and titles out of bar, line,
//!   area, pie and scatter charts
//! - **Chart mutation**: replace the series of a chart while keeping its
//!   styling, layout and formatting
//! - **Workbook sync**: rewrite the data grid, shared strings and table parts
//!   of the embedded workbook
//! - **Chart duplication**: copy a chart, its workbook and its drawing with
//!   freshly allocated identifiers
//!
//! # Example - Updating a chart
//!
//! ```no_run
//! use longan::ooxml::charts::{ChartData, Series};
//! use longan::ooxml::docx::ChartEditor;
//! use longan::ooxml::opc::MemPackage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("report.docx")?;
//! let mut editor = ChartEditor::new(MemPackage::from_zip(&bytes)?);
//!
//! let data = ChartData::new(
//!     ["Device A", "Device B", "Device C"],
//!     vec![
//!         Series::new("Critical", vec![4.0, 3.0, 6.0]),
//!         Series::new("High", vec![2.0, 5.0, 1.0]),
//!     ],
//! )
//! .with_title("Findings by device");
//!
//! let report = editor.update_chart(1, &data)?;
//! println!("wrote {} series, workbook synced: {}", report.series_written, report.workbook_synced);
//!
//! std::fs::write("report-updated.docx", editor.into_inner().to_zip()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Working on a single chart part
//!
//! ```no_run
//! use longan::ooxml::charts::{parse_chart, update_chart, ChartData, Series};
//! use longan::ooxml::docx::ChartEditOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = std::fs::read_to_string("chart1.xml")?;
//! println!("before: {:?}", parse_chart(&raw)?.series);
//!
//! let data = ChartData::new(["Q1", "Q2"], vec![Series::new("Sales", vec![100.0, 150.0])]);
//! let (updated, _) = update_chart(&raw, &data, &ChartEditOptions::default())?;
//! std::fs::write("chart1.xml", updated)?;
//! # Ok(())
//! # }
//! ```

/// Shared building blocks: the XML element tree, identifier allocation and
/// number formatting.
pub mod common;

/// OOXML (Office Open XML) chart engine
///
/// This module provides the package layer, the chart parser and writer, the
/// embedded workbook synchronizer and the chart editor for `.docx` packages.
pub mod ooxml;

// Re-export commonly used types for convenience
pub use ooxml::charts::{ChartData, ChartView, Series};
pub use ooxml::docx::{ChartEditOptions, ChartEditor};
pub use ooxml::{OoxmlError, Result};
