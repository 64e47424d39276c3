//! Excel (.xlsx) workbooks embedded behind charts.
//!
//! Every chart in a word-processing package points (through `externalData`)
//! at a spreadsheet package holding its data. This module keeps that
//! spreadsheet in step with the chart:
//!
//! - `cell`: A1 addressing, sheet-name quoting and formula range re-spanning
//! - `shared_strings`: the append-only shared strings table
//! - `workbook`: the embedded package, its first sheet and its parts
//! - `sync`: rewriting the data grid, shared strings and table parts
//!
//! # Example
//!
//! ```rust,ignore
//! use longan::ooxml::charts::{ChartData, ChartKind, Series};
//! use longan::ooxml::docx::ChartEditOptions;
//! use longan::ooxml::xlsx::sync_workbook;
//!
//! let bytes = std::fs::read("Microsoft_Excel_Worksheet.xlsx")?;
//! let data = ChartData::new(["Q1", "Q2"], vec![Series::new("Sales", vec![100.0, 150.0])]);
//! let (updated, report) = sync_workbook(&bytes, &data, ChartKind::Bar, &ChartEditOptions::default())?;
//! println!("data now spans {}", report.range);
//! ```

pub mod cell;
pub mod shared_strings;
pub mod sync;
pub mod workbook;

pub use cell::{CellRange, CellRef, column_to_letters, letters_to_column};
pub use shared_strings::SharedStringTable;
pub use sync::{CellValue, SyncReport, read_cell, sync_workbook};
pub use workbook::{EmbeddedWorkbook, SheetLocation};
