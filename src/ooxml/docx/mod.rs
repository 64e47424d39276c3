//! Word (.docx) chart editing.
//!
//! A word-processing package stores each chart as `word/charts/chartN.xml`,
//! references it from `word/document.xml` through a `c:chart` drawing, and
//! links it to an embedded workbook holding the same data.
//!
//! # Architecture
//!
//! - `ChartEditor`: reads, updates and copies charts of a package
//! - `ChartEditOptions`: configuration for updates and copies
//! - `drawing`: locating and generating the inline chart drawing
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::ooxml::docx::ChartEditor;
//! use longan::ooxml::opc::DirPackage;
//!
//! // Edit an extracted package in place
//! let editor = ChartEditor::new(DirPackage::open("report")?);
//! for index in editor.chart_indices()? {
//!     let view = editor.chart_data(index)?;
//!     println!("chart {}: {:?} with {} series", index, view.kind, view.series.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod drawing;
pub mod editor;
pub mod options;


pub use editor::{ChartEditor, WorkbookLink};
pub use options::ChartEditOptions;

/// Directory holding chart parts, as a member-name prefix.
pub const CHARTS_DIR: &str = "word/charts/";

/// The main document part.
pub const DOCUMENT_PART: &str = "/word/document.xml";
