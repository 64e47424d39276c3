//! Office Open XML (OOXML) chart engine.
//!
//! # Architecture
//!
//! The module is organized into several layers:
//!
//! 1. **OPC Layer** (`opc`): part names, relationships, content types and
//!    the [`opc::PartStore`] backends
//! 2. **Shared Utilities** (`error`): the error type shared by every layer
//! 3. **Format-Specific Modules**:
//!    - `charts`: DrawingML chart parts
//!    - `xlsx`: the workbook embedded behind each chart
//!    - `docx`: charts inside Word documents
//!
//! # Example: Reading every chart of a document
//!
//! ```rust,no_run
//! use longan::ooxml::docx::ChartEditor;
//! use longan::ooxml::opc::MemPackage;
//!
//! let editor = ChartEditor::new(MemPackage::from_zip(&std::fs::read("document.docx")?)?);
//! for index in editor.chart_indices()? {
//!     let view = editor.chart_data(index)?;
//!     println!("chart {}: {} categories", index, view.categories.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod charts;
pub mod docx;
pub mod error;
pub mod opc;
pub mod xlsx;

// Re-export commonly used types from OPC layer
pub use opc::PackURI;

// Re-export error types
pub use error::{OoxmlError, Result};
