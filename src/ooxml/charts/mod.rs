//! Chart parts of Office Open XML documents.
//!
//! This module reads and rewrites the data of existing DrawingML charts
//! (`word/charts/chartN.xml`). It includes:
//!
//! - Chart kinds and axis roles
//! - The data models exchanged with callers ([`ChartData`], [`ChartView`])
//! - A parsed chart document that locates titles, axes and the chart-type element
//! - A reader producing a [`ChartView`] and a writer replacing series from a [`ChartData`]
//!
//! Both `c:`-prefixed and default-namespace charts are handled; the naming is
//! detected once from the `chartSpace` root.
//!
//! # Chart Types Supported
//!
//! - Bar/Column charts
//! - Line charts
//! - Scatter/XY charts
//! - Pie charts
//! - Area charts
//!
//! # Example
//!
//! ```rust,ignore
//! use longan::ooxml::charts::{ChartData, Series, parse_chart, update_chart};
//! use longan::ooxml::docx::ChartEditOptions;
//!
//! let raw = std::fs::read_to_string("chart1.xml")?;
//! let data = ChartData::new(["Q1", "Q2"], vec![Series::new("Sales", vec![100.0, 150.0])])
//!     .with_title("Sales Report");
//!
//! let (xml, report) = update_chart(&raw, &data, &ChartEditOptions::default())?;
//! assert!(report.all_titles_applied());
//! assert_eq!(parse_chart(&xml)?.series.len(), 1);
//! ```

pub mod chart;
pub mod models;
pub mod reader;
pub mod types;
pub mod writer;

pub use chart::{ChartDocument, ChartNames, TitleSlot};
pub use models::{Categories, ChartData, ChartView, Series, TitleOutcome, UpdateReport};
pub use reader::parse_chart;
pub use types::{AxisType, ChartKind};
pub use writer::update_chart;
