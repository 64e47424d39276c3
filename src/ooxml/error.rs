//! Error types for the chart engine.

use crate::common::xml::dom::XmlError;
use thiserror::Error;

/// Result type for chart engine operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Problems with caller-supplied chart data, found before any part is read or written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("chart data has no categories")]
    EmptyCategories,

    #[error("chart data has no series")]
    NoSeries,

    #[error("series {index} has an empty name")]
    EmptySeriesName { index: usize },

    #[error("series '{series}' has {actual} values but there are {expected} categories")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("series '{series}' value {index} is not a finite number")]
    NonFiniteValue { series: String, index: usize },
}

/// Error types for chart engine operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Invalid chart data
    #[error("invalid chart data: {0}")]
    Validation(#[from] ValidationError),

    /// OPC package error (missing or unparsable part, relationship file or archive)
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    #[error("chart {index} not found")]
    ChartNotFound { index: u32 },

    #[error("chart {index} has no externalData workbook link")]
    ExternalDataMissing { index: u32 },

    #[error("chart {index}: relationship {r_id} not found")]
    RelationshipNotFound { index: u32, r_id: String },

    #[error("chart {index}: relationship {r_id} points at missing workbook {path}")]
    WorkbookNotFound {
        index: u32,
        r_id: String,
        path: String,
    },

    #[error("chart {index}: no drawing in the document references relationship {r_id}")]
    DrawingNotFound { index: u32, r_id: String },

    #[error("chart {index} is not referenced by a document relationship")]
    ChartNotReferenced { index: u32 },

    /// The chart root marker is absent
    #[error("not a chart part: chartSpace root element missing")]
    MissingChartRoot,

    /// No bar/line/scatter/pie/area element in the plot area
    #[error("unsupported or missing chart type")]
    UnsupportedChartType,

    #[error("scatter category {index} is not numeric: '{value}'")]
    NonNumericCategory { index: usize, value: String },

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// A failure raised while processing one chart
    #[error("chart {index}: {source}")]
    InChart {
        index: u32,
        #[source]
        source: Box<OoxmlError>,
    },
}

impl From<XmlError> for OoxmlError {
    fn from(err: XmlError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl OoxmlError {
    /// Attach a chart index, unless the error already names one.
    pub fn in_chart(self, index: u32) -> Self {
        match self {
            OoxmlError::ChartNotFound { .. }
            | OoxmlError::ExternalDataMissing { .. }
            | OoxmlError::RelationshipNotFound { .. }
            | OoxmlError::WorkbookNotFound { .. }
            | OoxmlError::DrawingNotFound { .. }
            | OoxmlError::ChartNotReferenced { .. }
            | OoxmlError::InChart { .. } => self,
            other => OoxmlError::InChart {
                index,
                source: Box::new(other),
            },
        }
    }

    /// The error with any [`OoxmlError::InChart`] context removed.
    pub fn root_cause(&self) -> &OoxmlError {
        match self {
            OoxmlError::InChart { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Attach chart context to a `Result`.
pub trait ChartContext<T> {
    fn in_chart(self, index: u32) -> Result<T>;
}

impl<T, E: Into<OoxmlError>> ChartContext<T> for std::result::Result<T, E> {
    fn in_chart(self, index: u32) -> Result<T> {
        self.map_err(|e| e.into().in_chart(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_chart_wraps_once() {
        let err = OoxmlError::UnsupportedChartType.in_chart(3).in_chart(4);
        assert_eq!(err.to_string(), "chart 3: unsupported or missing chart type");
        assert!(matches!(err.root_cause(), OoxmlError::UnsupportedChartType));
    }

    #[test]
    fn test_resolution_errors_keep_their_own_index() {
        let err = OoxmlError::ExternalDataMissing { index: 2 }.in_chart(2);
        assert!(matches!(err, OoxmlError::ExternalDataMissing { index: 2 }));
    }

    #[test]
    fn test_validation_message_names_series() {
        let err: OoxmlError = ValidationError::LengthMismatch {
            series: "Critical".into(),
            expected: 2,
            actual: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid chart data: series 'Critical' has 1 values but there are 2 categories"
        );
    }
}
