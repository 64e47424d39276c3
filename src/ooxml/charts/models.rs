//! Chart data models.
//!
//! [`ChartData`] is what callers hand to an update; [`ChartView`] is what the
//! parser reads back out of a chart part.

use crate::common::number::format_number;
use crate::ooxml::charts::types::ChartKind;
use crate::ooxml::error::ValidationError;

/// One data series: a name and one value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// New content for a chart.
///
/// Titles left as `None` are not touched by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// Category labels; for scatter charts, the X values as text
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub category_axis_title: Option<String>,
    pub value_axis_title: Option<String>,
}

impl ChartData {
    pub fn new<I, S>(categories: I, series: Vec<Series>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            series,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category_axis_title(mut self, title: impl Into<String>) -> Self {
        self.category_axis_title = Some(title.into());
        self
    }

    pub fn with_value_axis_title(mut self, title: impl Into<String>) -> Self {
        self.value_axis_title = Some(title.into());
        self
    }

    /// Structural checks that need no package access. Runs before any part is read.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.categories.is_empty() {
            return Err(ValidationError::EmptyCategories);
        }
        if self.series.is_empty() {
            return Err(ValidationError::NoSeries);
        }
        let expected = self.categories.len();
        for (index, series) in self.series.iter().enumerate() {
            if series.name.is_empty() {
                return Err(ValidationError::EmptySeriesName { index });
            }
            if series.values.len() != expected {
                return Err(ValidationError::LengthMismatch {
                    series: series.name.clone(),
                    expected,
                    actual: series.values.len(),
                });
            }
            if let Some(index) = series.values.iter().position(|v| !v.is_finite()) {
                return Err(ValidationError::NonFiniteValue {
                    series: series.name.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

/// Categories as stored in a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Categories {
    /// Textual categories (bar, line, pie, area)
    Labels(Vec<String>),
    /// Numeric X values (scatter)
    XValues(Vec<f64>),
}

impl Categories {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Categories::Labels(v) => v.len(),
            Categories::XValues(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Categories as text, X values formatted the way they are written to caches.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Categories::Labels(v) => v.clone(),
            Categories::XValues(v) => v.iter().map(|x| format_number(*x)).collect(),
        }
    }
}

/// The semantic content of one chart part.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub kind: ChartKind,
    /// Chart title, empty when the chart has none
    pub title: String,
    pub category_axis_title: String,
    pub value_axis_title: String,
    pub categories: Categories,
    pub series: Vec<Series>,
    /// Worksheet named by the existing series formulas, if any
    pub sheet_name: Option<String>,
    /// Relationship ID of the `externalData` workbook link, if any
    pub external_data: Option<String>,
}

impl ChartView {
    /// The view as update input, titles included.
    pub fn to_data(&self) -> ChartData {
        ChartData {
            categories: self.categories.labels(),
            series: self.series.clone(),
            title: Some(self.title.clone()),
            category_axis_title: Some(self.category_axis_title.clone()),
            value_axis_title: Some(self.value_axis_title.clone()),
        }
    }
}

/// What happened to one title slot during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOutcome {
    Updated,
    /// A new title was supplied but the chart has no title element or no text
    /// node inside it; the chart was left unchanged for this slot.
    AnchorMissing,
    NotRequested,
}

/// Result of rewriting one chart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub kind: ChartKind,
    pub series_written: usize,
    /// Series blocks present before the update
    pub series_replaced: usize,
    pub title: TitleOutcome,
    pub category_axis_title: TitleOutcome,
    pub value_axis_title: TitleOutcome,
    /// Whether the embedded workbook was rewritten as well
    pub workbook_synced: bool,
}

impl UpdateReport {
    /// True when no requested title was silently skipped.
    pub fn all_titles_applied(&self) -> bool {
        ![self.title, self.category_axis_title, self.value_axis_title].contains(&TitleOutcome::AnchorMissing)
    }
}
