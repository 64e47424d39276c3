//! Core chart types and enumerations.

use std::fmt;

/// Chart kinds the engine reads and rewrites.
///
/// `Bar` covers both bar and column charts; the direction lives in `barDir`,
/// which the engine never touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Bar or column chart
    Bar,
    /// Line chart
    Line,
    /// Scatter (XY) chart
    Scatter,
    /// Pie chart
    Pie,
    /// Area chart
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Area,
    ];

    /// Returns the XML element name for this chart kind.
    #[inline]
    pub const fn xml_element_name(&self) -> &'static str {
        match self {
            Self::Bar => "barChart",
            Self::Line => "lineChart",
            Self::Scatter => "scatterChart",
            Self::Pie => "pieChart",
            Self::Area => "areaChart",
        }
    }

    /// Returns true if this chart kind plots against textual categories.
    /// Scatter charts use numeric X values instead.
    #[inline]
    pub const fn supports_categories(&self) -> bool {
        !matches!(self, Self::Scatter)
    }

    /// Local names of the category and value data blocks inside a series.
    #[inline]
    pub const fn data_element_names(&self) -> (&'static str, &'static str) {
        match self {
            Self::Scatter => ("xVal", "yVal"),
            _ => ("cat", "val"),
        }
    }

    /// Local names of type-group children that precede the series, in schema order.
    pub(crate) const fn leading_elements(&self) -> &'static [&'static str] {
        match self {
            Self::Bar => &["barDir", "grouping", "varyColors"],
            Self::Line | Self::Area => &["grouping", "varyColors"],
            Self::Scatter => &["scatterStyle", "varyColors"],
            Self::Pie => &["varyColors"],
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xml_element_name())
    }
}

/// Axis role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisType {
    /// Category axis (the X axis of a scatter chart)
    Category,
    /// Value axis
    Value,
}
