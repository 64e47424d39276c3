//! Configuration for chart edits.
//!
//! [`ChartEditOptions`] controls the choices the chart engine cannot read off
//! the package itself.

/// Drawing size used when the source drawing carries no extent: 6 x 3.5 inches.
pub const DEFAULT_DRAWING_EXTENT: (u64, u64) = (5_486_400, 3_200_400);

/// Options for updating and copying charts.
///
/// # Examples
///
/// ```rust
/// use longan::ooxml::docx::ChartEditOptions;
///
/// // Create with defaults
/// let options = ChartEditOptions::default();
///
/// // Or customize
/// let options = ChartEditOptions::new()
///     .with_require_workbook(false)
///     .with_default_sheet_name("Data")
///     .with_number_format("0.0");
/// assert_eq!(options.default_sheet_name, "Data");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEditOptions {
    /// Whether a chart without an `externalData` workbook link is an error.
    /// When false such charts are updated cache-only.
    pub require_workbook: bool,
    /// Sheet named in generated series formulas when the chart has no
    /// formula to learn it from and the workbook does not name its sheet
    pub default_sheet_name: String,
    /// Format code written into numeric caches
    pub number_format: String,
    /// Whether table parts over the data grid are resized with it
    pub sync_table_parts: bool,
    /// Width and height in EMU of a generated drawing whose source has no extent
    pub drawing_extent: (u64, u64),
}

impl Default for ChartEditOptions {
    fn default() -> Self {
        Self {
            require_workbook: true,
            default_sheet_name: "Sheet1".to_string(),
            number_format: "General".to_string(),
            sync_table_parts: true,
            drawing_extent: DEFAULT_DRAWING_EXTENT,
        }
    }
}

impl ChartEditOptions {
    /// Create a new `ChartEditOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a missing workbook link fails the update.
    #[inline]
    pub fn with_require_workbook(mut self, require: bool) -> Self {
        self.require_workbook = require;
        self
    }

    #[inline]
    pub fn with_default_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.default_sheet_name = name.into();
        self
    }

    /// Set the format code of numeric caches (`General`, `0.00`, ...).
    #[inline]
    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = format.into();
        self
    }

    #[inline]
    pub fn with_sync_table_parts(mut self, sync: bool) -> Self {
        self.sync_table_parts = sync;
        self
    }

    /// Set the fallback drawing size in EMU (914400 per inch).
    #[inline]
    pub fn with_drawing_extent(mut self, cx: u64, cy: u64) -> Self {
        self.drawing_extent = (cx, cy);
        self
    }
}
