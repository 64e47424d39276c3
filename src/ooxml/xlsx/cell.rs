//! A1-style cell addressing for worksheets.
//!
//! Columns and rows are 1-based. Formula text is only ever inspected for
//! `A1:B2` ranges (with optional `$` anchors and sheet qualifier); the engine
//! never evaluates formulas.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

/// Last column a worksheet can address (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
/// Last row a worksheet can address.
pub const MAX_ROW: u32 = 1_048_576;

static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:('(?:[^']|'')+'|[A-Za-z_][A-Za-z0-9_.]*)!)?(\$?)([A-Z]{1,3})(\$?)([0-9]+):(\$?)([A-Z]{1,3})(\$?)([0-9]+)",
    )
        .expect("Failed to build cell range pattern")
});

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut col = col;

    while col > 0 {
        col -= 1;
        letters.push((col % 26) as u8 + b'A');
        col /= 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a column number; `None` for anything but 1-3
/// ASCII letters or a column beyond [`MAX_COLUMN`].
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut col = 0u32;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1);
    }
    (col <= MAX_COLUMN).then_some(col)
}

/// A single cell reference such as `C4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }

    /// Parse `B12` or `$B$12`.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let col = letters_to_column(&reference[..split].replace('$', ""))?;
        let row_text = reference[split..].trim_start_matches('$');
        let row = atoi_simd::parse::<u32, false, false>(row_text.as_bytes()).ok()?;
        (row > 0).then_some(Self { row, col })
    }

    /// `$B$12` form, as used in chart series formulas.
    pub fn absolute(&self) -> String {
        format!("${}${}", column_to_letters(self.col), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row)
    }
}

/// A rectangular range such as `A1:C4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    #[inline]
    pub const fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// Parse `A1:C4`; a single reference yields a one-cell range.
    pub fn parse(range: &str) -> Option<Self> {
        match range.split_once(':') {
            Some((a, b)) => Some(Self::new(CellRef::parse(a)?, CellRef::parse(b)?)),
            None => {
                let cell = CellRef::parse(range)?;
                Some(Self::new(cell, cell))
            },
        }
    }

    #[inline]
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row) && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// `$A$2:$A$4` form.
    pub fn absolute(&self) -> String {
        format!("{}:{}", self.start.absolute(), self.end.absolute())
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Sheet name as it must appear in a formula: quoted (with embedded quotes
/// doubled) unless it is a plain identifier.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if plain && CellRef::parse(name).is_none() {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Sheet named by a formula reference such as `'Q1 Data'!$B$1`, unquoted.
pub fn sheet_of_formula(formula: &str) -> Option<String> {
    let (sheet, _) = formula.trim().rsplit_once('!')?;
    let name = unquote_sheet(sheet.trim_start_matches('='));
    (!name.is_empty()).then_some(name)
}

/// Rewrite every `A1:B2` range in `formula` that ends on an edge of `old`
/// so that it ends on the same edge of `new`. Anchors (`$`) are kept.
///
/// `sheet` names the worksheet holding the data block; a range qualified with
/// any other sheet is left alone, as is every qualified range when `sheet` is
/// `None`.
///
/// `SUM(B2:B4)` with a data block growing from `B2:C4` to `B2:C5` becomes
/// `SUM(B2:B5)`.
pub fn respan_formula(formula: &str, sheet: Option<&str>, old: &CellRange, new: &CellRange) -> String {
    RANGE_PATTERN
        .replace_all(formula, |caps: &Captures<'_>| {
            let qualifier = caps.get(1).map(|m| m.as_str());
            let same_sheet = match qualifier {
                None => true,
                Some(q) => sheet.is_some_and(|name| unquote_sheet(q).eq_ignore_ascii_case(name)),
            };
            if same_sheet {
                respan_match(caps, old, new)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn unquote_sheet(qualifier: &str) -> String {
    match qualifier.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => qualifier.to_string(),
    }
}

fn respan_match(caps: &Captures<'_>, old: &CellRange, new: &CellRange) -> String {
    let (Some(start_col), Some(end_col)) = (letters_to_column(&caps[3]), letters_to_column(&caps[7])) else {
        return caps[0].to_string();
    };
    let (Ok(start_row), Ok(end_row)) = (caps[5].parse::<u32>(), caps[9].parse::<u32>()) else {
        return caps[0].to_string();
    };

    let mut end_col = end_col;
    let mut end_row = end_row;
    let within_rows = start_row >= old.start.row && start_row <= old.end.row;
    let within_cols = start_col >= old.start.col && start_col <= old.end.col;
    if end_row == old.end.row && within_rows && within_cols {
        end_row = new.end.row.max(start_row);
    }
    if end_col == old.end.col && within_cols && within_rows {
        end_col = new.end.col.max(start_col);
    }

    let qualifier = caps.get(1).map(|m| format!("{}!", m.as_str())).unwrap_or_default();
    format!(
        "{}{}{}{}{}:{}{}{}{}",
        qualifier,
        &caps[2],
        &caps[3],
        &caps[4],
        &caps[5],
        &caps[6],
        column_to_letters(end_col),
        &caps[8],
        end_row
    )
}
