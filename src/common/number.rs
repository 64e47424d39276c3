//! Number text as written into chart caches and worksheet cells.

/// Largest magnitude written through the integer path; beyond it `f64` no
/// longer holds every integer exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Shortest text that parses back to `value`: integral values without a
/// fractional part (`4`, not `4.0`), everything else via `ryu`.
///
/// ```
/// use longan::common::number::format_number;
///
/// assert_eq!(format_number(8.0), "8");
/// assert_eq!(format_number(-2.5), "-2.5");
/// ```
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
        let mut buf = itoa::Buffer::new();
        return buf.format(value as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    let text = buf.format(value);
    text.strip_suffix(".0").unwrap_or(text).to_string()
}

/// Parse cached number text. Surrounding whitespace is ignored; anything
/// else that is not a finite decimal number is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
