use aho_corasick::AhoCorasick;
use memchr::memchr3;
use once_cell::sync::Lazy;

// Built once; element content only needs the three markup-significant characters.
static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(["&", "<", ">"]).expect("Failed to build XML text escaper")
});

static ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new(["&", "<", ">", "\"", "\r", "\n", "\t"])
        .expect("Failed to build XML attribute escaper")
});

/// Escape character data for use between tags.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_text;
/// assert_eq!(escape_text("Q1 & Q2 <draft>"), "Q1 &amp; Q2 &lt;draft&gt;");
/// assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
/// ```
#[inline]
pub fn escape_text(s: &str) -> String {
    // Most cached values and cell text carry no markup characters
    if memchr3(b'&', b'<', b'>', s.as_bytes()).is_none() {
        return s.to_string();
    }
    TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}

/// Escape a value for use inside a double-quoted attribute.
///
/// Whitespace control characters are written as character references so
/// that attribute-value normalization on re-read gives back the same string.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_attr;
/// assert_eq!(escape_attr("a \"b\" & c"), "a &quot;b&quot; &amp; c");
/// assert_eq!(escape_attr("x\ny"), "x&#10;y");
/// ```
#[inline]
pub fn escape_attr(s: &str) -> String {
    ATTR_ESCAPER.replace_all(
        s,
        &["&amp;", "&lt;", "&gt;", "&quot;", "&#13;", "&#10;", "&#9;"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_leaves_plain_text_alone() {
        assert_eq!(escape_text("Device A"), "Device A");
    }

    #[test]
    fn test_escape_attr_escapes_ampersand_first_only_once() {
        assert_eq!(escape_attr("&amp;"), "&amp;amp;");
    }
}
