//! Identifier allocation.
//!
//! Every identifier this crate introduces into a package (relationship IDs,
//! numbered part names, drawing-object IDs, bookmark IDs) comes from one
//! scanning rule: collect the numeric suffixes already present and hand out
//! `max + 1`. Gaps are never filled, so an identifier that was in use earlier
//! in an editing session is not handed out again while anything numbered above
//! it survives.

use crate::common::xml::Element;

/// Shape of the identifiers being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPattern<'a> {
    /// A fixed prefix followed by digits, e.g. `rId12`.
    Prefixed(&'a str),
    /// A part filename `<stem><digits>.<ext>`; the bare `<stem>.<ext>` counts as 0.
    /// Only the final path segment is examined.
    PartName { stem: &'a str, ext: &'a str },
    /// A bare decimal number, e.g. a `docPr/@id`.
    Numeric,
}

/// Numeric suffix of `value` under `pattern`, if it matches.
pub fn parse_suffix(value: &str, pattern: IdPattern<'_>) -> Option<u32> {
    match pattern {
        IdPattern::Prefixed(prefix) => parse_digits(value.strip_prefix(prefix)?),
        IdPattern::PartName { stem, ext } => {
            let filename = value.rsplit('/').next().unwrap_or(value);
            let name = filename.strip_suffix(ext)?.strip_suffix('.')?;
            let digits = name.strip_prefix(stem)?;
            if digits.is_empty() {
                Some(0)
            } else {
                parse_digits(digits)
            }
        },
        IdPattern::Numeric => parse_digits(value.trim()),
    }
}

/// `max(existing) + 1` over every value matching `pattern`; 1 when none match.
pub fn next_id<I, S>(existing: I, pattern: IdPattern<'_>) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|v| parse_suffix(v.as_ref(), pattern))
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Next free relationship ID (`rId<N>`) for one `.rels` part.
pub fn next_relationship_id<I, S>(existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("rId{}", next_id(existing, IdPattern::Prefixed("rId")))
}

/// Next free numeric suffix for member names `<dir><stem><N>.<ext>` directly
/// inside `dir` (which ends with a slash).
pub fn next_part_suffix<I, S>(part_names: I, dir: &str, stem: &str, ext: &str) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    next_id(
        part_names.into_iter().filter(|n| {
            n.as_ref()
                .strip_prefix(dir)
                .is_some_and(|rest| !rest.contains('/'))
        }),
        IdPattern::PartName { stem, ext },
    )
}

/// Next free chart index given every member name in the package.
pub fn next_chart_index<I, S>(part_names: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    next_part_suffix(part_names, crate::ooxml::docx::CHARTS_DIR, "chart", "xml")
}

/// Next free drawing-object ID (`wp:docPr/@id`) across the given part roots.
pub fn next_drawing_id<'a, I>(roots: I) -> u32
where
    I: IntoIterator<Item = &'a Element>,
{
    next_attr_id(roots, "docPr")
}

/// Next free bookmark ID (`w:bookmarkStart/@id`) across the given part roots.
pub fn next_bookmark_id<'a, I>(roots: I) -> u32
where
    I: IntoIterator<Item = &'a Element>,
{
    next_attr_id(roots, "bookmarkStart")
}

fn next_attr_id<'a, I>(roots: I, element_local: &str) -> u32
where
    I: IntoIterator<Item = &'a Element>,
{
    let ids: Vec<String> = roots
        .into_iter()
        .flat_map(|root| root.find_all(|e| e.local_name() == element_local))
        .filter_map(|e| e.attr_local("id").map(str::to_string))
        .collect();
    next_id(ids, IdPattern::Numeric)
}

#[inline]
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    atoi_simd::parse::<u32, false, false>(s.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_relationship_id_uses_max_not_gaps() {
        assert_eq!(next_relationship_id(["rId1", "rId7", "rId3"]), "rId8");
        assert_eq!(next_relationship_id(Vec::<String>::new()), "rId1");
        assert_eq!(next_relationship_id(["rIdX", "image1"]), "rId1");
    }

    #[test]
    fn test_part_name_pattern() {
        let pattern = IdPattern::PartName {
            stem: "chart",
            ext: "xml",
        };
        assert_eq!(parse_suffix("word/charts/chart12.xml", pattern), Some(12));
        assert_eq!(parse_suffix("word/charts/chart.xml", pattern), Some(0));
        assert_eq!(parse_suffix("word/charts/colors1.xml", pattern), None);
        assert_eq!(parse_suffix("word/charts/chart1.xml.rels", pattern), None);
        assert_eq!(parse_suffix("word/charts/chartx.xml", pattern), None);
    }

    #[test]
    fn test_next_chart_index_ignores_rels_and_other_dirs() {
        let names = [
            "word/charts/chart1.xml",
            "word/charts/chart3.xml",
            "word/charts/_rels/chart9.xml.rels",
            "word/document.xml",
            "xl/charts/chart20.xml",
        ];
        assert_eq!(next_chart_index(names), 4);
    }

    #[test]
    fn test_next_part_suffix_counts_bare_stem_as_zero() {
        let names = [
            "word/embeddings/Microsoft_Excel_Worksheet.xlsx",
            "word/embeddings/Microsoft_Excel_Worksheet2.xlsx",
            "word/embeddings/old/Microsoft_Excel_Worksheet9.xlsx",
        ];
        assert_eq!(next_part_suffix(names, "word/embeddings/", "Microsoft_Excel_Worksheet", "xlsx"), 3);
        assert_eq!(next_part_suffix(names, "word/embeddings/", "Other", "xlsx"), 1);
    }

    #[test]
    fn test_next_drawing_and_bookmark_ids() {
        let doc = Element::parse_fragment(
            r#"<w:body><wp:docPr id="4" name="Chart 4"/><w:bookmarkStart w:id="9"/><wp:docPr id="2"/></w:body>"#,
        )
        .unwrap();
        let header = Element::parse_fragment(r#"<w:hdr><wp:docPr id="11"/></w:hdr>"#).unwrap();
        assert_eq!(next_drawing_id([&doc, &header]), 12);
        assert_eq!(next_drawing_id([&doc]), 5);
        assert_eq!(next_bookmark_id([&doc]), 10);
    }
}
