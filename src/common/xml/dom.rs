//! Minimal owned XML element tree.
//!
//! Parts are parsed into an [`XmlDocument`], edited structurally (replace the
//! children of an element, insert a sibling after another, set the text of a
//! node) and serialized back. Nothing here knows about namespaces beyond the
//! qualified names found in the source; callers pick a [`TagNaming`] once per
//! document and use it for every lookup.

use crate::common::xml::escape::{escape_attr, escape_text};
use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

/// Declaration written when a document has none of its own.
pub const DEFAULT_DECLARATION: &str = r#"xml version="1.0" encoding="UTF-8" standalone="yes""#;

/// Failure to turn text into an element tree.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(String),

    #[error("XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("unexpected closing tag </{0}>")]
    UnbalancedEnd(String),
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        XmlError::Syntax(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Syntax(err.to_string())
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    CData(String),
    /// Raw comment body.
    Comment(String),
    /// Raw processing instruction body (target and data).
    ProcessingInstruction(String),
}

impl Node {
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_to(out),
            Node::Text(t) => out.push_str(&escape_text(t)),
            Node::CData(t) => {
                out.push_str("<![CDATA[");
                out.push_str(t);
                out.push_str("]]>");
            },
            Node::Comment(t) => {
                out.push_str("<!--");
                out.push_str(t);
                out.push_str("-->");
            },
            Node::ProcessingInstruction(t) => {
                out.push_str("<?");
                out.push_str(t);
                out.push_str("?>");
            },
        }
    }
}

/// An element with its qualified name, attributes in source order and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element with a qualified name such as `c:ser`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Element::set_text`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its prefix (`ser` for `c:ser`).
    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Prefix of the qualified name, if any.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    #[inline]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Attribute by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by local name, ignoring whatever prefix the producer used
    /// (`r:id`, `rel:id` and `id` all match `"id"`). Namespace declarations
    /// never match.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| !k.starts_with("xmlns") && local_part(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set (or add) an attribute by qualified name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Set an existing attribute found by local name; returns false if absent.
    pub fn set_attr_local(&mut self, local: &str, value: impl Into<String>) -> bool {
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| !k.starts_with("xmlns") && local_part(k) == local)
        {
            Some(slot) => {
                slot.1 = value.into();
                true
            },
            None => false,
        }
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Element children only.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// First element child matching `pred`.
    pub fn child<P>(&self, pred: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements().find(|e| pred(*e))
    }

    pub fn child_mut<P>(&mut self, pred: P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements_mut().find(|e| pred(&**e))
    }

    /// Index into [`Element::children`] of the first element child matching `pred`.
    pub fn child_position<P>(&self, pred: P) -> Option<usize>
    where
        P: Fn(&Element) -> bool,
    {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(&pred))
    }

    /// First descendant (depth-first, document order, excluding `self`) matching `pred`.
    pub fn find<P>(&self, pred: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        fn walk<'a, P: Fn(&Element) -> bool>(el: &'a Element, pred: &P) -> Option<&'a Element> {
            for child in el.elements() {
                if pred(child) {
                    return Some(child);
                }
                if let Some(found) = walk(child, pred) {
                    return Some(found);
                }
            }
            None
        }
        walk(self, &pred)
    }

    /// Every descendant matching `pred`, in document order.
    pub fn find_all<P>(&self, pred: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        fn walk<'a, P: Fn(&Element) -> bool>(el: &'a Element, pred: &P, out: &mut Vec<&'a Element>) {
            for child in el.elements() {
                if pred(child) {
                    out.push(child);
                }
                walk(child, pred, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &pred, &mut out);
        out
    }

    /// Child-index path from `self` to the first descendant matching `pred`.
    pub fn path_to<P>(&self, pred: P) -> Option<Vec<usize>>
    where
        P: Fn(&Element) -> bool,
    {
        fn walk<P: Fn(&Element) -> bool>(el: &Element, pred: &P, path: &mut Vec<usize>) -> bool {
            for (i, node) in el.children.iter().enumerate() {
                if let Node::Element(child) = node {
                    path.push(i);
                    if pred(child) || walk(child, pred, path) {
                        return true;
                    }
                    path.pop();
                }
            }
            false
        }
        let mut path = Vec::new();
        walk(self, &pred, &mut path).then_some(path)
    }

    /// Child-index paths to every descendant matching `pred`, in document order.
    pub fn paths_to_all<P>(&self, pred: P) -> Vec<Vec<usize>>
    where
        P: Fn(&Element) -> bool,
    {
        fn walk<P: Fn(&Element) -> bool>(el: &Element, pred: &P, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            for (i, node) in el.children.iter().enumerate() {
                if let Node::Element(child) = node {
                    path.push(i);
                    if pred(child) {
                        out.push(path.clone());
                    }
                    walk(child, pred, path, out);
                    path.pop();
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &pred, &mut Vec::new(), &mut out);
        out
    }

    /// Follow a path produced by [`Element::path_to`].
    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &i in path {
            current = current.children.get(i)?.as_element()?;
        }
        Some(current)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &i in path {
            current = current.children.get_mut(i)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Concatenated character data of this element and all descendants.
    pub fn text(&self) -> String {
        fn walk(el: &Element, out: &mut String) {
            for node in &el.children {
                match node {
                    Node::Text(t) | Node::CData(t) => out.push_str(t),
                    Node::Element(e) => walk(e, out),
                    _ => {},
                }
            }
        }
        let mut out = String::new();
        walk(self, &mut out);
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    #[inline]
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert an element child at `index` into [`Element::children`]; an index
    /// past the end appends.
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Insert `siblings` right after the child at `index`, in order.
    pub fn insert_after<I>(&mut self, index: usize, siblings: I)
    where
        I: IntoIterator<Item = Element>,
    {
        let mut at = index.saturating_add(1).min(self.children.len());
        for sibling in siblings {
            self.children.insert(at, Node::Element(sibling));
            at += 1;
        }
    }

    /// Remove every element child matching `pred` and return them in order.
    pub fn remove_children<P>(&mut self, pred: P) -> Vec<Element>
    where
        P: Fn(&Element) -> bool,
    {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Element(e) if pred(&e) => removed.push(e),
                other => kept.push(other),
            }
        }
        self.children = kept;
        removed
    }

    /// Serialize this element (and its subtree).
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_attr(v));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Parse a standalone fragment with exactly one root element.
    pub fn parse_fragment(xml: &str) -> Result<Self, XmlError> {
        Ok(XmlDocument::parse(xml)?.root)
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    declaration: Option<String>,
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    /// Wrap an element as a new document with the default declaration.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse raw part bytes (UTF-8, optional BOM).
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, XmlError> {
        let text = std::str::from_utf8(bytes)?;
        Self::parse(text)
    }

    /// Parse XML text into a tree. Whitespace-only text is kept inside the
    /// root so mixed content survives a round trip; outside the root it is
    /// dropped.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let xml = xml.strip_prefix('\u{FEFF}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Decl(d) => {
                    declaration = Some(std::str::from_utf8(&d)?.to_string());
                    continue;
                },
                Event::Start(e) => {
                    stack.push(start_element(&e)?);
                    continue;
                },
                Event::Empty(e) => Node::Element(start_element(&e)?),
                Event::End(e) => {
                    let finished = stack.pop().ok_or_else(|| {
                        XmlError::UnbalancedEnd(String::from_utf8_lossy(e.name().as_ref()).into_owned())
                    })?;
                    Node::Element(finished)
                },
                Event::Text(t) => Node::Text(t.unescape()?.into_owned()),
                Event::CData(c) => Node::CData(std::str::from_utf8(&c)?.to_string()),
                Event::Comment(c) => Node::Comment(std::str::from_utf8(&c)?.to_string()),
                Event::PI(p) => Node::ProcessingInstruction(std::str::from_utf8(&p)?.to_string()),
                Event::DocType(_) => continue,
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => match node {
                    Node::Element(e) if root.is_none() => root = Some(e),
                    Node::Text(t) if t.trim().is_empty() => {},
                    other if root.is_none() => prolog.push(other),
                    other => epilog.push(other),
                },
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Syntax(format!("unclosed element <{}>", open.name)));
        }

        Ok(Self {
            declaration,
            prolog,
            root: root.ok_or(XmlError::NoRoot)?,
            epilog,
        })
    }

    #[inline]
    pub fn root(&self) -> &Element {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Body of the XML declaration as found in the source.
    #[inline]
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    /// Serialize the document. A declaration is always written and is always
    /// followed by exactly one line break.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<?");
        out.push_str(self.declaration.as_deref().unwrap_or(DEFAULT_DECLARATION));
        out.push_str("?>\n");
        for node in &self.prolog {
            node.write_to(&mut out);
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            node.write_to(&mut out);
        }
        out
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }
}

fn start_element(e: &quick_xml::events::BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

#[inline]
fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// How element names of one namespace are spelled in a given document.
///
/// Producers disagree on prefixes (`c:ser`, `cdr:ser`, or a default namespace
/// with bare `ser`). The strategy is picked once per document and passed to
/// every lookup instead of concatenating prefixes ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagNaming {
    Prefixed(String),
    Unprefixed,
}

impl TagNaming {
    /// The naming used by `element` itself.
    pub fn of(element: &Element) -> Self {
        match element.prefix() {
            Some(p) => TagNaming::Prefixed(p.to_string()),
            None => TagNaming::Unprefixed,
        }
    }

    /// The naming bound to `namespace` by declarations on `root`, or
    /// `Prefixed(fallback)` when the document does not declare it there.
    pub fn for_namespace(root: &Element, namespace: &str, fallback: &str) -> Self {
        Self::declared_on(root, namespace).unwrap_or_else(|| TagNaming::Prefixed(fallback.to_string()))
    }

    /// The naming an `xmlns` declaration on `element` itself binds to `namespace`.
    pub fn declared_on(element: &Element, namespace: &str) -> Option<Self> {
        for (k, v) in element.attributes() {
            if v != namespace {
                continue;
            }
            if k == "xmlns" {
                return Some(TagNaming::Unprefixed);
            }
            if let Some(p) = k.strip_prefix("xmlns:") {
                return Some(TagNaming::Prefixed(p.to_string()));
            }
        }
        None
    }

    /// Qualified name for `local` under this naming.
    pub fn qualify(&self, local: &str) -> String {
        match self {
            TagNaming::Prefixed(p) => format!("{p}:{local}"),
            TagNaming::Unprefixed => local.to_string(),
        }
    }

    /// Whether `element` is `local` under this naming.
    pub fn is(&self, element: &Element, local: &str) -> bool {
        match self {
            TagNaming::Prefixed(p) => element
                .name()
                .strip_prefix(p.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|rest| rest == local),
            TagNaming::Unprefixed => element.name() == local,
        }
    }

    /// Whether `element` is any of `locals` under this naming.
    pub fn is_any(&self, element: &Element, locals: &[&str]) -> bool {
        locals.iter().any(|l| self.is(element, l))
    }

    /// The `xmlns` attribute name that binds this naming.
    pub fn xmlns_attr(&self) -> String {
        match self {
            TagNaming::Prefixed(p) => format!("xmlns:{p}"),
            TagNaming::Unprefixed => "xmlns".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_structure_and_entities() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><c:chartSpace xmlns:c=\"urn:c\"><c:v>A &amp; B</c:v><c:e a=\"&quot;q&quot;\"/><!--note--></c:chartSpace>";
        let doc = XmlDocument::parse(xml).unwrap();
        let out = doc.to_xml();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<c:chartSpace"));
        assert!(out.contains("<c:v>A &amp; B</c:v>"));
        assert!(out.contains("<c:e a=\"&quot;q&quot;\"/>"));
        assert!(out.contains("<!--note-->"));
        assert_eq!(XmlDocument::parse(&out).unwrap(), doc);
    }

    #[test]
    fn test_declaration_always_followed_by_newline() {
        let doc = XmlDocument::parse("<root/>").unwrap();
        assert_eq!(doc.to_xml(), format!("<?{}?>\n<root/>", DEFAULT_DECLARATION));

        let doc = XmlDocument::parse("<?xml version=\"1.0\"?>\n\n<root/>").unwrap();
        assert_eq!(doc.to_xml(), "<?xml version=\"1.0\"?>\n<root/>");
    }

    #[test]
    fn test_find_and_path_to() {
        let doc = XmlDocument::parse("<a><b><c id=\"1\"/></b><c id=\"2\"/></a>").unwrap();
        let root = doc.root();
        assert_eq!(root.find(|e| e.local_name() == "c").unwrap().attr("id"), Some("1"));
        assert_eq!(root.find_all(|e| e.local_name() == "c").len(), 2);
        let path = root.path_to(|e| e.attr("id") == Some("2")).unwrap();
        assert_eq!(path, vec![1]);
        assert_eq!(root.at_path(&[0, 0]).unwrap().attr("id"), Some("1"));
    }

    #[test]
    fn test_attr_local_ignores_prefix() {
        let el = Element::parse_fragment(r#"<c:externalData xmlns:r="urn:r" r:id="rId3"/>"#).unwrap();
        assert_eq!(el.attr_local("id"), Some("rId3"));
        assert_eq!(el.attr("r:id"), Some("rId3"));
    }

    #[test]
    fn test_tag_naming() {
        let prefixed = Element::parse_fragment(r#"<c:chartSpace xmlns:c="urn:chart" xmlns:a="urn:dml"/>"#).unwrap();
        let naming = TagNaming::of(&prefixed);
        assert_eq!(naming, TagNaming::Prefixed("c".into()));
        assert!(naming.is(&prefixed, "chartSpace"));
        assert!(!naming.is(&prefixed, "chart"));
        assert_eq!(naming.qualify("ser"), "c:ser");
        assert_eq!(
            TagNaming::for_namespace(&prefixed, "urn:dml", "x"),
            TagNaming::Prefixed("a".into())
        );

        let bare = Element::parse_fragment(r#"<chartSpace xmlns="urn:chart"/>"#).unwrap();
        let naming = TagNaming::of(&bare);
        assert_eq!(naming, TagNaming::Unprefixed);
        assert!(naming.is(&bare, "chartSpace"));
        assert_eq!(TagNaming::for_namespace(&bare, "urn:chart", "c"), TagNaming::Unprefixed);
    }

    #[test]
    fn test_unbalanced_is_error() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(matches!(XmlDocument::parse("   "), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_remove_children_and_set_text() {
        let mut el = Element::parse_fragment("<p><r>1</r><x/><r>2</r></p>").unwrap();
        let removed = el.remove_children(|e| e.name() == "r");
        assert_eq!(removed.len(), 2);
        assert_eq!(el.to_xml(), "<p><x/></p>");
        el.set_text("hi & bye");
        assert_eq!(el.to_xml(), "<p>hi &amp; bye</p>");
    }
}
