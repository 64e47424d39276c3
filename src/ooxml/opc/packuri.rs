/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI represents a part name within an OPC package, following the URI format
/// defined by the Open Packaging Conventions specification. It always begins with a
/// forward slash and uses forward slashes as separators; the ZIP member name is the
/// same string without the leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/word/document.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI {
            uri: Self::normalize_path(&uri),
        })
    }

    /// Resolve a relationship target against the directory of its source part.
    ///
    /// Targets are relative to the part the `.rels` file describes, not to the
    /// `.rels` file itself. A leading slash makes the target package-absolute and
    /// any URI fragment is dropped, since part names never carry one.
    ///
    /// # Arguments
    /// * `base_uri` - Directory of the source part (e.g. "/word/charts")
    /// * `relative_ref` - The relationship target (e.g. "../embeddings/a.xlsx")
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let target = relative_ref.split('#').next().unwrap_or(relative_ref);
        if target.is_empty() {
            return Err(format!("empty relationship target '{}'", relative_ref));
        }
        if target.starts_with('/') {
            return Self::new(target);
        }
        let joined = Self::join_paths(base_uri, target);
        Self::new(joined)
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/word/charts" for "/word/charts/chart1.xml".
    /// For the package pseudo-partname "/", returns "/".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For the package pseudo-partname "/", returns an empty string.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the extension portion of this PackURI (no leading period).
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Filename without its extension.
    fn stem(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        }
    }

    /// Filename stem with any trailing digits removed (`chart` for `chart12.xml`).
    pub fn stem_without_idx(&self) -> &str {
        self.stem().trim_end_matches(|c: char| c.is_ascii_digit())
    }

    /// The same partname with its trailing index replaced by `idx`, or `idx`
    /// appended to the stem when the name carries none.
    ///
    /// `/word/embeddings/Microsoft_Excel_Worksheet1.xlsx` with 4 gives
    /// `/word/embeddings/Microsoft_Excel_Worksheet4.xlsx`.
    pub fn with_idx(&self, idx: u32) -> PackURI {
        let ext = self.ext();
        let mut filename = String::with_capacity(self.filename().len() + 4);
        filename.push_str(self.stem_without_idx());
        filename.push_str(itoa::Buffer::new().format(idx));
        if !ext.is_empty() {
            filename.push('.');
            filename.push_str(ext);
        }
        let uri = if self.base_uri() == "/" {
            format!("/{}", filename)
        } else {
            format!("{}/{}", self.base_uri(), filename)
        };
        PackURI { uri }
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername for the package item.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the relative reference from a base URI to this PackURI.
    ///
    /// For example, PackURI("/word/embeddings/book2.xlsx") gives
    /// "../embeddings/book2.xlsx" for base_uri "/word/charts".
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from_parts: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to_parts: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        // The last target segment is the filename and never part of the shared prefix.
        let common = from_parts
            .iter()
            .zip(to_parts.iter().take(to_parts.len().saturating_sub(1)))
            .take_while(|(a, b)| a == b)
            .count();

        let mut result = String::new();
        for _ in common..from_parts.len() {
            result.push_str("../");
        }
        result.push_str(&to_parts[common..].join("/"));
        result
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/word/_rels/document.xml.rels" for "/word/document.xml".
    pub fn rels_uri(&self) -> PackURI {
        let rels_filename = format!("{}.rels", self.filename());
        let uri = if self.base_uri() == "/" {
            format!("/_rels/{}", rels_filename)
        } else {
            format!("{}/_rels/{}", self.base_uri(), rels_filename)
        };
        PackURI { uri }
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    fn join_paths(base: &str, rel: &str) -> String {
        if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        }
    }

    /// Resolve "." and ".." segments and collapse repeated slashes.
    /// ".." above the package root stays at the root.
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }
        format!("/{}", parts.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/word/document.xml").is_ok());
        assert!(PackURI::new("word/document.xml").is_err());
        assert_eq!(PackURI::new("/word/./charts//chart1.xml").unwrap().as_str(), "/word/charts/chart1.xml");
    }

    #[test]
    fn test_base_uri_and_filename() {
        let uri = PackURI::new("/word/charts/chart1.xml").unwrap();
        assert_eq!(uri.base_uri(), "/word/charts");
        assert_eq!(uri.filename(), "chart1.xml");
        assert_eq!(uri.ext(), "xml");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.base_uri(), "/");
        assert_eq!(root.filename(), "");
    }

    #[test]
    fn test_with_idx() {
        let uri = PackURI::new("/word/embeddings/Microsoft_Excel_Worksheet1.xlsx").unwrap();
        assert_eq!(uri.with_idx(4).as_str(), "/word/embeddings/Microsoft_Excel_Worksheet4.xlsx");
        let bare = PackURI::new("/word/embeddings/Microsoft_Excel_Worksheet.xlsx").unwrap();
        assert_eq!(bare.with_idx(2).as_str(), "/word/embeddings/Microsoft_Excel_Worksheet2.xlsx");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/word/charts", "../embeddings/book1.xlsx").unwrap();
        assert_eq!(uri.as_str(), "/word/embeddings/book1.xlsx");
        let abs = PackURI::from_rel_ref("/word/charts", "/word/embeddings/book1.xlsx#x").unwrap();
        assert_eq!(abs.as_str(), "/word/embeddings/book1.xlsx");
        let sibling = PackURI::from_rel_ref("/word", "charts/chart2.xml").unwrap();
        assert_eq!(sibling.as_str(), "/word/charts/chart2.xml");
    }

    #[test]
    fn test_relative_ref() {
        let uri = PackURI::new("/word/embeddings/book2.xlsx").unwrap();
        assert_eq!(uri.relative_ref("/word/charts"), "../embeddings/book2.xlsx");
        assert_eq!(uri.relative_ref("/word"), "embeddings/book2.xlsx");
        assert_eq!(uri.relative_ref("/"), "word/embeddings/book2.xlsx");
    }

    #[test]
    fn test_rels_uri_and_membername() {
        let uri = PackURI::new("/word/charts/chart1.xml").unwrap();
        assert_eq!(uri.rels_uri().as_str(), "/word/charts/_rels/chart1.xml.rels");
        assert_eq!(uri.membername(), "word/charts/chart1.xml");
    }
}
