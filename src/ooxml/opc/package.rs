//! Package storage.
//!
//! Every operation of the chart engine is a read-modify-write cycle against a
//! [`PartStore`]: parts are read fresh from storage, edited, and written back
//! whole. Two stores are provided: [`DirPackage`] for a package extracted to
//! disk and [`MemPackage`] for a package held in memory (loaded from and saved
//! to ZIP bytes).
//!
//! Stores are not synchronized. Concurrent edits of one package must be
//! serialized by the caller.

use crate::common::xml::XmlDocument;
use crate::ooxml::opc::content_types::{CONTENT_TYPES_PART, ContentTypes};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::phys_pkg::{read_archive, write_archive};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Access to the parts of one package, keyed by ZIP member name
/// (`word/charts/chart1.xml`, no leading slash).
pub trait PartStore {
    /// Read a whole part. Missing parts are [`OpcError::PartNotFound`].
    fn read_part(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace (or create) a whole part.
    fn write_part(&mut self, name: &str, data: &[u8]) -> Result<()>;

    fn contains_part(&self, name: &str) -> bool;

    /// Every member name in the package.
    fn part_names(&self) -> Result<Vec<String>>;

    /// Read and parse an XML part.
    fn read_xml(&self, name: &str) -> Result<XmlDocument> {
        let bytes = self.read_part(name)?;
        XmlDocument::parse_bytes(&bytes).map_err(|e| OpcError::xml(name, e))
    }

    /// Relationships of `source`, or `None` when it has no `.rels` part.
    fn read_rels(&self, source: &PackURI) -> Result<Option<Relationships>> {
        let rels_uri = source.rels_uri();
        if !self.contains_part(rels_uri.membername()) {
            return Ok(None);
        }
        let bytes = self.read_part(rels_uri.membername())?;
        Relationships::parse(source, &bytes).map(Some)
    }

    /// Write the `.rels` part of `source`.
    fn write_rels(&mut self, source: &PackURI, rels: &Relationships) -> Result<()> {
        self.write_part(source.rels_uri().membername(), &rels.to_bytes())
    }

    fn read_content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(&self.read_part(CONTENT_TYPES_PART)?)
    }

    fn write_content_types(&mut self, types: &ContentTypes) -> Result<()> {
        self.write_part(CONTENT_TYPES_PART, &types.to_bytes())
    }
}

/// A package extracted to a directory tree. Every call goes to disk.
#[derive(Debug, Clone)]
pub struct DirPackage {
    root: PathBuf,
}

impl DirPackage {
    /// Open an extracted package rooted at `root`.
    ///
    /// # Errors
    /// [`OpcError::PackageNotFound`] if `root` is not a directory.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(OpcError::PackageNotFound(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a member; names that would leave the root are rejected.
    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        let mut segments = 0;
        for segment in name.split('/') {
            match segment {
                "" | "." => {},
                ".." => return Err(OpcError::InvalidPackUri(name.to_string())),
                s if s.contains('\\') || s.contains(':') => {
                    return Err(OpcError::InvalidPackUri(name.to_string()));
                },
                s => {
                    path.push(s);
                    segments += 1;
                },
            }
        }
        if segments == 0 {
            return Err(OpcError::InvalidPackUri(name.to_string()));
        }
        Ok(path)
    }

    fn collect_names(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let name = if prefix.is_empty() {
                file_name.to_string()
            } else {
                format!("{}/{}", prefix, file_name)
            };
            if entry.file_type()?.is_dir() {
                Self::collect_names(&entry.path(), &name, out)?;
            } else {
                out.push(name);
            }
        }
        Ok(())
    }
}

impl PartStore for DirPackage {
    fn read_part(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OpcError::PartNotFound(name.to_string()))
            },
            Err(e) => Err(e.into()),
        }
    }

    fn write_part(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    fn contains_part(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|p| p.is_file())
    }

    fn part_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        Self::collect_names(&self.root, "", &mut names)?;
        names.sort();
        Ok(names)
    }
}

/// A package held in memory, in member order.
#[derive(Debug, Clone, Default)]
pub struct MemPackage {
    parts: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
}

impl MemPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every member of a ZIP archive.
    pub fn from_zip(data: &[u8]) -> Result<Self> {
        let mut package = Self::new();
        for (name, blob) in read_archive(data)? {
            package.insert(name, blob);
        }
        Ok(package)
    }

    /// Repackage as a ZIP archive, members in their original order followed by
    /// members added since.
    pub fn to_zip(&self) -> Result<Vec<u8>> {
        write_archive(self.parts.iter().map(|(n, b)| (n.as_str(), b.as_slice())))
    }

    /// Insert or replace a member.
    pub fn insert(&mut self, name: impl Into<String>, blob: Vec<u8>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.parts[i].1 = blob,
            None => {
                self.index.insert(name.clone(), self.parts.len());
                self.parts.push((name, blob));
            },
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.index.get(name).map(|&i| self.parts[i].1.as_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<u8>)> for MemPackage {
    fn from_iter<T: IntoIterator<Item = (N, Vec<u8>)>>(iter: T) -> Self {
        let mut package = Self::new();
        for (name, blob) in iter {
            package.insert(name, blob);
        }
        package
    }
}

impl PartStore for MemPackage {
    fn read_part(&self, name: &str) -> Result<Vec<u8>> {
        self.get(name)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| OpcError::PartNotFound(name.to_string()))
    }

    fn write_part(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.insert(name, data.to_vec());
        Ok(())
    }

    fn contains_part(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn part_names(&self) -> Result<Vec<String>> {
        Ok(self.parts.iter().map(|(n, _)| n.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_package_zip_round_trip() {
        let mut package: MemPackage = [
            ("[Content_Types].xml", b"<Types/>".to_vec()),
            ("word/document.xml", b"<w:document/>".to_vec()),
        ]
        .into_iter()
        .collect();
        package.write_part("word/charts/chart1.xml", b"<c:chartSpace/>").unwrap();
        package.write_part("word/document.xml", b"<w:document>x</w:document>").unwrap();

        let reloaded = MemPackage::from_zip(&package.to_zip().unwrap()).unwrap();
        assert_eq!(
            reloaded.part_names().unwrap(),
            vec!["[Content_Types].xml", "word/document.xml", "word/charts/chart1.xml"]
        );
        assert_eq!(reloaded.get("word/document.xml"), Some(b"<w:document>x</w:document>".as_slice()));
        assert!(matches!(reloaded.read_part("nope.xml"), Err(OpcError::PartNotFound(_))));
    }

    #[test]
    fn test_dir_package_reads_writes_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = DirPackage::open(dir.path()).unwrap();
        package.write_part("word/charts/chart1.xml", b"<c/>").unwrap();
        package.write_part("[Content_Types].xml", b"<Types/>").unwrap();

        assert!(package.contains_part("word/charts/chart1.xml"));
        assert!(!package.contains_part("word/charts/chart2.xml"));
        assert_eq!(package.read_part("word/charts/chart1.xml").unwrap(), b"<c/>");
        assert_eq!(
            package.part_names().unwrap(),
            vec!["[Content_Types].xml", "word/charts/chart1.xml"]
        );
        assert!(matches!(package.read_part("word/missing.xml"), Err(OpcError::PartNotFound(_))));
    }

    #[test]
    fn test_dir_package_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = DirPackage::open(dir.path()).unwrap();
        assert!(matches!(
            package.write_part("../outside.xml", b"x"),
            Err(OpcError::InvalidPackUri(_))
        ));
        assert!(matches!(package.read_part(""), Err(OpcError::InvalidPackUri(_))));
        assert!(DirPackage::open(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_read_rels_absent_is_none() {
        let package = MemPackage::new();
        let source = PackURI::new("/word/document.xml").unwrap();
        assert!(package.read_rels(&source).unwrap().is_none());
    }
}
