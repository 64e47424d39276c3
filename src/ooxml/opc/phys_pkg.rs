//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! Used for both the outer word-processing package and the workbooks embedded
//! inside it. Members are read eagerly into memory; the packages this crate
//! edits are small and every part gets rewritten as a whole anyway.

use crate::ooxml::opc::error::Result;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Largest buffer reserved up front for one member.
pub const PREALLOC_LIMIT: u64 = 1 << 20;

/// Physical package reader over an in-memory ZIP archive.
pub struct PhysPkgReader<'data> {
    archive: ZipArchive<Cursor<&'data [u8]>>,
}

impl<'data> PhysPkgReader<'data> {
    /// Create a new PhysPkgReader from a byte slice.
    ///
    /// # Errors
    /// Returns an error if the data is not a readable ZIP archive.
    pub fn new(data: &'data [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Every file member with its content, in archive order.
    ///
    /// The sizes recorded in the archive are only a hint: buffers start no
    /// larger than [`PREALLOC_LIMIT`] and grow with the data actually inflated.
    pub fn read_all(&mut self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut members = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let mut file = self.archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size().min(PREALLOC_LIMIT) as usize);
            file.read_to_end(&mut blob)?;
            members.push((name, blob));
        }
        Ok(members)
    }
}

/// Physical package writer producing a ZIP archive in memory.
pub struct PhysPkgWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Write one member.
    pub fn write(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(blob)?;
        Ok(())
    }

    /// Finish the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read every file member of an archive.
pub fn read_archive(data: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    PhysPkgReader::new(data)?.read_all()
}

/// Build an archive from `(member name, content)` pairs, in the given order.
pub fn write_archive<'a, I>(members: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = PhysPkgWriter::new();
    for (name, blob) in members {
        writer.write(name, blob)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_keeps_order() {
        let bytes = write_archive([
            ("[Content_Types].xml", b"<Types/>".as_slice()),
            ("word/document.xml", b"<w:document/>".as_slice()),
        ])
        .unwrap();
        let members = read_archive(&bytes).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].0, "[Content_Types].xml");
        assert_eq!(members[1].1, b"<w:document/>");
    }

    #[test]
    fn test_directories_are_skipped() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.add_directory("word/", SimpleFileOptions::default()).unwrap();
        writer.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<w:document/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let members = read_archive(&bytes).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "word/document.xml");
    }

    #[test]
    fn test_garbage_is_zip_error() {
        use crate::ooxml::opc::error::OpcError;
        assert!(matches!(read_archive(b"not a zip"), Err(OpcError::ZipError(_))));
    }
}
