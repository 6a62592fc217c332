//! In-memory DOCX/DOTX package
//!
//! A package is a ZIP of named parts. Parts are kept in a `BTreeMap`, so
//! iteration and serialization follow part-name order and the same parts
//! always produce the same bytes.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::trace;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{OoxmlError, Result};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const STYLES_PART: &str = "word/styles.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const CORE_PART: &str = "docProps/core.xml";

/// Unpacked OOXML package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OoxmlArchive {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_reader(Cursor::new(bytes))
    }

    /// Unpack every non-directory entry of a ZIP stream
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.insert(entry.name().to_string(), data);
        }

        trace!(parts = parts.len(), "Unpacked package");
        Ok(Self { parts })
    }

    pub fn get(&self, part: &str) -> Option<&[u8]> {
        self.parts.get(part).map(Vec::as_slice)
    }

    /// A part decoded as UTF-8
    ///
    /// `Ok(None)` when the part is absent; an error when it is not valid UTF-8.
    pub fn get_string(&self, part: &str) -> Result<Option<String>> {
        self.parts
            .get(part)
            .map(|bytes| {
                String::from_utf8(bytes.clone()).map_err(|_| {
                    OoxmlError::InvalidStructure(format!("{} is not valid UTF-8", part))
                })
            })
            .transpose()
    }

    /// The main document part
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PART)
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PART.to_string()))
    }

    pub fn styles_xml(&self) -> Option<&[u8]> {
        self.get(STYLES_PART)
    }

    pub fn contains(&self, part: &str) -> bool {
        self.parts.contains_key(part)
    }

    /// Part names in sorted order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn set(&mut self, part: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(part.into(), data);
    }

    pub fn set_string(&mut self, part: impl Into<String>, xml: impl Into<String>) {
        self.set(part, xml.into().into_bytes());
    }

    pub fn remove(&mut self, part: &str) -> Option<Vec<u8>> {
        self.parts.remove(part)
    }

    /// Serialize the package
    ///
    /// Entries are deflated and stamped with the zip epoch so the output only
    /// depends on the parts.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(writer);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Serialize the package into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.write_to(&mut out)?;
        Ok(out.into_inner())
    }
}
