//! DOCX archive writer
//!
//! Flushes the document's list instances into its numbering part, renders the
//! body, and packs every part into a ZIP archive. Entries are written in
//! sorted order with a fixed timestamp, so identical documents produce
//! identical bytes.

use std::collections::BTreeMap;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

use crate::config::{Compression, WriterOptions};
use crate::document::Document;
use crate::error::{OoxmlError, Result};
use crate::numbering::NUMBERING_PART_PATH;
use crate::relationships::{Relationships, DOCUMENT_RELS_PATH};
use crate::template::{CONTENT_TYPES_PATH, DOCUMENT_PATH};

/// Content type of the numbering part
pub const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// Writes [`Document`]s as DOCX archives
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    options: WriterOptions,
}

impl DocxWriter {
    /// Create a writer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with the given options
    pub fn with_options(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Write `doc` to a file
    ///
    /// The archive is assembled in memory first, so a failure leaves no
    /// partial file behind.
    pub fn save<P: AsRef<Path>>(&self, doc: &Document, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(OoxmlError::EmptyPath);
        }
        let bytes = self.to_bytes(doc)?;
        std::fs::write(path, bytes)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }

    /// Write `doc` to an in-memory buffer
    pub fn to_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        self.write_to(doc, &mut output)?;
        Ok(output.into_inner())
    }

    /// Write `doc` to any seekable writer
    pub fn write_to<W: Write + Seek>(&self, doc: &Document, writer: W) -> Result<()> {
        let parts = self.prepare_parts(doc)?;
        let options = self.file_options();

        let mut zip = ZipWriter::new(writer);
        for (path, contents) in &parts {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }
        zip.finish()?;

        log::debug!("archived {} parts", parts.len());
        Ok(())
    }

    /// Every part that would be archived, keyed by path
    ///
    /// Flushes numbering into the document's file map; nothing else in the
    /// file map is modified.
    pub fn prepare_parts(&self, doc: &Document) -> Result<BTreeMap<String, Vec<u8>>> {
        doc.numbering().apply_to_file_map()?;

        let mut parts = BTreeMap::new();
        parts.insert(DOCUMENT_PATH.to_string(), doc.to_xml().into_bytes());
        for (path, contents) in doc.files().snapshot() {
            parts.entry(path).or_insert(contents);
        }

        if parts.contains_key(NUMBERING_PART_PATH) {
            register_numbering_relationship(&mut parts)?;
            register_numbering_content_type(&mut parts);
        }
        Ok(parts)
    }

    fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default()
            .compression_method(self.options.compression.method())
            .last_modified_time(DateTime::default());
        match self.options.compression {
            Compression::Deflated => options.compression_level(self.options.compression_level),
            Compression::Stored => options,
        }
    }
}

/// Point `word/_rels/document.xml.rels` at the numbering part unless it
/// already does
fn register_numbering_relationship(parts: &mut BTreeMap<String, Vec<u8>>) -> Result<()> {
    let mut rels = match parts.get(DOCUMENT_RELS_PATH) {
        Some(existing) => Relationships::parse(existing)?,
        None => Relationships::new(),
    };
    if rels.find_by_type(Relationships::TYPE_NUMBERING).is_some() {
        return Ok(());
    }

    let id = rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
    log::debug!("registered numbering relationship {}", id);
    parts.insert(DOCUMENT_RELS_PATH.to_string(), rels.to_xml().into_bytes());
    Ok(())
}

/// Declare the numbering part's content type unless already declared
fn register_numbering_content_type(parts: &mut BTreeMap<String, Vec<u8>>) {
    let Some(existing) = parts.get(CONTENT_TYPES_PATH) else {
        log::warn!("package has no {}, numbering content type not declared", CONTENT_TYPES_PATH);
        return;
    };
    let content_types = String::from_utf8_lossy(existing).into_owned();
    if content_types.contains("/word/numbering.xml") {
        return;
    }

    let Some(close) = content_types.rfind("</Types>") else {
        log::warn!("{} has no closing tag, numbering content type not declared", CONTENT_TYPES_PATH);
        return;
    };
    let mut updated = String::with_capacity(content_types.len() + 160);
    updated.push_str(&content_types[..close]);
    updated.push_str(&format!(
        r#"<Override PartName="/word/numbering.xml" ContentType="{}"/>"#,
        NUMBERING_CONTENT_TYPE
    ));
    updated.push_str(&content_types[close..]);
    parts.insert(CONTENT_TYPES_PATH.to_string(), updated.into_bytes());
}
