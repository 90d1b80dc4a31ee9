//! # listdok-ooxml
//!
//! WordprocessingML (.docx) generation with independently numbered lists.
//!
//! This crate provides functionality to:
//! - Build documents with headings, paragraphs, tables and page breaks
//! - Allocate list instances that each restart at 1, on built-in ordered and
//!   bulleted multi-level definitions or on a template's own definitions
//! - Merge those instances into a template's numbering part without touching
//!   its existing content
//! - Write byte-for-byte reproducible DOCX archives
//!
//! ## Example
//!
//! ```no_run
//! use listdok_ooxml::{Document, ListKind};
//!
//! let mut doc = Document::new();
//! doc.add_heading("Checklist", 1)?;
//!
//! let steps = doc.new_list(ListKind::Ordered);
//! doc.add_paragraph("Unpack").numbering(steps, 0);
//! doc.add_paragraph("Check contents").numbering(steps, 1);
//!
//! let notes = doc.new_list(ListKind::Unordered);
//! doc.add_paragraph("Keep the box").numbering(notes, 0);
//!
//! doc.save("checklist.docx")?;
//! # Ok::<(), listdok_ooxml::OoxmlError>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod file_map;
pub mod numbering;
pub mod relationships;
pub mod template;
#[doc(hidden)]
pub mod test_utils;
pub mod writer;

pub use config::{Compression, WriterOptions};
pub use document::{
    numbering_references, Block, Document, NumberedParagraph, NumberingRef, Paragraph, Run,
    Table, TableCell, TableRow,
};
pub use error::{OoxmlError, Result};
pub use file_map::FileMap;
pub use numbering::{ListKind, NumberingInstance, NumberingManager, NumberingPart};
pub use relationships::Relationships;
pub use template::Template;
pub use writer::DocxWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
