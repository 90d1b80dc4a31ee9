//! Document body model (word/document.xml)
//!
//! A [`Document`] owns the package parts it was created from and a
//! [`NumberingManager`] sharing those parts. Content is appended through a
//! small builder API and rendered into `word/document.xml` when written.
//!
//! ```no_run
//! use listdok_ooxml::Document;
//!
//! let mut doc = Document::new();
//! doc.add_heading("Inventory", 1)?;
//!
//! let list = doc.new_list_instance(1);
//! doc.add_paragraph("First").numbering(list, 0);
//! doc.add_paragraph("Nested").numbering(list, 1);
//!
//! doc.save("inventory.docx")?;
//! # Ok::<(), listdok_ooxml::OoxmlError>(())
//! ```

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::{OoxmlError, Result};
use crate::file_map::FileMap;
use crate::numbering::{ListKind, NumberingManager, WORDPROCESSINGML_NS};
use crate::relationships::escape_xml;
use crate::template::Template;
use crate::writer::DocxWriter;

/// Deepest heading level with a built-in style
pub const MAX_HEADING_LEVEL: u8 = 9;

/// A Word document under construction
#[derive(Debug)]
pub struct Document {
    files: FileMap,
    numbering: NumberingManager,
    blocks: Vec<Block>,
}

/// Block-level elements
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A paragraph holding a single page break
    PageBreak,
}

/// A paragraph with its style, runs and list membership
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Style ID (references styles.xml)
    pub style_id: Option<String>,
    /// Text runs
    pub runs: Vec<Run>,
    /// Numbering reference, written through as given
    pub numbering: Option<NumberingRef>,
}

/// A text run with formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// The text content
    pub text: String,
    /// Whether the text is bold
    pub bold: bool,
    /// Whether the text is italic
    pub italic: bool,
}

/// Reference to a numbering instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    /// Numbering instance ID (`w:numId`)
    pub num_id: u32,
    /// Indent level (0-based)
    pub ilvl: u32,
}

/// A table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table style ID
    pub style_id: Option<String>,
    /// Table rows
    pub rows: Vec<TableRow>,
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
}

/// A table cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    /// Paragraphs in this cell
    pub paragraphs: Vec<Paragraph>,
}

/// A paragraph carrying a numbering reference, as found in a document part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedParagraph {
    /// Position among all paragraphs of the part (0-based)
    pub index: usize,
    /// Paragraph style, if any
    pub style_id: Option<String>,
    /// Referenced numbering instance
    pub num_id: u32,
    /// Indent level, 0 when absent
    pub ilvl: u32,
    /// Concatenated run text
    pub text: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document on the built-in template
    pub fn new() -> Self {
        Self::with_template(Template::builtin())
    }

    /// Create an empty document on a template given as bytes
    pub fn from_template(bytes: &[u8]) -> Result<Self> {
        Ok(Self::with_template(Template::from_bytes(bytes)?))
    }

    /// Open a .docx or .dotx file as the base package
    ///
    /// The file's parts are kept; its body is replaced by whatever is added
    /// to the returned document.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_template(Template::load(path)?))
    }

    /// Create an empty document on a loaded template
    pub fn with_template(template: Template) -> Self {
        let files = template.into_file_map();
        Self {
            numbering: NumberingManager::new(files.clone()),
            files,
            blocks: Vec::new(),
        }
    }

    /// Package parts backing this document
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// The document's numbering manager
    pub fn numbering(&self) -> &NumberingManager {
        &self.numbering
    }

    /// Body blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Top-level paragraphs (excluding table content)
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Allocate a new list instance (`1` ordered, `2` bulleted, otherwise a
    /// raw abstract id) and return its `numId`
    pub fn new_list_instance(&self, kind: u32) -> u32 {
        self.numbering.new_list_instance(kind)
    }

    /// Allocate a new list instance of the given kind
    pub fn new_list(&self, kind: ListKind) -> u32 {
        self.numbering.new_list(kind)
    }

    /// Add a heading; level 0 is the document title
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<&mut Paragraph> {
        if level > MAX_HEADING_LEVEL {
            return Err(OoxmlError::InvalidHeadingLevel(level));
        }
        let style = match level {
            0 => "Title".to_string(),
            n => format!("Heading{}", n),
        };
        let para = self.add_paragraph(text);
        para.style(style);
        Ok(para)
    }

    /// Add a paragraph, with a single run unless `text` is empty
    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        self.push_paragraph(Paragraph::with_text(text))
    }

    /// Add an empty table
    pub fn add_table(&mut self) -> &mut Table {
        self.push_table(Table::default())
    }

    /// Add a page break
    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.blocks.push(Block::Paragraph(paragraph));
        let Some(Block::Paragraph(pushed)) = self.blocks.last_mut() else {
            unreachable!("last block is the paragraph just pushed");
        };
        pushed
    }

    fn push_table(&mut self, table: Table) -> &mut Table {
        self.blocks.push(Block::Table(table));
        let Some(Block::Table(pushed)) = self.blocks.last_mut() else {
            unreachable!("last block is the table just pushed");
        };
        pushed
    }

    /// Write the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        DocxWriter::new().save(self, path)
    }

    /// Write the document to any seekable writer
    pub fn write_to<W: std::io::Write + std::io::Seek>(&self, writer: W) -> Result<()> {
        DocxWriter::new().write_to(self, writer)
    }

    /// Write the document to an in-memory buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        DocxWriter::new().to_bytes(self)
    }

    /// Render `word/document.xml`
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            WORDPROCESSINGML_NS
        ));
        xml.push('\n');
        xml.push_str("<w:body>\n");

        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => p.write_xml(&mut xml),
                Block::Table(t) => t.write_xml(&mut xml),
                Block::PageBreak => {
                    xml.push_str("<w:p>\n<w:r>\n<w:br w:type=\"page\"/>\n</w:r>\n</w:p>\n");
                }
            }
        }

        xml.push_str("</w:body>\n");
        xml.push_str("</w:document>");
        xml
    }
}

impl Paragraph {
    /// Create a paragraph with one plain run, or none when `text` is empty
    pub fn with_text(text: &str) -> Self {
        let mut para = Self::default();
        if !text.is_empty() {
            para.add_text(text);
        }
        para
    }

    /// Set the paragraph style
    pub fn style(&mut self, style_id: impl Into<String>) -> &mut Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Append a run and return it for formatting
    pub fn add_text(&mut self, text: &str) -> &mut Run {
        self.runs.push(Run {
            text: text.to_string(),
            ..Run::default()
        });
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Attach the paragraph to a list instance at `level`
    ///
    /// Neither value is checked against allocated instances.
    pub fn numbering(&mut self, num_id: u32, level: u32) -> &mut Self {
        self.numbering = Some(NumberingRef {
            num_id,
            ilvl: level,
        });
        self
    }

    /// Concatenated run text
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn write_xml(&self, xml: &mut String) {
        xml.push_str("<w:p>\n");

        if self.style_id.is_some() || self.numbering.is_some() {
            xml.push_str("<w:pPr>\n");
            if let Some(style) = &self.style_id {
                xml.push_str(&format!("<w:pStyle w:val=\"{}\"/>\n", escape_xml(style)));
            }
            if let Some(num) = &self.numbering {
                xml.push_str("<w:numPr>\n");
                xml.push_str(&format!("<w:ilvl w:val=\"{}\"/>\n", num.ilvl));
                xml.push_str(&format!("<w:numId w:val=\"{}\"/>\n", num.num_id));
                xml.push_str("</w:numPr>\n");
            }
            xml.push_str("</w:pPr>\n");
        }

        for run in &self.runs {
            run.write_xml(xml);
        }

        xml.push_str("</w:p>\n");
    }
}

impl Run {
    /// Set bold
    pub fn bold(&mut self, bold: bool) -> &mut Self {
        self.bold = bold;
        self
    }

    /// Set italic
    pub fn italic(&mut self, italic: bool) -> &mut Self {
        self.italic = italic;
        self
    }

    fn write_xml(&self, xml: &mut String) {
        xml.push_str("<w:r>\n");
        if self.bold || self.italic {
            xml.push_str("<w:rPr>\n");
            if self.bold {
                xml.push_str("<w:b/>\n");
            }
            if self.italic {
                xml.push_str("<w:i/>\n");
            }
            xml.push_str("</w:rPr>\n");
        }
        xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t>\n",
            escape_xml(&self.text)
        ));
        xml.push_str("</w:r>\n");
    }
}

impl Table {
    /// Set the table style
    pub fn style(&mut self, style_id: impl Into<String>) -> &mut Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Append an empty row
    pub fn add_row(&mut self) -> &mut TableRow {
        self.rows.push(TableRow::default());
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Widest row, used for the column grid
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    fn write_xml(&self, xml: &mut String) {
        xml.push_str("<w:tbl>\n");

        xml.push_str("<w:tblPr>\n");
        if let Some(style) = &self.style_id {
            xml.push_str(&format!("<w:tblStyle w:val=\"{}\"/>\n", escape_xml(style)));
        }
        xml.push_str("<w:tblW w:w=\"5000\" w:type=\"pct\"/>\n");
        xml.push_str("</w:tblPr>\n");

        let columns = self.column_count();
        if columns > 0 {
            xml.push_str("<w:tblGrid>\n");
            for _ in 0..columns {
                xml.push_str("<w:gridCol w:w=\"2000\"/>\n");
            }
            xml.push_str("</w:tblGrid>\n");
        }

        for row in &self.rows {
            xml.push_str("<w:tr>\n");
            for cell in &row.cells {
                xml.push_str("<w:tc>\n");
                for para in &cell.paragraphs {
                    para.write_xml(xml);
                }
                // A cell must end with a paragraph
                if cell.paragraphs.is_empty() {
                    xml.push_str("<w:p/>\n");
                }
                xml.push_str("</w:tc>\n");
            }
            xml.push_str("</w:tr>\n");
        }

        xml.push_str("</w:tbl>\n");
    }
}

impl TableRow {
    /// Append an empty cell
    pub fn add_cell(&mut self) -> &mut TableCell {
        self.cells.push(TableCell::default());
        let last = self.cells.len() - 1;
        &mut self.cells[last]
    }
}

impl TableCell {
    /// Append a paragraph to the cell
    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::with_text(text));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }
}

/// Collect every paragraph with a `w:numPr/w:numId`, in document order
///
/// Paragraphs inside tables are included. References are reported as
/// written, whether or not the numbering part defines them.
pub fn numbering_references(xml: &[u8]) -> Result<Vec<NumberedParagraph>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut found = Vec::new();
    let mut buf = Vec::new();
    let mut index = 0usize;
    let mut current: Option<ParagraphScan> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => current = Some(ParagraphScan::default()),
                b"t" => in_text = current.is_some(),
                _ => {
                    if let Some(scan) = current.as_mut() {
                        scan.property(e);
                    }
                }
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => index += 1,
                _ => {
                    if let Some(scan) = current.as_mut() {
                        scan.property(e);
                    }
                }
            },
            Ok(Event::Text(ref t)) if in_text => {
                if let Some(scan) = current.as_mut() {
                    scan.text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(scan) = current.take() {
                        if let Some(num_id) = scan.num_id {
                            found.push(NumberedParagraph {
                                index,
                                style_id: scan.style_id,
                                num_id,
                                ilvl: scan.ilvl.unwrap_or(0),
                                text: scan.text,
                            });
                        }
                    }
                    index += 1;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(found)
}

#[derive(Default)]
struct ParagraphScan {
    style_id: Option<String>,
    num_id: Option<u32>,
    ilvl: Option<u32>,
    text: String,
}

impl ParagraphScan {
    fn property(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"pStyle" => self.style_id = get_attr(e, b"w:val"),
            b"numId" => self.num_id = get_attr(e, b"w:val").and_then(|v| v.parse().ok()),
            b"ilvl" => self.ilvl = get_attr(e, b"w:val").and_then(|v| v.parse().ok()),
            _ => {}
        }
    }
}

fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles() {
        let mut doc = Document::new();
        doc.add_heading("Report", 0).unwrap();
        doc.add_heading("Scope", 1).unwrap();
        doc.add_heading("Detail", 9).unwrap();

        let styles: Vec<_> = doc
            .paragraphs()
            .map(|p| p.style_id.clone().unwrap())
            .collect();
        assert_eq!(styles, vec!["Title", "Heading1", "Heading9"]);
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let mut doc = Document::new();
        let err = doc.add_heading("Too deep", 10).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidHeadingLevel(10)));
        assert!(doc.blocks().is_empty());
    }

    #[test]
    fn test_paragraph_runs_and_formatting() {
        let mut doc = Document::new();
        let para = doc.add_paragraph("A plain paragraph having some ");
        para.add_text("bold").bold(true);
        para.add_text(" and some ");
        para.add_text("italic.").italic(true);

        let xml = doc.to_xml();
        assert!(xml.contains("<w:rPr>\n<w:b/>\n</w:rPr>\n<w:t xml:space=\"preserve\">bold</w:t>"));
        assert!(xml.contains("<w:rPr>\n<w:i/>\n</w:rPr>\n<w:t xml:space=\"preserve\">italic.</w:t>"));
        assert_eq!(
            doc.paragraphs().next().unwrap().plain_text(),
            "A plain paragraph having some bold and some italic."
        );
    }

    #[test]
    fn test_empty_paragraph_has_no_runs() {
        let mut doc = Document::new();
        doc.add_paragraph("");
        assert!(doc.paragraphs().next().unwrap().runs.is_empty());
        assert!(doc.to_xml().contains("<w:body>\n<w:p>\n</w:p>\n</w:body>"));
    }

    #[test]
    fn test_numbering_written_through_unvalidated() {
        let mut doc = Document::new();
        doc.add_paragraph("Dangling").numbering(42, 12);

        let xml = doc.to_xml();
        assert!(xml.contains("<w:numPr>\n<w:ilvl w:val=\"12\"/>\n<w:numId w:val=\"42\"/>\n</w:numPr>"));
        assert!(doc.numbering().is_empty());
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = Document::new();
        doc.add_paragraph("Fish & <Chips>").style("Intense \"Quote\"");

        let xml = doc.to_xml();
        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(xml.contains("<w:pStyle w:val=\"Intense &quot;Quote&quot;\"/>"));
    }

    #[test]
    fn test_table_xml() {
        let mut doc = Document::new();
        let table = doc.add_table();
        table.style("LightList-Accent4");
        let header = table.add_row();
        for label in ["Qty", "ID", "Description"] {
            header.add_cell().add_paragraph(label);
        }
        table.add_row().add_cell();

        let xml = doc.to_xml();
        assert!(xml.contains("<w:tblStyle w:val=\"LightList-Accent4\"/>"));
        assert_eq!(xml.matches("<w:gridCol ").count(), 3);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert!(xml.contains("<w:tc>\n<w:p/>\n</w:tc>"));
    }

    #[test]
    fn test_builders_return_the_added_block() {
        let mut doc = Document::new();
        doc.add_paragraph("before").style("Quote");
        doc.add_table().style("TableGrid");
        doc.add_paragraph("after").numbering(4, 2);

        match doc.blocks() {
            [Block::Paragraph(before), Block::Table(table), Block::Paragraph(after)] => {
                assert_eq!(before.style_id.as_deref(), Some("Quote"));
                assert!(before.numbering.is_none());
                assert_eq!(table.style_id.as_deref(), Some("TableGrid"));
                assert_eq!(after.plain_text(), "after");
                assert_eq!(after.numbering, Some(NumberingRef { num_id: 4, ilvl: 2 }));
            }
            other => panic!("unexpected blocks: {:?}", other),
        }
    }

    #[test]
    fn test_page_break() {
        let mut doc = Document::new();
        doc.add_page_break();
        assert_eq!(doc.blocks(), &[Block::PageBreak]);
        assert!(doc.to_xml().contains("<w:br w:type=\"page\"/>"));
    }

    #[test]
    fn test_document_xml_shape() {
        let doc = Document::new();
        let xml = doc.to_xml();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(&format!(r#"xmlns:w="{}""#, WORDPROCESSINGML_NS)));
        assert!(xml.ends_with("</w:body>\n</w:document>"));
    }

    #[test]
    fn test_list_instances_share_file_map() {
        let doc = Document::new();
        assert_eq!(doc.new_list_instance(1), 1);
        assert_eq!(doc.new_list(ListKind::Unordered), 2);

        doc.numbering().apply_to_file_map().unwrap();
        assert!(doc.files().contains(crate::numbering::NUMBERING_PART_PATH));
    }

    #[test]
    fn test_numbering_references_round_trip() {
        let mut doc = Document::new();
        let ordered = doc.new_list_instance(1);
        doc.add_heading("Lists", 1).unwrap();
        doc.add_paragraph("one").style("ListParagraph").numbering(ordered, 0);
        doc.add_paragraph("one.a").numbering(ordered, 1);
        doc.add_table()
            .add_row()
            .add_cell()
            .add_paragraph("in cell")
            .numbering(7, 2);

        let refs = numbering_references(doc.to_xml().as_bytes()).unwrap();
        assert_eq!(refs.len(), 3);

        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[0].style_id.as_deref(), Some("ListParagraph"));
        assert_eq!((refs[0].num_id, refs[0].ilvl), (ordered, 0));
        assert_eq!(refs[0].text, "one");

        assert_eq!((refs[1].num_id, refs[1].ilvl), (ordered, 1));
        assert_eq!((refs[2].index, refs[2].num_id, refs[2].ilvl), (3, 7, 2));
    }

    #[test]
    fn test_numbering_references_counts_empty_paragraphs() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
            <w:p/>
            <w:p><w:pPr><w:numPr><w:numId w:val="3"/></w:numPr></w:pPr><w:r><w:t>a &amp; b</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let refs = numbering_references(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[0].ilvl, 0);
        assert_eq!(refs[0].text, "a & b");
    }

    #[test]
    fn test_numbering_references_malformed() {
        assert!(numbering_references(b"<w:p><w:r></w:p>").is_err());
    }
}
