//! Templates (.dotx/.docx) that seed a document's package parts
//!
//! A template contributes every part except `word/document.xml`, which the
//! writer regenerates from the document body. Its numbering part, if any, is
//! kept and merged with newly allocated lists.
//!
//! # Example
//!
//! ```ignore
//! use listdok_ooxml::{Document, Template};
//!
//! let template = Template::load("corporate.dotx")?;
//! let doc = Document::with_template(template);
//! ```

use std::path::Path;

use crate::error::{OoxmlError, Result};
use crate::file_map::FileMap;
use crate::numbering::{NumberingPart, NUMBERING_PART_PATH};

/// Package content types part
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Main document part
pub const DOCUMENT_PATH: &str = "word/document.xml";

/// Styles part
pub const STYLES_PATH: &str = "word/styles.xml";

const BUILTIN_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const BUILTIN_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const BUILTIN_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const BUILTIN_STYLES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:rPr><w:sz w:val="56"/></w:rPr></w:style>"#;

const BUILTIN_STYLES_TAIL: &str = r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="720"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="IntenseQuote"><w:name w:val="Intense Quote"/><w:basedOn w:val="Normal"/><w:qFormat/><w:rPr><w:i/></w:rPr></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/></w:style></w:styles>"#;

/// Heading level sizes in half-points, `Heading1` first
const HEADING_SIZES: [u32; 9] = [32, 26, 24, 22, 22, 22, 22, 22, 22];

/// A template wrapping the package parts it provides
#[derive(Debug)]
pub struct Template {
    files: FileMap,
}

impl Template {
    /// Load a template from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::validated(FileMap::open(path)?)
    }

    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::validated(FileMap::from_reader(std::io::Cursor::new(bytes))?)
    }

    fn validated(files: FileMap) -> Result<Self> {
        if !files.contains(CONTENT_TYPES_PATH) {
            return Err(OoxmlError::MissingFile(CONTENT_TYPES_PATH.to_string()));
        }
        Ok(Self { files })
    }

    /// The built-in minimal template: content types, relationships and styles
    pub fn builtin() -> Self {
        let files = FileMap::new();
        files.store_string(CONTENT_TYPES_PATH, BUILTIN_CONTENT_TYPES);
        files.store_string("_rels/.rels", BUILTIN_ROOT_RELS);
        files.store_string("word/_rels/document.xml.rels", BUILTIN_DOCUMENT_RELS);
        files.store_string(STYLES_PATH, builtin_styles());
        Self { files }
    }

    /// The template's parts
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// Consume the template and return its parts
    pub fn into_file_map(self) -> FileMap {
        self.files
    }

    /// Whether the template ships a numbering part
    pub fn has_numbering(&self) -> bool {
        self.files.contains(NUMBERING_PART_PATH)
    }

    /// Scan the template's numbering part
    pub fn numbering(&self) -> Option<NumberingPart> {
        self.files
            .load(NUMBERING_PART_PATH)
            .map(|bytes| NumberingPart::scan(&bytes))
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_styles() -> String {
    let mut xml = String::from(BUILTIN_STYLES_HEAD);
    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="{index}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr></w:style>"#
        ));
    }
    xml.push_str(BUILTIN_STYLES_TAIL);
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_minimal_template, create_template_with_numbering};

    #[test]
    fn test_builtin_parts() {
        let template = Template::builtin();
        let files = template.files();

        assert!(files.contains(CONTENT_TYPES_PATH));
        assert!(files.contains("_rels/.rels"));
        assert!(files.contains("word/_rels/document.xml.rels"));
        assert!(!template.has_numbering());

        let styles = files.load_string(STYLES_PATH).unwrap();
        assert!(styles.contains(r#"w:styleId="Title""#));
        assert!(styles.contains(r#"w:styleId="Heading1""#));
        assert!(styles.contains(r#"w:styleId="Heading9""#));
        assert!(styles.contains(r#"<w:outlineLvl w:val="8"/>"#));
        assert!(styles.ends_with("</w:styles>"));
    }

    #[test]
    fn test_load_from_bytes() {
        let template = Template::from_bytes(&create_minimal_template()).unwrap();
        assert!(template.files().contains("word/document.xml"));
        assert!(!template.has_numbering());
    }

    #[test]
    fn test_template_numbering_scan() {
        let template = Template::from_bytes(&create_template_with_numbering()).unwrap();
        let part = template.numbering().unwrap();

        assert!(part.has_num(5));
        assert!(part.has_num(6));
        assert_eq!(part.max_num_id(), Some(6));
    }

    #[test]
    fn test_load_from_invalid_bytes() {
        assert!(Template::from_bytes(b"This is not a ZIP file").is_err());
    }

    #[test]
    fn test_load_from_truncated_zip() {
        assert!(Template::from_bytes(&[0x50, 0x4b, 0x03, 0x04, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_missing_content_types_rejected() {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        zip.finish().unwrap();

        let err = Template::from_bytes(&buffer.into_inner()).unwrap_err();
        assert!(matches!(err, OoxmlError::MissingFile(_)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.dotx");
        std::fs::write(&path, create_template_with_numbering()).unwrap();

        let template = Template::load(&path).unwrap();
        assert!(template.has_numbering());
    }
}
