//! Determinism Tests
//!
//! Identical sequences of builder calls must produce identical archives,
//! whether written twice from one document or once each from two documents.

use listdok_ooxml::{Document, DocxWriter, ListKind, WriterOptions};

/// Title, formatted text, nested ordered and bulleted lists, a table and a
/// trailing page break
fn build_sample() -> Document {
    let mut doc = Document::new();
    doc.add_heading("Document Title", 0).unwrap();

    let para = doc.add_paragraph("A plain paragraph having some ");
    para.add_text("bold").bold(true);
    para.add_text(" and some ");
    para.add_text("italic.").italic(true);

    doc.add_heading("Heading, level 1", 1).unwrap();
    doc.add_paragraph("Intense quote").style("IntenseQuote");

    let ordered = doc.new_list(ListKind::Ordered);
    doc.add_paragraph("first item in ordered list")
        .style("ListParagraph")
        .numbering(ordered, 0);
    doc.add_paragraph("nested item")
        .style("ListParagraph")
        .numbering(ordered, 1);
    doc.add_paragraph("second item in ordered list")
        .style("ListParagraph")
        .numbering(ordered, 0);

    let bullets = doc.new_list(ListKind::Unordered);
    doc.add_paragraph("first item in unordered list")
        .style("ListParagraph")
        .numbering(bullets, 0);
    doc.add_paragraph("deeper")
        .style("ListParagraph")
        .numbering(bullets, 2);

    let records = [
        ("Qty", "ID", "Description"),
        ("5", "A001", "Laptop"),
        ("10", "B202", "Smartphone"),
    ];
    let table = doc.add_table();
    table.style("LightList-Accent4");
    for (qty, id, desc) in records {
        let row = table.add_row();
        row.add_cell().add_paragraph(qty);
        row.add_cell().add_paragraph(id);
        row.add_cell().add_paragraph(desc);
    }

    doc.add_page_break();
    doc
}

#[test]
fn test_same_document_written_twice() {
    let doc = build_sample();

    let first = doc.to_bytes().unwrap();
    let second = doc.to_bytes().unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_fresh_documents_match() {
    let first = build_sample().to_bytes().unwrap();
    let second = build_sample().to_bytes().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_saved_files_match() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.docx");
    let b = dir.path().join("b.docx");

    build_sample().save(&a).unwrap();
    build_sample().save(&b).unwrap();

    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn test_stored_output_is_deterministic() {
    let options = WriterOptions::from_toml_str(r#"compression = "stored""#).unwrap();
    let writer = DocxWriter::with_options(options);

    let first = writer.to_bytes(&build_sample()).unwrap();
    let second = writer.to_bytes(&build_sample()).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, build_sample().to_bytes().unwrap());
}

#[test]
fn test_rewrite_after_new_list_differs_only_by_addition() {
    let mut doc = build_sample();
    let before = doc.to_bytes().unwrap();

    let extra = doc.new_list_instance(2);
    doc.add_paragraph("late bullet").numbering(extra, 0);
    let after = doc.to_bytes().unwrap();

    assert_ne!(before, after);

    let numbering = listdok_ooxml::test_utils::extract_file(&after, "word/numbering.xml").unwrap();
    assert_eq!(numbering.matches("<w:num ").count(), 3);
    assert_eq!(numbering.matches("<w:abstractNum ").count(), 2);
}
