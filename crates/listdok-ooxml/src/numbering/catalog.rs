//! Built-in multi-level list definitions
//!
//! Callers ask for lists by a small logical kind (`1` ordered, `2`
//! bulleted). Those kinds resolve to two abstract numbering definitions that
//! this crate owns and injects into the numbering part on demand. Any other
//! value is treated as an abstract id that already lives in a template.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::Result;

/// Abstract id of the ordered (decimal family) definition
pub const ORDERED_ABSTRACT_ID: u32 = 201;

/// Abstract id of the bulleted definition
pub const BULLET_ABSTRACT_ID: u32 = 202;

/// Both catalog ids, in the order they are rendered
pub const CATALOG_ABSTRACT_IDS: [u32; 2] = [ORDERED_ABSTRACT_ID, BULLET_ABSTRACT_ID];

/// Number of levels in each definition (`w:ilvl` 0..=8)
pub const LEVEL_COUNT: u8 = 9;

/// Hanging indent and per-level left indent step, in twentieths of a point
const LEVEL_INDENT: u32 = 360;

/// Logical list kind requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Numbered list backed by [`ORDERED_ABSTRACT_ID`]
    Ordered,
    /// Bulleted list backed by [`BULLET_ABSTRACT_ID`]
    Unordered,
    /// Raw abstract id, written through unchanged
    Abstract(u32),
}

impl ListKind {
    /// The abstract numbering id an instance of this kind follows
    pub fn abstract_id(self) -> u32 {
        match self {
            ListKind::Ordered => ORDERED_ABSTRACT_ID,
            ListKind::Unordered => BULLET_ABSTRACT_ID,
            ListKind::Abstract(id) => id,
        }
    }
}

impl From<u32> for ListKind {
    fn from(kind: u32) -> Self {
        match kind {
            1 => ListKind::Ordered,
            2 => ListKind::Unordered,
            other => ListKind::Abstract(other),
        }
    }
}

/// Map a logical kind to its abstract id: `1 -> 201`, `2 -> 202`, else unchanged
pub fn normalize_abstract(kind: u32) -> u32 {
    ListKind::from(kind).abstract_id()
}

/// `w:numFmt` of an ordered level, cycling every four levels
pub fn ordered_num_fmt(level: u8) -> &'static str {
    match level % 4 {
        0 => "decimal",
        1 => "lowerLetter",
        2 => "lowerRoman",
        _ => "upperLetter",
    }
}

/// Bullet glyph and its font for a level, cycling every four levels
pub fn bullet_glyph(level: u8) -> (&'static str, &'static str) {
    match level % 4 {
        0 => ("\u{F0B7}", "Symbol"),    // disc
        1 => ("\u{25CB}", "Symbol"),    // hollow circle
        2 => ("\u{25A0}", "Wingdings"), // square
        _ => ("\u{2666}", "Symbol"),    // diamond
    }
}

/// Render both catalog definitions (201 then 202) as one XML fragment
pub fn render_definitions() -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    for id in CATALOG_ABSTRACT_IDS {
        write_definition(&mut writer, id)?;
    }
    Ok(writer.into_inner())
}

/// Render a single catalog definition, or `None` if `abstract_id` is not ours
pub fn render_definition(abstract_id: u32) -> Result<Option<Vec<u8>>> {
    if !CATALOG_ABSTRACT_IDS.contains(&abstract_id) {
        return Ok(None);
    }
    let mut writer = Writer::new(Vec::new());
    write_definition(&mut writer, abstract_id)?;
    Ok(Some(writer.into_inner()))
}

fn write_definition<W: Write>(writer: &mut Writer<W>, abstract_id: u32) -> Result<()> {
    let id = abstract_id.to_string();
    let mut root = BytesStart::new("w:abstractNum");
    root.push_attribute(("w:abstractNumId", id.as_str()));
    writer.write_event(Event::Start(root))?;
    write_empty(writer, "w:multiLevelType", &[("w:val", "hybridMultilevel")])?;

    for level in 0..LEVEL_COUNT {
        let ilvl = level.to_string();
        let mut lvl = BytesStart::new("w:lvl");
        lvl.push_attribute(("w:ilvl", ilvl.as_str()));
        writer.write_event(Event::Start(lvl))?;

        write_empty(writer, "w:start", &[("w:val", "1")])?;
        if abstract_id == BULLET_ABSTRACT_ID {
            let (glyph, _) = bullet_glyph(level);
            write_empty(writer, "w:numFmt", &[("w:val", "bullet")])?;
            write_empty(writer, "w:lvlText", &[("w:val", glyph)])?;
        } else {
            let text = format!("%{}.", level + 1);
            write_empty(writer, "w:numFmt", &[("w:val", ordered_num_fmt(level))])?;
            write_empty(writer, "w:lvlText", &[("w:val", text.as_str())])?;
        }
        write_empty(writer, "w:lvlJc", &[("w:val", "left")])?;
        write_level_indent(writer, level)?;

        if abstract_id == BULLET_ABSTRACT_ID {
            let (_, font) = bullet_glyph(level);
            writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
            write_empty(
                writer,
                "w:rFonts",
                &[("w:ascii", font), ("w:hAnsi", font), ("w:hint", "default")],
            )?;
            writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:lvl")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:abstractNum")))?;
    Ok(())
}

/// `<w:pPr>` with the number tab stop and hanging indent for `level`
fn write_level_indent<W: Write>(writer: &mut Writer<W>, level: u8) -> Result<()> {
    let pos = (LEVEL_INDENT * (u32::from(level) + 1)).to_string();
    let hanging = LEVEL_INDENT.to_string();

    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    writer.write_event(Event::Start(BytesStart::new("w:tabs")))?;
    write_empty(writer, "w:tab", &[("w:val", "num"), ("w:pos", pos.as_str())])?;
    writer.write_event(Event::End(BytesEnd::new("w:tabs")))?;
    write_empty(
        writer,
        "w:ind",
        &[("w:left", pos.as_str()), ("w:hanging", hanging.as_str())],
    )?;
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    Ok(())
}

pub(crate) fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> String {
        String::from_utf8(render_definitions().unwrap()).unwrap()
    }

    #[test]
    fn test_normalize_abstract() {
        assert_eq!(normalize_abstract(1), 201);
        assert_eq!(normalize_abstract(2), 202);
        assert_eq!(normalize_abstract(99), 99);
        assert_eq!(normalize_abstract(0), 0);
        assert_eq!(normalize_abstract(201), 201);
    }

    #[test]
    fn test_list_kind_from_u32() {
        assert_eq!(ListKind::from(1), ListKind::Ordered);
        assert_eq!(ListKind::from(2), ListKind::Unordered);
        assert_eq!(ListKind::from(7), ListKind::Abstract(7));
        assert_eq!(ListKind::Abstract(7).abstract_id(), 7);
    }

    #[test]
    fn test_ordered_formats_cycle() {
        let expected = ["decimal", "lowerLetter", "lowerRoman", "upperLetter"];
        for level in 0..LEVEL_COUNT {
            assert_eq!(ordered_num_fmt(level), expected[usize::from(level % 4)]);
        }
    }

    #[test]
    fn test_bullet_glyphs_cycle() {
        let expected = [
            ("\u{F0B7}", "Symbol"),
            ("\u{25CB}", "Symbol"),
            ("\u{25A0}", "Wingdings"),
            ("\u{2666}", "Symbol"),
        ];
        for level in 0..LEVEL_COUNT {
            assert_eq!(bullet_glyph(level), expected[usize::from(level % 4)]);
        }
    }

    #[test]
    fn test_render_definitions_structure() {
        let xml = definitions();

        assert!(xml.starts_with(r#"<w:abstractNum w:abstractNumId="201"><w:multiLevelType w:val="hybridMultilevel"/>"#));
        assert!(xml.contains(r#"<w:abstractNum w:abstractNumId="202"><w:multiLevelType w:val="hybridMultilevel"/>"#));
        assert_eq!(xml.matches("<w:abstractNum ").count(), 2);
        assert_eq!(xml.matches("<w:lvl ").count(), 18);
        assert!(xml.ends_with("</w:abstractNum>"));
    }

    #[test]
    fn test_ordered_levels_rendered() {
        let xml = definitions();

        assert!(xml.contains(r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:tabs><w:tab w:val="num" w:pos="360"/></w:tabs><w:ind w:left="360" w:hanging="360"/></w:pPr></w:lvl>"#));
        assert!(xml.contains(r#"<w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%2."/>"#));
        assert!(xml.contains(r#"<w:lvl w:ilvl="2"><w:start w:val="1"/><w:numFmt w:val="lowerRoman"/>"#));
        assert!(xml.contains(r#"<w:lvl w:ilvl="7"><w:start w:val="1"/><w:numFmt w:val="upperLetter"/><w:lvlText w:val="%8."/>"#));
        assert!(xml.contains(r#"<w:ind w:left="3240" w:hanging="360"/>"#));
    }

    #[test]
    fn test_bullet_levels_rendered() {
        let xml = definitions();

        assert!(xml.contains("<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{F0B7}\"/>"));
        assert!(xml.contains("<w:lvl w:ilvl=\"1\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{25CB}\"/>"));
        assert!(xml.contains("<w:lvl w:ilvl=\"2\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{25A0}\"/>"));
        assert!(xml.contains("<w:lvl w:ilvl=\"3\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/><w:lvlText w:val=\"\u{2666}\"/>"));
        assert!(xml.contains(r#"<w:rPr><w:rFonts w:ascii="Wingdings" w:hAnsi="Wingdings" w:hint="default"/></w:rPr>"#));
        assert_eq!(xml.matches("<w:rFonts ").count(), 9);
    }

    #[test]
    fn test_render_definition_single() {
        let ordered = String::from_utf8(render_definition(201).unwrap().unwrap()).unwrap();
        assert!(ordered.contains(r#"w:abstractNumId="201""#));
        assert!(!ordered.contains(r#"w:abstractNumId="202""#));

        assert!(render_definition(5).unwrap().is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render_definitions().unwrap(), render_definitions().unwrap());
    }
}
