//! Structured view of an existing numbering part
//!
//! Templates arrive with their own `word/numbering.xml`. Before new content is
//! merged into it we need to know which `w:num` and `w:abstractNum` ids it
//! already declares and where the root element opens and closes. The scan
//! never fails: mismatched end tags and parse errors mark the part as
//! malformed, ids are still collected from the rest of the bytes, and offsets
//! that could not be located are reported as `None`.

use std::collections::BTreeSet;
use std::ops::Range;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::Result;

/// One `w:num` entry found in a numbering part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumEntry {
    /// `w:num/@w:numId`
    pub num_id: u32,
    /// `w:abstractNumId/@w:val`, if present and numeric
    pub abstract_id: Option<u32>,
    /// `w:startOverride/@w:val` of the level 0 override, if any
    pub start_override: Option<u32>,
}

/// Serializable overview of a numbering part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberingSummary {
    /// Declared abstract definitions, ascending
    pub abstract_ids: Vec<u32>,
    /// Instances in document order
    pub instances: Vec<NumEntry>,
    /// Whether the part failed to parse completely
    pub malformed: bool,
}

/// Ids and splice offsets of a scanned numbering part
#[derive(Debug, Clone, Default)]
pub struct NumberingPart {
    entries: Vec<NumEntry>,
    num_ids: BTreeSet<u32>,
    abstract_ids: BTreeSet<u32>,
    root_name: Option<String>,
    root_open_end: Option<usize>,
    root_close_start: Option<usize>,
    empty_root: Option<Range<usize>>,
    malformed: bool,
}

impl NumberingPart {
    /// Scan numbering part bytes
    pub fn scan(xml: &[u8]) -> Self {
        let mut part = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().check_end_names = false;
        let mut buf = Vec::new();

        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut current: Option<NumEntry> = None;
        let mut override_level: Option<u32> = None;
        let mut last_error_at: Option<usize> = None;

        loop {
            let event = reader.read_event_into(&mut buf);
            let after = reader.buffer_position() as usize;
            match event {
                Ok(Event::Start(ref e)) => {
                    if open.is_empty() && part.is_rootless() && e.local_name().as_ref() == b"numbering"
                    {
                        part.root_name = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                        part.root_open_end = Some(after);
                    }
                    open.push(e.name().as_ref().to_vec());
                    part.visit(e, &mut current, &mut override_level, false);
                }
                Ok(Event::Empty(ref e)) => {
                    if open.is_empty() && part.is_rootless() && e.local_name().as_ref() == b"numbering"
                    {
                        part.root_name = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                        part.empty_root = tag_start(xml, after).map(|start| start..after);
                    }
                    part.visit(e, &mut current, &mut override_level, true);
                }
                Ok(Event::End(ref e)) => {
                    part.end_tag(xml, after, e.name().as_ref(), &mut open, &mut current, &mut override_level);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    part.mark_malformed(&e.to_string());
                    // stop once the reader no longer makes progress
                    if last_error_at == Some(after) || after >= xml.len() {
                        break;
                    }
                    last_error_at = Some(after);
                }
                _ => {}
            }
            buf.clear();
        }

        if !open.is_empty() {
            part.mark_malformed("unclosed elements at end of part");
        }
        if let Some(entry) = current.take() {
            part.entries.push(entry);
        }
        part
    }

    fn is_rootless(&self) -> bool {
        self.root_name.is_none()
    }

    fn mark_malformed(&mut self, reason: &str) {
        if !self.malformed {
            log::warn!("numbering part is malformed, scanning leniently: {}", reason);
        }
        self.malformed = true;
    }

    /// Close the innermost open element named `name`, implicitly closing
    /// anything left open inside it
    fn end_tag(
        &mut self,
        xml: &[u8],
        after: usize,
        name: &[u8],
        open: &mut Vec<Vec<u8>>,
        current: &mut Option<NumEntry>,
        override_level: &mut Option<u32>,
    ) {
        let Some(index) = open.iter().rposition(|n| n.as_slice() == name) else {
            self.mark_malformed(&format!(
                "unmatched end tag </{}>",
                String::from_utf8_lossy(name)
            ));
            return;
        };
        if index + 1 != open.len() {
            self.mark_malformed(&format!(
                "unclosed element inside </{}>",
                String::from_utf8_lossy(name)
            ));
        }
        for closed in open.drain(index..).rev() {
            self.close(&closed, current, override_level);
        }
        if open.is_empty()
            && self.root_close_start.is_none()
            && self.root_name.as_deref().map(str::as_bytes) == Some(name)
        {
            self.root_close_start = tag_start(xml, after);
        }
    }

    fn close(&mut self, name: &[u8], current: &mut Option<NumEntry>, override_level: &mut Option<u32>) {
        match local_name(name) {
            b"num" => {
                if let Some(entry) = current.take() {
                    self.entries.push(entry);
                }
            }
            b"lvlOverride" => *override_level = None,
            _ => {}
        }
    }

    fn visit(
        &mut self,
        e: &BytesStart<'_>,
        current: &mut Option<NumEntry>,
        override_level: &mut Option<u32>,
        empty: bool,
    ) {
        match e.local_name().as_ref() {
            b"num" => {
                if let Some(num_id) = numeric_attr(e, b"numId") {
                    self.num_ids.insert(num_id);
                    let entry = NumEntry {
                        num_id,
                        abstract_id: None,
                        start_override: None,
                    };
                    if let Some(unclosed) = current.take() {
                        self.entries.push(unclosed);
                    }
                    if empty {
                        self.entries.push(entry);
                    } else {
                        *current = Some(entry);
                    }
                }
            }
            b"abstractNum" => {
                if let Some(id) = numeric_attr(e, b"abstractNumId") {
                    self.abstract_ids.insert(id);
                }
            }
            b"abstractNumId" => {
                if let Some(entry) = current.as_mut() {
                    entry.abstract_id = numeric_attr(e, b"val");
                }
            }
            b"lvlOverride" if !empty => {
                *override_level = numeric_attr(e, b"ilvl");
            }
            b"startOverride" => {
                if let (Some(entry), Some(0)) = (current.as_mut(), *override_level) {
                    entry.start_override = numeric_attr(e, b"val");
                }
            }
            _ => {}
        }
    }

    /// `w:num` entries in document order
    pub fn entries(&self) -> &[NumEntry] {
        &self.entries
    }

    /// Every `w:numId` declared by a `w:num`
    pub fn num_ids(&self) -> &BTreeSet<u32> {
        &self.num_ids
    }

    /// Every `w:abstractNumId` declared by a `w:abstractNum`
    pub fn abstract_ids(&self) -> &BTreeSet<u32> {
        &self.abstract_ids
    }

    /// Check for a `w:num` with this id
    pub fn has_num(&self, num_id: u32) -> bool {
        self.num_ids.contains(&num_id)
    }

    /// Check for a `w:abstractNum` with this id
    pub fn has_abstract(&self, abstract_id: u32) -> bool {
        self.abstract_ids.contains(&abstract_id)
    }

    /// Largest declared `w:numId`
    pub fn max_num_id(&self) -> Option<u32> {
        self.num_ids.last().copied()
    }

    /// Byte offset just past the root start tag
    pub fn root_open_end(&self) -> Option<usize> {
        self.root_open_end
    }

    /// Byte offset of the root end tag's `<`
    pub fn root_close_start(&self) -> Option<usize> {
        self.root_close_start
    }

    /// Qualified name of the root element, e.g. `w:numbering`
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    /// Byte range of a root written as an empty element (`<w:numbering/>`)
    pub fn empty_root(&self) -> Option<Range<usize>> {
        self.empty_root.clone()
    }

    /// Whether the part had parse errors or unbalanced tags
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Overview of declared definitions and instances
    pub fn summary(&self) -> NumberingSummary {
        NumberingSummary {
            abstract_ids: self.abstract_ids.iter().copied().collect(),
            instances: self.entries.clone(),
            malformed: self.malformed,
        }
    }

    /// Summary as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

/// Position of the `<` opening the tag that ends at `end`
fn tag_start(xml: &[u8], end: usize) -> Option<usize> {
    xml[..end.min(xml.len())].iter().rposition(|&b| b == b'<')
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

fn numeric_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<u32> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().and_then(|v| v.trim().parse().ok()))
}
