//! List instance allocation and numbering part reconciliation
//!
//! Every call to [`NumberingManager::new_list_instance`] yields a fresh
//! `w:num` with its own level 0 restart override, so two lists that share an
//! abstract definition still count independently. At write time the manager
//! merges its instances into whatever numbering part the [`FileMap`] already
//! holds.

use std::io::Write;
use std::ops::Range;

use parking_lot::Mutex;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::catalog::{self, ListKind, CATALOG_ABSTRACT_IDS};
use super::part::NumberingPart;
use crate::error::Result;
use crate::file_map::FileMap;

/// Archive path of the numbering part
pub const NUMBERING_PART_PATH: &str = "word/numbering.xml";

/// WordprocessingML main namespace
pub const WORDPROCESSINGML_NS: &str =
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// One independently counted list (`w:num`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingInstance {
    /// Id that paragraphs reference through `w:numPr/w:numId`
    pub num_id: u32,
    /// Abstract definition this instance follows
    pub abstract_id: u32,
}

impl NumberingInstance {
    /// Write `<w:num>` with its abstract reference and level 0 restart
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let num_id = self.num_id.to_string();
        let abstract_id = self.abstract_id.to_string();

        let mut num = BytesStart::new("w:num");
        num.push_attribute(("w:numId", num_id.as_str()));
        writer.write_event(Event::Start(num))?;
        catalog::write_empty(writer, "w:abstractNumId", &[("w:val", abstract_id.as_str())])?;

        let mut level_override = BytesStart::new("w:lvlOverride");
        level_override.push_attribute(("w:ilvl", "0"));
        writer.write_event(Event::Start(level_override))?;
        catalog::write_empty(writer, "w:startOverride", &[("w:val", "1")])?;
        writer.write_event(Event::End(BytesEnd::new("w:lvlOverride")))?;

        writer.write_event(Event::End(BytesEnd::new("w:num")))?;
        Ok(())
    }
}

#[derive(Debug)]
struct NumberingState {
    next_num_id: u32,
    instances: Vec<NumberingInstance>,
}

/// Allocates list instances and persists them into the numbering part
#[derive(Debug)]
pub struct NumberingManager {
    state: Mutex<NumberingState>,
    files: FileMap,
}

impl NumberingManager {
    /// Create a manager writing into `files`
    pub fn new(files: FileMap) -> Self {
        Self {
            state: Mutex::new(NumberingState {
                next_num_id: 1,
                instances: Vec::new(),
            }),
            files,
        }
    }

    /// Allocate a list instance for a logical kind (`1` ordered, `2` bulleted,
    /// anything else a raw abstract id) and return its `numId`
    pub fn new_list_instance(&self, kind: u32) -> u32 {
        self.new_list(ListKind::from(kind))
    }

    /// Allocate a list instance for `kind` and return its `numId`
    ///
    /// Ids are unique and strictly increasing for the lifetime of the manager
    /// and never collide with a `w:num` already present in the file map.
    pub fn new_list(&self, kind: ListKind) -> u32 {
        let mut state = self.state.lock();

        self.raise_past_existing(&mut state);

        let num_id = state.next_num_id;
        state.next_num_id = state.next_num_id.saturating_add(1);

        let instance = NumberingInstance {
            num_id,
            abstract_id: kind.abstract_id(),
        };
        state.instances.push(instance);

        log::debug!(
            "allocated list instance numId={} abstractNumId={}",
            instance.num_id,
            instance.abstract_id
        );
        num_id
    }

    fn raise_past_existing(&self, state: &mut NumberingState) {
        let Some(existing) = self.files.load(NUMBERING_PART_PATH) else {
            return;
        };
        if let Some(max) = NumberingPart::scan(&existing).max_num_id() {
            if state.next_num_id <= max {
                log::debug!("numId counter raised past existing maximum {}", max);
                state.next_num_id = max.saturating_add(1);
            }
        }
    }

    /// Allocated instances in allocation order
    pub fn instances(&self) -> Vec<NumberingInstance> {
        self.state.lock().instances.clone()
    }

    /// Number of allocated instances
    pub fn len(&self) -> usize {
        self.state.lock().instances.len()
    }

    /// Whether no instance has been allocated
    pub fn is_empty(&self) -> bool {
        self.state.lock().instances.is_empty()
    }

    /// Render all instances inside a `w:numbering` root
    ///
    /// Returns an empty buffer when nothing has been allocated.
    pub fn render_instances_xml(&self) -> Result<Vec<u8>> {
        let state = self.state.lock();
        if state.instances.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = Writer::new(Vec::new());
        let mut root = BytesStart::new("w:numbering");
        root.push_attribute(("xmlns:w", WORDPROCESSINGML_NS));
        writer.write_event(Event::Start(root))?;
        for instance in &state.instances {
            instance.write_xml(&mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:numbering")))?;
        Ok(writer.into_inner())
    }

    /// Merge allocated instances into the file map's numbering part
    ///
    /// Idempotent: instances already present are skipped and the catalog
    /// definitions are only injected when missing. With no allocated
    /// instances the file map is left untouched.
    pub fn apply_to_file_map(&self) -> Result<()> {
        let state = self.state.lock();
        if state.instances.is_empty() {
            return Ok(());
        }

        let existing = self.files.load(NUMBERING_PART_PATH);
        let part = existing.as_deref().map(NumberingPart::scan);

        let mut writer = Writer::new(Vec::new());
        let mut added = 0usize;
        for instance in &state.instances {
            if part.as_ref().is_some_and(|p| p.has_num(instance.num_id)) {
                continue;
            }
            instance.write_xml(&mut writer)?;
            added += 1;
        }
        let blocks = writer.into_inner();

        let updated = match (existing, part) {
            (Some(content), Some(part)) => merge_into_existing(content, &part, &blocks)?,
            _ => synthesize_part(&blocks)?,
        };

        log::debug!("numbering part updated with {} new instance(s)", added);
        self.files.store(NUMBERING_PART_PATH, updated);
        Ok(())
    }
}

/// Splice missing catalog definitions after the root start tag and new
/// instances before the root end tag, leaving every other byte in place
fn merge_into_existing(content: Vec<u8>, part: &NumberingPart, blocks: &[u8]) -> Result<Vec<u8>> {
    let mut definitions = Vec::new();
    for id in CATALOG_ABSTRACT_IDS {
        if part.has_abstract(id) {
            continue;
        }
        if let Some(fragment) = catalog::render_definition(id)? {
            log::debug!("injecting abstract numbering definition {}", id);
            definitions.extend_from_slice(&fragment);
        }
    }

    if definitions.is_empty() && blocks.is_empty() {
        return Ok(content);
    }

    if let Some(span) = part.empty_root() {
        return Ok(expand_empty_root(&content, span, part.root_name(), &definitions, blocks));
    }

    let definitions_at = part.root_open_end().unwrap_or_else(|| {
        log::warn!("numbering part has no root start tag, appending definitions");
        content.len()
    });
    let blocks_at = match part.root_close_start() {
        Some(pos) if pos >= definitions_at => pos,
        _ => {
            if !blocks.is_empty() {
                log::warn!("numbering part has no closing tag, appending instances at end");
            }
            content.len()
        }
    };

    let mut merged = Vec::with_capacity(content.len() + definitions.len() + blocks.len());
    merged.extend_from_slice(&content[..definitions_at]);
    merged.extend_from_slice(&definitions);
    merged.extend_from_slice(&content[definitions_at..blocks_at]);
    merged.extend_from_slice(blocks);
    merged.extend_from_slice(&content[blocks_at..]);
    Ok(merged)
}

/// Rewrite `<w:numbering .../>` as a start tag, the new content and an end tag
fn expand_empty_root(
    content: &[u8],
    span: Range<usize>,
    root_name: Option<&str>,
    definitions: &[u8],
    blocks: &[u8],
) -> Vec<u8> {
    let tag = &content[span.clone()];
    let start_tag = tag.strip_suffix(b"/>").unwrap_or(tag);
    let name = root_name.unwrap_or("w:numbering");

    let mut merged = Vec::with_capacity(content.len() + definitions.len() + blocks.len() + name.len() + 4);
    merged.extend_from_slice(&content[..span.start]);
    merged.extend_from_slice(start_tag);
    merged.push(b'>');
    merged.extend_from_slice(definitions);
    merged.extend_from_slice(blocks);
    merged.extend_from_slice(format!("</{}>", name).as_bytes());
    merged.extend_from_slice(&content[span.end..]);
    merged
}

/// Build a complete numbering part from scratch
fn synthesize_part(blocks: &[u8]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("w:numbering");
    root.push_attribute(("xmlns:w", WORDPROCESSINGML_NS));
    writer.write_event(Event::Start(root))?;
    writer.get_mut().write_all(&catalog::render_definitions()?)?;
    writer.get_mut().write_all(blocks)?;
    writer.write_event(Event::End(BytesEnd::new("w:numbering")))?;
    Ok(writer.into_inner())
}
