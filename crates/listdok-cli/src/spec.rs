//! TOML document descriptions for `listdok build`
//!
//! ```toml
//! [writer]
//! compression = "deflated"
//!
//! [[block]]
//! type = "heading"
//! text = "Packing list"
//! level = 1
//!
//! [[block]]
//! type = "list"
//! kind = "ordered"
//! items = [
//!     { text = "Laptop" },
//!     { text = "Charger", level = 1 },
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use listdok_ooxml::{Document, ListKind, WriterOptions};

/// A whole document: writer options and body blocks in order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSpec {
    /// Archive options
    #[serde(default)]
    pub writer: WriterOptions,
    /// Body content
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockSpec>,
}

/// One body block
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockSpec {
    /// Heading; level 0 is the title
    Heading {
        text: String,
        #[serde(default = "default_heading_level")]
        level: u8,
    },
    /// Paragraph made of `text` followed by `runs`
    Paragraph {
        #[serde(default)]
        text: String,
        #[serde(default)]
        style: Option<String>,
        #[serde(default)]
        runs: Vec<RunSpec>,
    },
    /// A list; every block of this type starts a new list instance
    List {
        kind: ListKindSpec,
        #[serde(default)]
        style: Option<String>,
        items: Vec<ListItemSpec>,
    },
    /// A table of plain-text cells
    Table {
        #[serde(default)]
        style: Option<String>,
        rows: Vec<Vec<String>>,
    },
    /// A page break
    PageBreak,
}

/// A formatted run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSpec {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// A list item and its nesting level
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListItemSpec {
    pub text: String,
    #[serde(default)]
    pub level: u32,
}

/// `"ordered"`, `"unordered"` or a raw abstract numbering id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListKindSpec {
    Named(NamedListKind),
    Abstract(u32),
}

/// Built-in list kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedListKind {
    Ordered,
    Unordered,
}

impl From<ListKindSpec> for ListKind {
    fn from(spec: ListKindSpec) -> Self {
        match spec {
            ListKindSpec::Named(NamedListKind::Ordered) => ListKind::Ordered,
            ListKindSpec::Named(NamedListKind::Unordered) => ListKind::Unordered,
            ListKindSpec::Abstract(id) => ListKind::from(id),
        }
    }
}

fn default_heading_level() -> u8 {
    1
}

impl DocumentSpec {
    /// Parse a description from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid document description")
    }

    /// Load a description from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Append every block to `doc`
    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        for (index, block) in self.blocks.iter().enumerate() {
            block
                .apply(doc)
                .with_context(|| format!("Block {} could not be added", index + 1))?;
        }
        Ok(())
    }
}

impl BlockSpec {
    fn apply(&self, doc: &mut Document) -> Result<()> {
        match self {
            BlockSpec::Heading { text, level } => {
                doc.add_heading(text, *level)?;
            }
            BlockSpec::Paragraph { text, style, runs } => {
                let para = doc.add_paragraph(text);
                if let Some(style) = style {
                    para.style(style.as_str());
                }
                for run in runs {
                    para.add_text(&run.text).bold(run.bold).italic(run.italic);
                }
            }
            BlockSpec::List { kind, style, items } => {
                let num_id = doc.new_list(ListKind::from(*kind));
                tracing::debug!(num_id, items = items.len(), "list instance allocated");
                for item in items {
                    let para = doc.add_paragraph(&item.text);
                    para.style(style.as_deref().unwrap_or("ListParagraph"));
                    para.numbering(num_id, item.level);
                }
            }
            BlockSpec::Table { style, rows } => {
                let table = doc.add_table();
                if let Some(style) = style {
                    table.style(style.as_str());
                }
                for cells in rows {
                    let row = table.add_row();
                    for text in cells {
                        row.add_cell().add_paragraph(text);
                    }
                }
            }
            BlockSpec::PageBreak => doc.add_page_break(),
        }
        Ok(())
    }
}
