//! listdok CLI - Command-line interface library
//!
//! This library provides the CLI functionality for listdok:
//! - Build: Turn a TOML document description into a DOCX file
//! - Inspect: Summarise the numbering part of a DOCX file
//! - Lists: Show which paragraphs belong to which list instance
//!
//! # Library Usage
//!
//! ```ignore
//! use listdok_cli::{build_command, lists_command, OutputFormat};
//!
//! build_command(Path::new("report.toml"), Path::new("report.docx"), None)?;
//! lists_command(Path::new("report.docx"), OutputFormat::Json)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build a document, optionally on top of a template
//! listdok build report.toml --output report.docx --template corporate.dotx
//!
//! # Show numbering definitions and instances
//! listdok inspect report.docx --format json
//!
//! # Show numbered paragraphs in document order
//! listdok lists report.docx
//! ```

pub mod app;
pub mod spec;

// Re-export main entry point and types
pub use app::{
    build_command, init_tracing, inspect_command, lists_command, render_inspect, render_lists,
};
pub use app::{run_cli, OutputFormat};
pub use spec::{BlockSpec, DocumentSpec, ListItemSpec, ListKindSpec, RunSpec};
