//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use listdok_ooxml::numbering::NUMBERING_PART_PATH;
use listdok_ooxml::template::DOCUMENT_PATH;
use listdok_ooxml::{
    numbering_references, Document, DocxWriter, FileMap, NumberedParagraph, NumberingPart,
};

use crate::spec::DocumentSpec;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "listdok")]
#[command(author, version, about = "Numbered lists for .docx, reproducibly", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a DOCX file from a TOML document description
    Build {
        /// Input TOML description
        input: PathBuf,

        /// Output DOCX file (defaults to the input name with .docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template DOCX/DOTX file
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Summarise the numbering part of a DOCX file
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List paragraphs that reference a numbering instance
    Lists {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Install the log subscriber: `info` unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Build {
            input,
            output,
            template,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            build_command(&input, &output, template.as_deref())?;
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
        Commands::Lists { input, format } => {
            lists_command(&input, format)?;
        }
    }

    Ok(())
}

/// Execute the build command
pub fn build_command(input: &Path, output: &Path, template: Option<&Path>) -> Result<()> {
    info!("building {}", input.display());

    let spec = DocumentSpec::load(input)?;

    let mut doc = match template {
        Some(path) => {
            info!("using template {}", path.display());
            Document::open(path)
                .with_context(|| format!("Failed to load template: {}", path.display()))?
        }
        None => Document::new(),
    };

    spec.apply(&mut doc)?;
    debug!(
        blocks = doc.blocks().len(),
        lists = doc.numbering().len(),
        "document assembled"
    );

    DocxWriter::with_options(spec.writer.clone())
        .save(&doc, output)
        .with_context(|| format!("Failed to write DOCX file: {}", output.display()))?;

    println!("Wrote: {}", output.display());
    Ok(())
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<()> {
    let files = open_docx(input)?;
    let part = files
        .load(NUMBERING_PART_PATH)
        .map(|bytes| NumberingPart::scan(&bytes));
    print!("{}", render_inspect(part.as_ref(), format)?);
    Ok(())
}

/// Execute the lists command
pub fn lists_command(input: &Path, format: OutputFormat) -> Result<()> {
    let files = open_docx(input)?;
    let document = files
        .load(DOCUMENT_PATH)
        .with_context(|| format!("No {} in {}", DOCUMENT_PATH, input.display()))?;
    let refs = numbering_references(&document)
        .with_context(|| format!("Failed to parse {}", DOCUMENT_PATH))?;
    print!("{}", render_lists(&refs, format)?);
    Ok(())
}

fn open_docx(input: &Path) -> Result<FileMap> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    FileMap::open(input).with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

/// Format a numbering part summary; `None` means the package has no part
pub fn render_inspect(part: Option<&NumberingPart>, format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            let json = match part {
                Some(part) => part
                    .to_json()
                    .context("Failed to serialize numbering summary to JSON")?,
                None => "null".to_string(),
            };
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Text => {
            let Some(part) = part else {
                writeln!(out, "No numbering part")?;
                return Ok(out);
            };
            if part.is_malformed() {
                writeln!(out, "warning: numbering part is not well-formed")?;
            }

            let abstracts: Vec<String> = part.abstract_ids().iter().map(u32::to_string).collect();
            writeln!(out, "Abstract definitions: {}", abstracts.len())?;
            if !abstracts.is_empty() {
                writeln!(out, "  {}", abstracts.join(", "))?;
            }

            writeln!(out, "Instances: {}", part.entries().len())?;
            for entry in part.entries() {
                let target = entry
                    .abstract_id
                    .map_or_else(|| "?".to_string(), |id| id.to_string());
                write!(out, "  numId {} -> abstractNumId {}", entry.num_id, target)?;
                if let Some(start) = entry.start_override {
                    write!(out, " (restarts at {})", start)?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(out)
}

/// Format numbered paragraphs, indenting text by level
pub fn render_lists(refs: &[NumberedParagraph], format: OutputFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(refs)
                .context("Failed to serialize list paragraphs to JSON")?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Text => {
            if refs.is_empty() {
                writeln!(out, "No numbered paragraphs")?;
            }
            for para in refs {
                let indent = "  ".repeat(para.ilvl.min(8) as usize);
                writeln!(
                    out,
                    "{:>4}  numId={:<3} ilvl={}  {}{}",
                    para.index, para.num_id, para.ilvl, indent, para.text
                )?;
            }
        }
    }
    Ok(out)
}
