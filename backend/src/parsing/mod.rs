//! Ingestion of solver-generated statistics reports.
//!
//! The pipeline is split by concern: [`html`] reduces a document to
//! headings, paragraphs, and tables; [`cells`] decodes individual cell
//! text; [`report_parser`] assembles the typed report and collects
//! warnings for everything that degraded along the way.

pub mod cells;
pub mod html;
pub mod report_parser;

pub use cells::{parse_cell, parse_scalar_cell, UnparsableCell};
pub use report_parser::{parse, ParseError, ParseWarning, Section};

use anyhow::Context;
use std::path::Path;

/// Read a report file into memory ahead of parsing.
///
/// Report files are small (tens of kilobytes), so buffering the whole
/// document is fine and keeps the parser free of IO concerns.
pub fn read_report_file(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report file '{}'", path.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("report file '{}' is empty", path.display());
    }
    Ok(text)
}
