//! docqa: question/answer field extraction from .docx tables
//!
//! This library reads the tables of Microsoft Word documents, resolves
//! label/value cell pairs into a single field map, and pulls goal codes out
//! of selected fields.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod document;
pub mod export;
pub mod goals;
pub mod report;
pub mod resolver;

/// Export format options
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Two column terminal table
    #[default]
    Table,
    Markdown,
    Csv,
    Json,
}

/// When to colour terminal output
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Colour when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

// Re-export commonly used types
pub use document::{Document, load_document, load_document_from_bytes};
pub use goals::{GoalCode, extract_goal_codes};
pub use report::{ExtractionOptions, ExtractionReport, GoalReport};
pub use resolver::{FieldMap, MergeDetection, RequiredKeys, TableResolver, extract_docs_tables};
