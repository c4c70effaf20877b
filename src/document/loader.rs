//! Document loading and orchestration
//!
//! `load_document()` validates a .docx path, pulls the main document part out
//! of the archive and hands it to the table reader.

use anyhow::{Context, Result};
use std::path::Path;

use super::io::{read_document_xml, validate_docx_extension};
use super::models::*;
use super::parsing::table::extract_tables;

/// Load every body-level table of a .docx file
pub async fn load_document(file_path: &Path) -> Result<Document> {
    validate_docx_extension(file_path)?;

    let data = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let title = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled Document")
        .to_string();

    let mut document = load_document_from_bytes(title, &data)
        .with_context(|| format!("Failed to parse {}", file_path.display()))?;
    document.metadata.file_path = file_path.display().to_string();

    tracing::info!(
        path = %file_path.display(),
        tables = document.metadata.table_count,
        "loaded document"
    );
    Ok(document)
}

/// Parse an in-memory .docx archive, e.g. an upload that never touched disk
pub fn load_document_from_bytes(title: impl Into<String>, data: &[u8]) -> Result<Document> {
    let document_xml = read_document_xml(data)?;
    let tables = extract_tables(&document_xml)?;

    let mut document = Document::from_tables(title, tables);
    document.metadata.file_size = data.len() as u64;
    Ok(document)
}
