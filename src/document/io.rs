//! File I/O operations and validation
//!
//! This module handles file validation and reading the main document part
//! out of the .docx ZIP container.

use anyhow::{Context, Result, bail};
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Validates that the path names a .docx file
pub(crate) fn validate_docx_extension(file_path: &Path) -> Result<()> {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !extension.eq_ignore_ascii_case("docx") {
        bail!(
            "Invalid file format. Expected .docx file, got .{}\n\
            Note: docqa only supports Word .docx files (not .doc, .xlsx, .zip, etc.)",
            extension
        );
    }

    Ok(())
}

/// Pull `word/document.xml` out of an in-memory .docx archive
pub(crate) fn read_document_xml(data: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).context("Not a valid .docx (ZIP) container")?;

    if archive.by_name(DOCUMENT_PART).is_err() {
        if archive.by_name("xl/workbook.xml").is_ok() {
            bail!(
                "This appears to be an Excel file (.xlsx).\n\
                docqa only supports Word documents (.docx)."
            );
        }

        bail!(
            "Invalid .docx file: missing {DOCUMENT_PART}\n\
            This file may be corrupted or is not a valid Word document."
        );
    }

    let mut document_xml = String::new();
    archive
        .by_name(DOCUMENT_PART)?
        .read_to_string(&mut document_xml)
        .with_context(|| format!("Failed to read {DOCUMENT_PART}"))?;

    Ok(document_xml)
}
