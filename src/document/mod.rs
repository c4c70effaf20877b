//! Document parsing and data structures module
//!
//! This module reads Microsoft Word (.docx) documents into a table-only
//! snapshot that the resolver consumes.

pub(crate) mod io;
pub mod loader;
pub mod models;
pub(crate) mod parsing;

pub use loader::{load_document, load_document_from_bytes};
pub use models::*;
