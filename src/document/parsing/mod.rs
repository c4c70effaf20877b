//! Document parsing utilities
//!
//! This module contains the WordprocessingML readers that turn the raw
//! document part into table snapshots.

pub(crate) mod table;
