//! Table-to-field resolution
//!
//! Turns question/answer style tables into a single `label -> value` map.
//! Rows are read left to right as alternating label and value cells, with
//! adjacent cells carrying identical text treated as one merged cell.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

use crate::document::{Cell, CellMerge, Document, Row, Table};

/// Extracted fields, in order of first appearance.
pub type FieldMap = IndexMap<String, String>;

/// How adjacent cells are recognised as parts of one merged cell
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeDetection {
    /// Neighbouring cells with identical text belong to the same cell.
    #[default]
    RepeatedText,
    /// Only grid slots the document itself marks as horizontal repeats do.
    SpanMetadata,
}

/// Substrings a label must contain (any one of them) to be kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredKeys(Vec<String>);

impl RequiredKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim();
            if !key.is_empty() && !unique.iter().any(|k| k == key) {
                unique.push(key.to_string());
            }
        }
        Self(unique)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if `label` contains at least one key as a literal substring
    pub fn matches(&self, label: &str) -> bool {
        self.0.iter().any(|key| label.contains(key.as_str()))
    }
}

impl FromStr for RequiredKeys {
    type Err = Infallible;

    /// Parse a comma separated list such as `"Code, Title,,Credits"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split(',')))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableResolver {
    pub merge_detection: MergeDetection,
}

impl TableResolver {
    pub fn new(merge_detection: MergeDetection) -> Self {
        Self { merge_detection }
    }

    /// Resolve every table of `document` and merge the results
    pub fn extract_docs_tables(
        &self,
        document: &Document,
        required_keys: Option<&RequiredKeys>,
    ) -> FieldMap {
        let mut fields = FieldMap::new();
        for table in &document.tables {
            merge_fields(&mut fields, self.extract_table_data(table, required_keys));
        }
        fields
    }

    /// Resolve one table, then keep only labels matching `required_keys`
    pub fn extract_table_data(&self, table: &Table, required_keys: Option<&RequiredKeys>) -> FieldMap {
        if let Err(err) = table.column_count() {
            tracing::debug!(%err, "skipping table");
            return FieldMap::new();
        }

        let mut fields = FieldMap::new();
        for row in &table.rows {
            merge_fields(&mut fields, self.extract_table_row(row));
        }

        match required_keys {
            Some(keys) if !keys.is_empty() => {
                fields.retain(|label, _| keys.matches(label));
                fields
            }
            _ => fields,
        }
    }

    /// Pair up the cells of one row
    ///
    /// A repeated label within the row keeps only its last value.
    pub fn extract_table_row(&self, row: &Row) -> FieldMap {
        let mut pairs = FieldMap::new();
        let cells = &row.cells;
        if cells.len() <= 1 {
            return pairs;
        }

        let mut question: Option<&str> = None;
        let mut i = 0;
        while i < cells.len() {
            // An empty label cell counts as no label at all; the next cell
            // becomes the candidate instead.
            let Some(label) = question.filter(|q| !is_empty_label(q)) else {
                question = Some(cells[i].text.as_str());
                i += 1;
                continue;
            };

            if self.continues_span(label, &cells[i]) {
                i += 1;
                continue;
            }

            let answer = &cells[i];
            pairs.insert(
                trim_and_strip_newlines(label),
                trim_and_strip_newlines(&answer.text),
            );
            question = None;

            while i + 1 < cells.len() && self.continues_span(&answer.text, &cells[i + 1]) {
                i += 1;
            }
            i += 1;
        }

        pairs
    }

    /// Whether `cell` is another slot of the merged cell whose text is `previous`
    fn continues_span(&self, previous: &str, cell: &Cell) -> bool {
        match self.merge_detection {
            MergeDetection::RepeatedText => cell.text == previous,
            MergeDetection::SpanMetadata => cell.merge == CellMerge::HorizontalRepeat,
        }
    }
}

/// Resolve `document` with the default repeated-text merge detection
pub fn extract_docs_tables(document: &Document, required_keys: Option<&RequiredKeys>) -> FieldMap {
    TableResolver::default().extract_docs_tables(document, required_keys)
}

/// Merge `source` into `target`, appending `"\n" + value` to labels already present
pub fn merge_fields(target: &mut FieldMap, source: FieldMap) {
    for (label, value) in source {
        match target.get_mut(&label) {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(&value);
            }
            None => {
                target.insert(label, value);
            }
        }
    }
}

/// Trim surrounding whitespace, then delete every `'\n'`
pub fn trim_and_strip_newlines(text: &str) -> String {
    text.trim().replace('\n', "")
}

pub fn is_empty_label(text: &str) -> bool {
    text.is_empty()
}
