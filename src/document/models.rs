//! Core data structures for document representation
//!
//! A [`Document`] is a read-only snapshot of the tables found in a Word file.
//! Rows keep every grid slot a cell occupies, so a cell merged across three
//! columns shows up three times with the same text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub title: String,
    pub metadata: DocumentMetadata,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub file_path: String,
    pub file_size: u64,
    pub table_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
    /// Column count declared by the table grid, if it declares any.
    pub grid_columns: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub text: String,
    pub grid_column: usize,
    pub merge: CellMerge,
}

/// How a cell relates to the merged region it was expanded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CellMerge {
    /// First (or only) grid slot of a cell.
    #[default]
    None,
    /// Additional grid slot of a horizontally spanning cell.
    HorizontalRepeat,
    /// Slot continuing a vertical merge from the row above.
    VerticalContinue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no rows")]
    NoRows,
    #[error("first row continues a vertical merge from grid column {column}, but there is no row above")]
    NoCellAbove { column: usize },
}

impl Document {
    pub fn from_tables(title: impl Into<String>, tables: Vec<Table>) -> Self {
        let table_count = tables.len();
        Self {
            title: title.into(),
            metadata: DocumentMetadata {
                table_count,
                ..DocumentMetadata::default()
            },
            tables,
        }
    }
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            grid_columns: None,
        }
    }

    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = Some(columns);
        self
    }

    /// Number of cells in the first row.
    ///
    /// Fails when there is no first row, or when the first row claims to
    /// continue a vertical merge that has nothing above it.
    pub fn column_count(&self) -> Result<usize, TableError> {
        let first = self.rows.first().ok_or(TableError::NoRows)?;
        if let Some(cell) = first
            .cells
            .iter()
            .find(|cell| cell.merge == CellMerge::VerticalContinue)
        {
            return Err(TableError::NoCellAbove {
                column: cell.grid_column,
            });
        }
        Ok(first.cells.len())
    }
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl Cell {
    pub fn new(text: impl Into<String>, grid_column: usize) -> Self {
        Self {
            text: text.into(),
            grid_column,
            merge: CellMerge::None,
        }
    }

    pub fn with_merge(mut self, merge: CellMerge) -> Self {
        self.merge = merge;
        self
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text, 0)
    }
}

impl From<Vec<&str>> for Row {
    fn from(texts: Vec<&str>) -> Self {
        let cells = texts
            .into_iter()
            .enumerate()
            .map(|(column, text)| Cell::new(text, column))
            .collect();
        Row { cells }
    }
}

impl From<Vec<Vec<&str>>> for Table {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Table::new(rows.into_iter().map(Row::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_of_empty_table_is_an_error() {
        assert_eq!(Table::default().column_count(), Err(TableError::NoRows));
    }

    #[test]
    fn first_row_without_cells_counts_zero() {
        let table = Table::new(vec![Row::default()]);
        assert_eq!(table.column_count(), Ok(0));
    }

    #[test]
    fn first_row_continuing_a_merge_has_no_cell_above() {
        let table = Table::new(vec![
            Row::new(vec![
                Cell::new("", 0).with_merge(CellMerge::VerticalContinue),
                Cell::new("Q", 1),
            ]),
            Row::from(vec!["Q2", "A2"]),
        ]);
        assert_eq!(table.column_count(), Err(TableError::NoCellAbove { column: 0 }));
    }

    #[test]
    fn later_rows_may_continue_merges() {
        let table = Table::new(vec![
            Row::from(vec!["Q", "A"]),
            Row::new(vec![
                Cell::new("Q", 0).with_merge(CellMerge::VerticalContinue),
                Cell::new("B", 1),
            ]),
        ]);
        assert_eq!(table.column_count(), Ok(2));
    }

    #[test]
    fn declared_grid_does_not_limit_columns() {
        let table = Table::from(vec![vec!["a", "b", "c"]]).with_grid_columns(2);
        assert_eq!(table.column_count(), Ok(3));

        let table = Table::from(vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(table.column_count(), Ok(3));
    }
}
