//! Table extraction from WordprocessingML
//!
//! Streams `word/document.xml` and collects every body-level table as rows of
//! cells. Merged cells are expanded into one cell per grid slot: a cell with
//! `w:gridSpan="3"` appears three times, and a `w:vMerge` continuation takes
//! the text of the cell above it. Nested tables are skipped.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::super::models::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum VerticalMerge {
    Restart,
    Continue,
}

#[derive(Debug, Default)]
struct CellState {
    grid_span: usize,
    vertical_merge: Option<VerticalMerge>,
    paragraphs: Vec<String>,
}

#[derive(Debug, Default)]
struct TableState {
    grid_columns: usize,
    rows: Vec<Row>,
    /// Resolved text most recently placed in each grid column.
    column_texts: Vec<String>,
    row: Vec<Cell>,
    grid_cursor: usize,
    cell: Option<CellState>,
    paragraph: String,
    paragraph_depth: usize,
    in_run: bool,
    in_text: bool,
}

impl TableState {
    fn start_row(&mut self) {
        self.row.clear();
        self.grid_cursor = 0;
    }

    fn finish_row(&mut self) {
        self.rows.push(Row::new(std::mem::take(&mut self.row)));
    }

    fn finish_cell(&mut self) {
        let Some(cell) = self.cell.take() else {
            return;
        };
        let span = cell.grid_span.max(1);

        let (text, merge) = match cell.vertical_merge {
            Some(VerticalMerge::Continue) => (
                self.column_texts
                    .get(self.grid_cursor)
                    .cloned()
                    .unwrap_or_default(),
                CellMerge::VerticalContinue,
            ),
            _ => (cell.paragraphs.join("\n"), CellMerge::None),
        };

        for offset in 0..span {
            let column = self.grid_cursor + offset;
            if self.column_texts.len() <= column {
                self.column_texts.resize(column + 1, String::new());
            }
            self.column_texts[column].clone_from(&text);

            let merge = if offset == 0 {
                merge
            } else {
                CellMerge::HorizontalRepeat
            };
            self.row
                .push(Cell::new(text.clone(), column).with_merge(merge));
        }
        self.grid_cursor += span;
    }

    fn finish_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        if let Some(cell) = self.cell.as_mut() {
            cell.paragraphs.push(paragraph);
        }
    }

    fn into_table(self) -> Table {
        Table {
            rows: self.rows,
            grid_columns: (self.grid_columns > 0).then_some(self.grid_columns),
        }
    }

    /// Handle an opening or self-closing element at this table's own level
    fn open(&mut self, element: &BytesStart<'_>, self_closing: bool) {
        match element.name().as_ref() {
            b"w:gridCol" => self.grid_columns += 1,
            b"w:tr" if !self_closing => self.start_row(),
            b"w:gridBefore" => {
                self.grid_cursor += read_val(element)
                    .and_then(|val| val.parse().ok())
                    .unwrap_or(0);
            }
            b"w:tc" => {
                self.cell = Some(CellState::default());
                if self_closing {
                    self.finish_cell();
                }
            }
            b"w:gridSpan" if self.paragraph_depth == 0 => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.grid_span = read_val(element)
                        .and_then(|val| val.parse().ok())
                        .unwrap_or(1);
                }
            }
            b"w:vMerge" if self.paragraph_depth == 0 => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.vertical_merge = match read_val(element).as_deref() {
                        Some("restart") => Some(VerticalMerge::Restart),
                        _ => Some(VerticalMerge::Continue),
                    };
                }
            }
            b"w:p" if self.cell.is_some() => {
                if self_closing {
                    if self.paragraph_depth == 0 {
                        self.finish_paragraph();
                    }
                } else {
                    self.paragraph_depth += 1;
                    if self.paragraph_depth == 1 {
                        self.paragraph.clear();
                    }
                }
            }
            b"w:r" if self.paragraph_depth == 1 && !self_closing => self.in_run = true,
            b"w:t" if self.paragraph_depth == 1 && self.in_run && !self_closing => {
                self.in_text = true;
            }
            b"w:tab" if self.paragraph_depth == 1 && self.in_run => self.paragraph.push('\t'),
            b"w:cr" if self.paragraph_depth == 1 && self.in_run => self.paragraph.push('\n'),
            b"w:br" if self.paragraph_depth == 1 && self.in_run => {
                if matches!(read_type(element).as_deref(), None | Some("textWrapping")) {
                    self.paragraph.push('\n');
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:tr" => self.finish_row(),
            b"w:tc" => self.finish_cell(),
            b"w:p" if self.paragraph_depth > 0 => {
                if self.paragraph_depth == 1 {
                    self.finish_paragraph();
                }
                self.paragraph_depth -= 1;
            }
            b"w:r" if self.paragraph_depth == 1 => self.in_run = false,
            b"w:t" if self.paragraph_depth == 1 => self.in_text = false,
            _ => {}
        }
    }
}

fn read_attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|value| value.into_owned())
}

fn read_val(element: &BytesStart<'_>) -> Option<String> {
    read_attribute(element, b"w:val")
}

fn read_type(element: &BytesStart<'_>) -> Option<String> {
    read_attribute(element, b"w:type")
}

/// Extract all body-level tables from the XML of `word/document.xml`
pub(crate) fn extract_tables(document_xml: &str) -> Result<Vec<Table>> {
    let mut reader = Reader::from_str(document_xml);
    reader.config_mut().trim_text(false); // whitespace inside w:t is content

    let mut buf = Vec::new();
    let mut tables = Vec::new();
    let mut table_depth = 0usize;
    let mut current: Option<TableState> = None;

    loop {
        let event = reader.read_event_into(&mut buf).with_context(|| {
            format!(
                "Malformed word/document.xml near byte {}",
                reader.buffer_position()
            )
        })?;

        match event {
            Event::Start(ref e) if e.name().as_ref() == b"w:tbl" => {
                table_depth += 1;
                if table_depth == 1 {
                    current = Some(TableState::default());
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"w:tbl" => {
                if table_depth == 1 {
                    if let Some(state) = current.take() {
                        tables.push(state.into_table());
                    }
                }
                table_depth = table_depth.saturating_sub(1);
            }
            Event::Start(ref e) if table_depth == 1 => {
                if let Some(state) = current.as_mut() {
                    state.open(e, false);
                }
            }
            Event::Empty(ref e) if table_depth == 1 => {
                if let Some(state) = current.as_mut() {
                    state.open(e, true);
                }
            }
            Event::End(ref e) if table_depth == 1 => {
                if let Some(state) = current.as_mut() {
                    state.close(e.name().as_ref());
                }
            }
            Event::Text(ref e) if table_depth == 1 => {
                if let Some(state) = current.as_mut().filter(|state| state.in_text) {
                    let text = e.unescape().with_context(|| {
                        format!(
                            "Invalid text entity in word/document.xml near byte {}",
                            reader.buffer_position()
                        )
                    })?;
                    state.paragraph.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    tracing::debug!(tables = tables.len(), "extracted tables from document body");
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(content: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{content}</w:body></w:document>"#
        )
    }

    fn texts(table: &Table) -> Vec<Vec<&str>> {
        table
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|cell| cell.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn reads_simple_table() {
        let xml = body(
            "<w:tbl><w:tblGrid><w:gridCol w:w=\"100\"/><w:gridCol w:w=\"100\"/></w:tblGrid>\
             <w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t xml:space=\"preserve\"> Ada </w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        let tables = extract_tables(&xml).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].grid_columns, Some(2));
        assert_eq!(texts(&tables[0]), vec![vec!["Name", " Ada "]]);
    }

    #[test]
    fn joins_paragraphs_and_breaks() {
        let xml = body(
            "<w:tbl><w:tr><w:tc>\
             <w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>one</w:t><w:tab/><w:t>two</w:t></w:r></w:p>\
             <w:p><w:r><w:t>three</w:t><w:br/><w:t>four</w:t><w:br w:type=\"page\"/></w:r></w:p>\
             <w:p/></w:tc></w:tr></w:tbl>",
        );
        let tables = extract_tables(&xml).unwrap();
        assert_eq!(texts(&tables[0]), vec![vec!["one\ttwo\nthree\nfour\n"]]);
    }

    #[test]
    fn expands_horizontal_spans() {
        let xml = body(
            "<w:tbl><w:tr>\
             <w:tc><w:tcPr><w:gridSpan w:val=\"2\"/></w:tcPr><w:p><w:r><w:t>Q</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>\
             </w:tr></w:tbl>",
        );
        let tables = extract_tables(&xml).unwrap();
        let row = &tables[0].rows[0];
        assert_eq!(texts(&tables[0]), vec![vec!["Q", "Q", "A"]]);
        assert_eq!(row.cells[1].merge, CellMerge::HorizontalRepeat);
        assert_eq!(row.cells[2].grid_column, 2);
    }

    #[test]
    fn vertical_continuation_repeats_text_above() {
        let xml = body(
            "<w:tbl>\
             <w:tr><w:tc><w:tcPr><w:vMerge w:val=\"restart\"/></w:tcPr><w:p><w:r><w:t>Goals</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>\
             <w:tc><w:p><w:r><w:t>B2</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        let tables = extract_tables(&xml).unwrap();
        assert_eq!(texts(&tables[0]), vec![vec!["Goals", "A1"], vec!["Goals", "B2"]]);
        assert_eq!(tables[0].rows[1].cells[0].merge, CellMerge::VerticalContinue);
    }

    #[test]
    fn skips_nested_tables_and_text_boxes() {
        let xml = body(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>outer</w:t>\
             <w:drawing><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></w:drawing>\
             </w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p/></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>body text</w:t></w:r></w:p>",
        );
        let tables = extract_tables(&xml).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(texts(&tables[0]), vec![vec!["outer\n"]]);
    }

    #[test]
    fn unescapes_entities() {
        let xml = body("<w:tbl><w:tr><w:tc><w:p><w:r><w:t>R&amp;D</w:t></w:r></w:p></w:tc></w:tr></w:tbl>");
        let tables = extract_tables(&xml).unwrap();
        assert_eq!(tables[0].rows[0].cells[0].text, "R&D");
    }

    #[test]
    fn reports_unknown_entities() {
        let xml = body("<w:tbl><w:tr><w:tc><w:p><w:r><w:t>R&bogus;D</w:t></w:r></w:p></w:tc></w:tr></w:tbl>");
        let err = extract_tables(&xml).unwrap_err();
        assert!(err.to_string().contains("Invalid text entity"), "{err:#}");
    }

    #[test]
    fn first_row_continuation_has_nothing_to_copy() {
        let xml = body(
            "<w:tbl>\
             <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>\
             <w:tc><w:p><w:r><w:t>Q</w:t></w:r></w:p></w:tc></w:tr>\
             <w:tr><w:tc><w:p><w:r><w:t>Q2</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>A2</w:t></w:r></w:p></w:tc></w:tr>\
             </w:tbl>",
        );
        let tables = extract_tables(&xml).unwrap();
        let first = &tables[0].rows[0].cells[0];
        assert_eq!(first.text, "");
        assert_eq!(first.merge, CellMerge::VerticalContinue);
        assert_eq!(
            tables[0].column_count(),
            Err(TableError::NoCellAbove { column: 0 })
        );
    }

    #[test]
    fn reports_malformed_xml() {
        let xml = body("<w:tbl><w:tr></w:tc></w:tbl>");
        assert!(extract_tables(&xml).is_err());
    }
}
