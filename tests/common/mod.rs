//! Builders for .docx fixtures written with docx-rs

#![allow(dead_code)]

use docx_rs::{BreakType, Docx, Paragraph, Run, Table, TableCell, TableRow, VMergeType};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub fn cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}

/// A cell holding one paragraph per entry of `lines`
pub fn paragraphs_cell(lines: &[&str]) -> TableCell {
    lines.iter().fold(TableCell::new(), |cell, line| {
        cell.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    })
}

/// A cell whose single paragraph contains a line break between `first` and `second`
pub fn broken_cell(first: &str, second: &str) -> TableCell {
    TableCell::new().add_paragraph(
        Paragraph::new().add_run(
            Run::new()
                .add_text(first)
                .add_break(BreakType::TextWrapping)
                .add_text(second),
        ),
    )
}

pub fn spanning_cell(text: &str, columns: usize) -> TableCell {
    cell(text).grid_span(columns)
}

pub fn merge_start(text: &str) -> TableCell {
    cell(text).vertical_merge(VMergeType::Restart)
}

pub fn merge_continue() -> TableCell {
    TableCell::new()
        .add_paragraph(Paragraph::new())
        .vertical_merge(VMergeType::Continue)
}

pub fn row(cells: Vec<TableCell>) -> TableRow {
    TableRow::new(cells)
}

pub fn text_row(texts: &[&str]) -> TableRow {
    TableRow::new(texts.iter().map(|text| cell(text)).collect())
}

pub fn docx_bytes(tables: Vec<Table>) -> Vec<u8> {
    let docx = tables.into_iter().fold(
        Docx::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Syllabus"))),
        |docx, table| docx.add_table(table),
    );

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .expect("failed to pack fixture docx");
    buffer.into_inner()
}

pub fn write_docx(dir: &Path, name: &str, tables: Vec<Table>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, docx_bytes(tables)).expect("failed to write fixture docx");
    path
}

/// A course syllabus with merged label cells, a split label and a
/// vertically merged objectives block.
pub fn syllabus_tables() -> Vec<Table> {
    vec![
        Table::new(vec![
            text_row(&["课程代码", "CS101", "学分", "2"]),
            row(vec![
                spanning_cell("课程名称", 2),
                spanning_cell("数据结构", 2),
            ]),
            row(vec![
                paragraphs_cell(&["学", "时"]),
                cell("32"),
                cell("Instructor"),
                cell("Ada"),
            ]),
        ]),
        Table::new(vec![
            row(vec![merge_start("课程目标 (Course Object)"), cell("掌握 A1, B2")]),
            row(vec![merge_continue(), cell("应用 A1 与 C3")]),
        ]),
    ]
}
