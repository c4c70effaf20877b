//! Rendering extraction reports
//!
//! The terminal table mirrors a two column "Field | Value" grid. Values that
//! were merged from several rows carry embedded newlines and are drawn one
//! physical line per table line.

use anyhow::{Context, Result};
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use std::fmt::Write;
use std::io::IsTerminal;
use unicode_width::UnicodeWidthStr;

use crate::report::{ExtractionReport, GoalReport};
use crate::{ColorChoice, ExportFormat};

pub struct ExportOptions {
    pub format: ExportFormat,
    pub color: ColorChoice,
    pub field_header: String,
    pub value_header: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Table,
            color: ColorChoice::Auto,
            field_header: "Field".to_string(),
            value_header: "Value".to_string(),
        }
    }
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

pub fn export_report(report: &ExtractionReport, options: &ExportOptions) -> Result<String> {
    match options.format {
        ExportFormat::Table => export_to_table(report, options),
        ExportFormat::Markdown => export_to_markdown(report, options),
        ExportFormat::Csv => export_to_csv(report, options),
        ExportFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report as JSON")
        }
    }
}

/// Terminal columns taken by `text`; wide CJK characters count two
fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(&self, text: &str, color: Option<Color>, bold: bool) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let mut styled = String::new();
        if bold {
            styled.push_str(&format!("{}", SetAttribute(Attribute::Bold)));
        }
        if let Some(color) = color {
            styled.push_str(&format!("{}", SetForegroundColor(color)));
        }
        styled.push_str(text);
        styled.push_str(&format!("{}{}", SetAttribute(Attribute::Reset), ResetColor));
        styled
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}

pub fn export_to_table(report: &ExtractionReport, options: &ExportOptions) -> Result<String> {
    let palette = Palette {
        enabled: options.color.enabled(),
    };
    let mut output = String::new();

    let rows: Vec<(Vec<&str>, Vec<&str>)> = report
        .fields
        .iter()
        .map(|(label, value)| (label.lines().collect(), value.lines().collect()))
        .collect();

    let mut field_width = display_width(&options.field_header);
    let mut value_width = display_width(&options.value_header);
    for (labels, values) in &rows {
        for line in labels {
            field_width = field_width.max(display_width(line));
        }
        for line in values {
            value_width = value_width.max(display_width(line));
        }
    }
    let field_width = field_width.max(3);
    let value_width = value_width.max(3);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{left}{}{mid}{}{right}",
            "─".repeat(field_width + 2),
            "─".repeat(value_width + 2)
        )
    };

    writeln!(output, "{}", rule("┌", "┬", "┐"))?;
    writeln!(
        output,
        "│ {} │ {} │",
        palette.paint(&pad(&options.field_header, field_width), None, true),
        palette.paint(&pad(&options.value_header, value_width), None, true)
    )?;
    writeln!(output, "{}", rule("├", "┼", "┤"))?;

    for (labels, values) in &rows {
        let height = labels.len().max(values.len()).max(1);
        for line in 0..height {
            let label = labels.get(line).copied().unwrap_or("");
            let value = values.get(line).copied().unwrap_or("");
            writeln!(
                output,
                "│ {} │ {} │",
                palette.paint(&pad(label, field_width), Some(Color::Cyan), false),
                pad(value, value_width)
            )?;
        }
    }
    writeln!(output, "{}", rule("└", "┴", "┘"))?;

    for goal in &report.goals {
        if let GoalReport::Found { key, codes } = goal {
            let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
            writeln!(
                output,
                "{} {}",
                palette.paint(&format!("Goal codes ({key}):"), Some(Color::Yellow), true),
                codes.join(", ")
            )?;
        }
    }

    Ok(output)
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

pub fn export_to_markdown(report: &ExtractionReport, options: &ExportOptions) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "# {}", report.source)?;
    writeln!(output)?;
    writeln!(
        output,
        "| {} | {} |",
        escape_markdown_cell(&options.field_header),
        escape_markdown_cell(&options.value_header)
    )?;
    writeln!(output, "| --- | --- |")?;
    for (label, value) in &report.fields {
        writeln!(
            output,
            "| {} | {} |",
            escape_markdown_cell(label),
            escape_markdown_cell(value)
        )?;
    }

    let found: Vec<_> = report
        .goals
        .iter()
        .filter_map(|goal| match goal {
            GoalReport::Found { key, codes } => Some((key, codes)),
            GoalReport::Missing { .. } => None,
        })
        .collect();
    if !found.is_empty() {
        writeln!(output)?;
        writeln!(output, "## Goal codes")?;
        writeln!(output)?;
        for (key, codes) in found {
            let codes: Vec<String> = codes.iter().map(ToString::to_string).collect();
            writeln!(output, "- **{key}**: {}", codes.join(", "))?;
        }
    }

    Ok(output)
}

pub fn export_to_csv(report: &ExtractionReport, options: &ExportOptions) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::<u8>::new());
    writer.write_record([&options.field_header, &options.value_header])?;
    for (label, value) in &report.fields {
        writer.write_record([label, value])?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("Failed to finish CSV output: {}", error.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
