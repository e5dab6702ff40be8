use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Metadata;

/// Final command output: metadata plus data.
#[derive(Debug, Serialize)]
pub struct Report {
    pub meta: Metadata,
    pub data: Value,
    /// Text rendering of `data` for `--format table`.
    #[serde(skip)]
    pub table: Option<TextTable>,
}

/// Column-aligned text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lines of the table, header first, columns padded to the widest cell.
    pub fn lines(&self) -> Vec<String> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| pad(cell, widths[index]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        let separator = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ");

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(line(&self.headers));
        lines.push(separator);
        lines.extend(self.rows.iter().map(|row| line(row)));
        lines
    }
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    format!("{cell}{}", " ".repeat(fill))
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(report)?,
    }

    Ok(())
}

fn render_table(report: &Report) -> Result<(), CliError> {
    println!("request_id  : {}", report.meta.request_id);
    println!("generated_at: {}", report.meta.generated_at);
    if let Some(source) = &report.meta.source {
        println!("source      : {source}");
    }
    println!("latency_ms  : {}", report.meta.latency_ms);

    if !report.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &report.meta.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    match &report.table {
        Some(table) if !table.is_empty() => {
            for line in table.lines() {
                println!("{line}");
            }
        }
        Some(_) => println!("{}", lecap_core::dashboard::NO_DATA),
        None => {
            let pretty_data = serde_json::to_string_pretty(&report.data)?;
            for line in pretty_data.lines() {
                println!("  {line}");
            }
        }
    }

    Ok(())
}
