//! Table renderers — plain text, Markdown, CSV and JSON.
//!
//! Every renderer is a pure function of the table and an explicit
//! [`RenderOptions`]; there is no process-wide display state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RenderConfig;
use crate::table::{CellValue, Column, Table};

/// Header of the timestamp column in exported formats.
pub const INDEX_HEADER: &str = "Datetime";

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show at most this many rows (head and tail); `None` shows all.
    pub max_rows: Option<usize>,
    /// Decimal places for price-like cells.
    pub precision: usize,
    /// Longest cell (in characters) before truncation.
    pub max_col_width: usize,
    /// Longest output line (in characters) before it is cut.
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            max_rows: config.max_rows,
            precision: config.precision,
            max_col_width: config.max_col_width,
            width: config.width,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export produced invalid UTF-8")]
    Utf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Csv,
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Table,
        OutputFormat::Markdown,
        OutputFormat::Csv,
        OutputFormat::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}' (expected table, markdown, csv or json)")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Render `table` in the chosen format.
pub fn render(format: OutputFormat, table: &Table, opts: &RenderOptions) -> Result<String, RenderError> {
    match format {
        OutputFormat::Table => Ok(render_text(table, opts)),
        OutputFormat::Markdown => Ok(render_markdown(table, opts)),
        OutputFormat::Csv => render_csv(table, opts),
        OutputFormat::Json => render_json(table, opts),
    }
}

/// Format one cell: counts as integers, prices with `precision` decimals.
pub fn format_cell(value: CellValue, precision: usize) -> String {
    match value {
        CellValue::Price(v) => format!("{v:.precision$}"),
        CellValue::Count(v) => v.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push(ELLIPSIS);
    out
}

enum TextRow {
    Cells(String, Vec<String>),
    Elided,
}

/// Row indices to show: everything, or head `n/2` and tail `n - n/2`.
fn visible_rows(len: usize, max_rows: Option<usize>) -> (Vec<usize>, Option<usize>) {
    match max_rows {
        Some(n) if len > n => {
            let head = n / 2;
            let tail = n - head;
            let mut idx: Vec<usize> = (0..head).collect();
            idx.extend(len - tail..len);
            (idx, Some(head))
        }
        _ => ((0..len).collect(), None),
    }
}

/// Fixed-width text table with a label index column.
///
/// When rows are elided a `...` line marks the gap and a
/// `[N rows x M columns]` footer follows.
pub fn render_text(table: &Table, opts: &RenderOptions) -> String {
    let (indices, gap_at) = visible_rows(table.len(), opts.max_rows);

    let mut rows = Vec::with_capacity(indices.len() + 1);
    for (pos, &i) in indices.iter().enumerate() {
        if gap_at == Some(pos) {
            rows.push(TextRow::Elided);
        }
        let row = &table.rows[i];
        let cells = table
            .columns
            .iter()
            .map(|c| truncate(&format_cell(c.value(&row.bar), opts.precision), opts.max_col_width))
            .collect();
        rows.push(TextRow::Cells(truncate(&row.label, opts.max_col_width), cells));
    }
    if gap_at == Some(indices.len()) {
        rows.push(TextRow::Elided);
    }

    let headers: Vec<String> = table
        .columns
        .iter()
        .map(|c| truncate(c.header(), opts.max_col_width))
        .collect();

    let mut label_width = 0;
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        if let TextRow::Cells(label, cells) = row {
            label_width = label_width.max(label.chars().count());
            for (w, cell) in widths.iter_mut().zip(cells) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let elided_width = 3;
    label_width = label_width.max(elided_width);
    for w in &mut widths {
        *w = (*w).max(elided_width);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let mut header = " ".repeat(label_width);
    for (h, &w) in headers.iter().zip(&widths) {
        header.push_str(&format!("  {h:>w$}"));
    }
    lines.push(header);

    for row in &rows {
        let line = match row {
            TextRow::Cells(label, cells) => {
                let mut line = format!("{label:<label_width$}");
                for (cell, &w) in cells.iter().zip(&widths) {
                    line.push_str(&format!("  {cell:>w$}"));
                }
                line
            }
            TextRow::Elided => {
                let mut line = format!("{:<label_width$}", "...");
                for &w in &widths {
                    line.push_str(&format!("  {:>w$}", "..."));
                }
                line
            }
        };
        lines.push(line);
    }

    let mut out: Vec<String> = lines
        .into_iter()
        .map(|l| truncate_line(l.trim_end(), opts.width))
        .collect();
    if gap_at.is_some() {
        out.push(String::new());
        out.push(format!("[{} rows x {} columns]", table.len(), table.columns.len()));
    }
    out.join("\n")
}

fn truncate_line(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}

/// GitHub-flavoured Markdown table. Numeric columns are right-aligned.
pub fn render_markdown(table: &Table, opts: &RenderOptions) -> String {
    let mut out = String::new();

    out.push_str(&format!("| {INDEX_HEADER} |"));
    for c in &table.columns {
        out.push_str(&format!(" {} |", c.header()));
    }
    out.push_str("\n|---|");
    for _ in &table.columns {
        out.push_str("---:|");
    }
    out.push('\n');

    let (indices, gap_at) = visible_rows(table.len(), opts.max_rows);
    for (pos, &i) in indices.iter().enumerate() {
        if gap_at == Some(pos) {
            out.push_str(&markdown_elided(&table.columns));
        }
        let row = &table.rows[i];
        out.push_str(&format!("| {} |", row.label));
        for c in &table.columns {
            out.push_str(&format!(" {} |", format_cell(c.value(&row.bar), opts.precision)));
        }
        out.push('\n');
    }
    if gap_at == Some(indices.len()) {
        out.push_str(&markdown_elided(&table.columns));
    }
    out
}

fn markdown_elided(columns: &[Column]) -> String {
    let mut line = "| ... |".to_string();
    for _ in columns {
        line.push_str(" ... |");
    }
    line.push('\n');
    line
}

/// CSV with a `Datetime` label column. Always contains every row.
pub fn render_csv(table: &Table, opts: &RenderOptions) -> Result<String, RenderError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![INDEX_HEADER.to_string()];
    header.extend(table.columns.iter().map(|c| c.header().to_string()));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.label.clone()];
        record.extend(
            table
                .columns
                .iter()
                .map(|c| format_cell(c.value(&row.bar), opts.precision)),
        );
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| RenderError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| RenderError::Utf8)
}

/// Pretty JSON array of row objects keyed by column header.
///
/// Prices are rounded to `precision` decimals. Always contains every row.
pub fn render_json(table: &Table, opts: &RenderOptions) -> Result<String, RenderError> {
    let scale = 10f64.powi(opts.precision.min(15) as i32);
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            obj.insert(INDEX_HEADER.to_string(), row.label.clone().into());
            for c in &table.columns {
                let value = match c.value(&row.bar) {
                    CellValue::Price(v) => serde_json::json!((v * scale).round() / scale),
                    CellValue::Count(v) => serde_json::json!(v),
                };
                obj.insert(c.header().to_string(), value);
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
