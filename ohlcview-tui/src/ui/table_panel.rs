//! Result table — title, header row, scrolled bar rows with OC colouring.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table as TableWidget, Wrap};

use ohlcview_core::render::{format_cell, INDEX_HEADER};
use ohlcview_core::{CellValue, Column, Table};

use crate::app::{AppState, Focus};
use crate::theme;

const LABEL_WIDTH: u16 = 19;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.focus == Focus::Table;
    let title = match &app.table {
        Some(table) => format!(" {} ", table.title()),
        None => " Results ".to_string(),
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(title)
        .title_style(theme::panel_title(active));

    let table = match &app.table {
        Some(table) if !table.is_empty() => table,
        Some(_) => {
            placeholder(f, area, block, "No complete bars in this range.");
            return;
        }
        None => {
            placeholder(
                f,
                area,
                block,
                "No data loaded. Fill in the form and press F5 (or Enter on Fetch Data).",
            );
            return;
        }
    };

    // Borders plus the header row.
    let visible = area.height.saturating_sub(3) as usize;
    let start = app.scroll.min(table.len().saturating_sub(1));
    let end = (start + visible).min(table.len());
    block = block.title_bottom(Line::from(Span::styled(
        format!(" rows {}-{} of {} ", start + 1, end, table.len()),
        theme::muted(),
    )));

    let precision = app.render_opts.precision;
    let widths = column_widths(table, start, end, precision, app.render_opts.max_col_width);

    let header = Row::new(
        std::iter::once(Cell::from(INDEX_HEADER))
            .chain(table.columns.iter().map(|c| right(c.header().to_string(), theme::text())))
            .collect::<Vec<_>>(),
    )
    .style(theme::accent_bold());

    let rows: Vec<Row> = table.rows[start..end]
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::from(Span::styled(row.label.clone(), theme::neutral()))];
            for &column in &table.columns {
                let value = column.value(&row.bar);
                cells.push(right(format_cell(value, precision), cell_style(column, value)));
            }
            Row::new(cells)
        })
        .collect();

    let constraints: Vec<Constraint> = std::iter::once(Constraint::Length(LABEL_WIDTH))
        .chain(widths.into_iter().map(Constraint::Length))
        .collect();

    let widget = TableWidget::new(rows, constraints)
        .header(header)
        .column_spacing(2)
        .block(block);
    f.render_widget(widget, area);
}

fn placeholder(f: &mut Frame, area: Rect, block: Block<'_>, message: &str) {
    let para = Paragraph::new(Line::from(Span::styled(message.to_string(), theme::muted())))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

/// Widest of header and visible cells, capped at `max_width`.
fn column_widths(
    table: &Table,
    start: usize,
    end: usize,
    precision: usize,
    max_width: usize,
) -> Vec<u16> {
    table
        .columns
        .iter()
        .map(|&column| {
            let widest = table.rows[start..end]
                .iter()
                .map(|row| format_cell(column.value(&row.bar), precision).chars().count())
                .chain(std::iter::once(column.header().len()))
                .max()
                .unwrap_or(0);
            widest.min(max_width.max(1)) as u16
        })
        .collect()
}

fn cell_style(column: Column, value: CellValue) -> Style {
    match (column, value) {
        (Column::Oc, CellValue::Price(v)) => theme::pnl(v),
        _ => theme::text(),
    }
}

fn right(text: String, style: Style) -> Cell<'static> {
    Cell::from(Line::from(Span::styled(text, style)).alignment(Alignment::Right))
}
