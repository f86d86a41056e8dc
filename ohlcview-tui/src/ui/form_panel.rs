//! Sidebar — ticker, date range, interval and column selectors, fetch button.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, Focus};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.focus != Focus::Table;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(" Input Options ")
        .title_style(theme::panel_title(active));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let form = &app.form;
    let mut lines: Vec<Line> = Vec::new();

    text_field(&mut lines, "Ticker", &form.ticker, app.focus == Focus::Ticker);
    text_field(&mut lines, "Start date", &form.start, app.focus == Focus::Start);
    text_field(&mut lines, "End date", &form.end, app.focus == Focus::End);

    selector(
        &mut lines,
        "Interval",
        form.interval.as_str(),
        app.focus == Focus::Interval,
    );
    let limit = match form.interval.max_lookback_days() {
        Some(days) => format!("  last {days} days only"),
        None => "  no history limit".to_string(),
    };
    lines.push(Line::from(Span::styled(limit, theme::muted())));

    selector(
        &mut lines,
        "Columns",
        &form.columns.to_string(),
        app.focus == Focus::Columns,
    );
    lines.push(Line::from(""));

    let (label, style) = if app.fetch_in_progress {
        ("[ Fetching... ]", theme::warning())
    } else if app.focus == Focus::FetchButton {
        (
            "[ Fetch Data ]",
            theme::accent_bold().add_modifier(Modifier::REVERSED),
        )
    } else {
        ("[ Fetch Data ]", theme::accent())
    };
    lines.push(Line::from(Span::styled(label, style)));

    let para = Paragraph::new(lines);
    f.render_widget(para, inner);
}

fn text_field<'a>(lines: &mut Vec<Line<'a>>, label: &'a str, value: &'a str, focused: bool) {
    lines.push(Line::from(Span::styled(label, label_style(focused))));
    let mut spans = vec![Span::raw("  "), Span::styled(value, theme::text())];
    if focused {
        spans.push(Span::styled("_", theme::accent()));
    }
    lines.push(Line::from(spans));
}

fn selector<'a>(lines: &mut Vec<Line<'a>>, label: &'a str, value: &str, focused: bool) {
    lines.push(Line::from(Span::styled(label, label_style(focused))));
    let value_style = if focused {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::text()
    };
    lines.push(Line::from(vec![
        Span::styled("  ◂ ", theme::muted()),
        Span::styled(value.to_string(), value_style),
        Span::styled(" ▸", theme::muted()),
    ]));
}

fn label_style(focused: bool) -> ratatui::style::Style {
    if focused {
        theme::accent_bold()
    } else {
        theme::muted()
    }
}
