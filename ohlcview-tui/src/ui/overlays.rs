//! Overlay widgets — keyboard help, error history.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

/// Keyboard shortcut overlay.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keyboard Shortcuts [Esc]close ")
        .title_style(theme::accent_bold());

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "Tab / Shift+Tab", "Move focus forward / back");
    key(&mut lines, "F5", "Fetch with the current inputs");
    key(&mut lines, "F1", "This help");
    key(&mut lines, "F2", "Error history");
    key(&mut lines, "q / Ctrl+C", "Quit (q outside text fields)");
    lines.push(Line::from(""));

    section(&mut lines, "Input Options");
    key(&mut lines, "type / Backspace", "Edit ticker and dates (YYYY-MM-DD)");
    key(&mut lines, "Enter", "Next field");
    key(&mut lines, "h / l  ← / →", "Cycle interval or column set");
    key(&mut lines, "Enter / Space", "Fetch Data (on the button)");
    lines.push(Line::from(""));

    section(&mut lines, "Results");
    key(&mut lines, "j / k  ↓ / ↑", "Scroll one row");
    key(&mut lines, "PgDn / PgUp", "Scroll one page");
    key(&mut lines, "g / G", "First / last row");
    lines.push(Line::from(""));

    section(&mut lines, "Columns");
    key(&mut lines, "RV", "Volume / 10,000");
    key(&mut lines, "OC", "Close - Open");
    key(&mut lines, "Range", "High - Low");

    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let visible_height = inner.height as usize;
    let start = app.error_scroll;
    let end = (start + visible_height).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app.error_history.iter().enumerate().take(end).skip(start) {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    let para = Paragraph::new(lines);
    f.render_widget(para, inner);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>18}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
