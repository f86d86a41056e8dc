//! Top-level UI layout — input sidebar, result table, status bar.

pub mod form_panel;
pub mod overlays;
pub mod status_bar;
pub mod table_panel;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::{AppState, Overlay};

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 30;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(main_area);

    form_panel::render(f, columns[0], app);
    table_panel::render(f, columns[1], app);
    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ErrorCategory;
    use crate::test_helpers::{app, outcome};
    use crate::worker::WorkerResponse;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn screen(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw_to_string(app: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        screen(terminal.backend().buffer())
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }

    #[test]
    fn empty_state_shows_form_and_placeholder() {
        let (app, _rx, _tx) = app();
        let text = draw_to_string(&app, 120, 30);
        assert!(text.contains("Input Options"));
        assert!(text.contains("AAPL"));
        assert!(text.contains("[ Fetch Data ]"));
        assert!(text.contains("No data loaded"));
        assert!(text.contains("F1 Help"));
    }

    #[test]
    fn fetched_table_is_drawn_with_title_and_rows() {
        let (mut app, _rx, _tx) = app();
        app.apply_response(WorkerResponse::FetchDone {
            outcome: outcome(3, 0),
        });
        let text = draw_to_string(&app, 160, 30);
        assert!(text.contains("OHLC, Scaled Volume (RV), OC, and Range for AAPL (15m timeframe)"));
        assert!(text.contains("Datetime"));
        assert!(text.contains("Range"));
        assert!(text.contains("2024-03-01 09:30 AM"));
        assert!(text.contains("Fetched 3 rows for AAPL"));
    }

    #[test]
    fn overlays_draw_on_top() {
        let (mut app, _rx, _tx) = app();
        app.overlay = Overlay::Help;
        assert!(draw_to_string(&app, 120, 40).contains("Keyboard Shortcuts"));

        app.push_error(ErrorCategory::Data, "No data fetched".into(), "XYZ".into());
        app.overlay = Overlay::ErrorHistory;
        let text = draw_to_string(&app, 120, 40);
        assert!(text.contains("Error History (1)"));
        assert!(text.contains("[DATA]"));
    }
}
