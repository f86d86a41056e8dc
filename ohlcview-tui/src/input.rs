//! Keyboard input dispatch — global keys → overlays → focus-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Focus, Overlay, PAGE_ROWS};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::F(1) => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::F(2) => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        KeyCode::F(5) => {
            app.request_fetch();
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.focus = app.focus.prev();
            } else {
                app.focus = app.focus.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::Char('q') if !app.focus.is_text() => {
            app.running = false;
            return;
        }
        _ => {}
    }

    // 3. Focus-specific keys.
    match app.focus {
        Focus::Ticker | Focus::Start | Focus::End => handle_text_key(app, key),
        Focus::Interval => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.form.interval = app.form.interval.prev(),
            KeyCode::Right | KeyCode::Char('l') => app.form.interval = app.form.interval.next(),
            KeyCode::Enter => app.focus = app.focus.next(),
            _ => {}
        },
        Focus::Columns => match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                app.form.cycle_columns()
            }
            KeyCode::Enter => app.focus = app.focus.next(),
            _ => {}
        },
        Focus::FetchButton => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                app.request_fetch();
            }
        }
        Focus::Table => handle_table_key(app, key),
    }
}

fn handle_text_key(app: &mut AppState, key: KeyEvent) {
    let focus = app.focus;
    match key.code {
        KeyCode::Enter => app.focus = focus.next(),
        KeyCode::Backspace => {
            if let Some(text) = app.form.text_mut(focus) {
                text.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = app.form.text_mut(focus) {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_table_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_by(-1),
        KeyCode::PageDown => app.scroll_by(PAGE_ROWS as isize),
        KeyCode::PageUp => app.scroll_by(-(PAGE_ROWS as isize)),
        KeyCode::Char('g') | KeyCode::Home => app.scroll = 0,
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_end(),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::F(2) | KeyCode::Char('q') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}
