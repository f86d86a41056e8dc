//! Parrot/neon theme tokens.
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, highlights)
//! - **Positive**: Neon green (close above open)
//! - **Negative**: Hot pink (close below open, errors)
//! - **Warning**: Neon orange (dropped rows, busy states)
//! - **Neutral**: Cool purple (secondary info)
//! - **Muted**: Steel blue (labels, disabled)

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_PRIMARY: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Green at or above zero, pink below.
pub fn pnl(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnl_sign() {
        assert_eq!(pnl(1.0), positive());
        assert_eq!(pnl(0.0), positive());
        assert_eq!(pnl(-0.01), negative());
    }

    #[test]
    fn focus_styles_differ() {
        assert_ne!(panel_border(true), panel_border(false));
        assert_eq!(panel_title(true), accent_bold());
    }
}
