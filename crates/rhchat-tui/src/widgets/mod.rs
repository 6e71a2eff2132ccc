// Widgets for each zone of the chat screen.

pub mod avatar;
pub mod chat_log;
pub mod confirm;
pub mod error_banner;
pub mod header;
pub mod help_bar;
pub mod input_bar;
pub mod loading;
pub mod side_panel;

use ratatui::style::{Color, Style};

/// Border style for a panel, highlighted when it has keyboard focus.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        base
    }
}

/// Scroll offset that keeps the last `height` of `total` lines in view.
pub fn tail_scroll(total: usize, height: usize) -> u16 {
    u16::try_from(total.saturating_sub(height)).unwrap_or(u16::MAX)
}
