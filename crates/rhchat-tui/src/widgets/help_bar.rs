// Help bar: keyboard shortcuts for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::{Focus, ViewState};

/// (key, action) pairs shown for the current focus and dialog state.
pub fn hints(state: &ViewState) -> Vec<(&'static str, &'static str)> {
    if state.confirm.is_some() {
        return vec![("y", "confirm"), ("n/Esc", "cancel")];
    }

    let enter = match state.focus {
        Focus::Input => ("Enter", "send"),
        Focus::JobDescription | Focus::Subquestions => ("Enter", "newline"),
    };

    let mut hints = vec![("Tab", "focus"), enter, ("^G", "sub-questions"), ("^L", "lock")];
    hints.extend([("^S", "submit"), ("^R", "resumes"), ("↑↓", "scroll")]);
    if let Some(error) = &state.snapshot.error {
        hints.push(("Esc", "dismiss"));
        if error.retry.is_some() {
            hints.push(("^T", "retry"));
        }
    }
    hints.push(("^X", "clear"));
    hints.push(("^Q", "quit"));
    hints
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(Color::White).add_modifier(Modifier::DIM);

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in hints(state).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", text_style));
        }
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(format!(":{action}"), text_style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
