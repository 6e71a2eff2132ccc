// Error banner: the session's current error plus its recovery keys.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use rhchat_core::protocol::RetryAction;

pub const DEFAULT_MESSAGE: &str = "An error occurred. Please try again.";

/// What the retry key will do for a given action.
pub fn retry_label(action: &RetryAction) -> &'static str {
    match action {
        RetryAction::GenerateSubquestions => "regenerate sub-questions",
        RetryAction::RetrieveResumes => "retrieve resumes again",
        RetryAction::SendChat(_) => "resend message",
    }
}

pub fn lines(message: &str, retry: Option<&RetryAction>) -> Vec<Line<'static>> {
    let message = if message.trim().is_empty() {
        DEFAULT_MESSAGE
    } else {
        message
    };

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut hint = Vec::new();
    if let Some(action) = retry {
        hint.push(Span::styled("Ctrl+T", key_style));
        hint.push(Span::raw(format!(": {}  ", retry_label(action))));
    }
    hint.push(Span::styled("Esc", key_style));
    hint.push(Span::raw(": dismiss"));

    vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        Line::from(hint).style(Style::default().fg(Color::Gray)),
    ]
}

pub fn render(frame: &mut Frame, area: Rect, message: &str, retry: Option<&RetryAction>) {
    let paragraph = Paragraph::new(lines(message, retry))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(Span::styled(
                    " Error ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn empty_message_falls_back_to_default() {
        let lines = lines("", None);
        assert_eq!(text(&lines[0]), DEFAULT_MESSAGE);
    }

    #[test]
    fn message_is_shown_verbatim() {
        let lines = lines("API Error: 500 - boom", None);
        assert_eq!(text(&lines[0]), "API Error: 500 - boom");
    }

    #[test]
    fn retry_hint_only_with_action() {
        let without = text(&lines("x", None)[1]);
        assert!(!without.contains("Ctrl+T"));
        assert!(without.contains("Esc: dismiss"));

        let with = text(&lines("x", Some(&RetryAction::SendChat("q".into())))[1]);
        assert!(with.contains("Ctrl+T: resend message"), "{with}");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 4);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                render(
                    frame,
                    frame.area(),
                    "Network error: connection refused",
                    Some(&RetryAction::RetrieveResumes),
                )
            })
            .unwrap();
    }
}
