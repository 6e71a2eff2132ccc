// Loading indicator: a spinner followed by a status message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub const DEFAULT_MESSAGE: &str = "Loading...";

/// Shown in the chat log while a reply is pending.
pub const THINKING_MESSAGE: &str = "AI is thinking...";

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for an animation tick.
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub fn line(message: Option<&str>, tick: usize) -> Line<'static> {
    let message = message.unwrap_or(DEFAULT_MESSAGE);
    Line::from(vec![
        Span::styled(
            format!("{} ", spinner_frame(tick)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            message.to_string(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

pub fn render(frame: &mut Frame, area: Rect, message: Option<&str>, tick: usize) {
    frame.render_widget(Paragraph::new(line(message, tick)), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn default_message_when_none_given() {
        let text = line_text(&line(None, 0));
        assert!(text.ends_with("Loading..."), "{text}");
    }

    #[test]
    fn custom_message_is_shown() {
        let text = line_text(&line(Some(THINKING_MESSAGE), 0));
        assert!(text.ends_with("AI is thinking..."), "{text}");
    }

    #[test]
    fn spinner_cycles_through_frames() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len()));
        assert_ne!(spinner_frame(0), spinner_frame(1));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(30, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), None, 3))
            .unwrap();
    }
}
