// Chat log: the message transcript with avatars and timestamps.
//
// Shows a welcome text while the transcript is empty and the typing
// indicator while a reply is pending. Follows the newest message unless the
// user has scrolled up.

use chrono::Local;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use rhchat_core::protocol::Message;

use super::{avatar, loading};
use crate::ViewState;

const AVATAR_WIDTH: u16 = 4;

const WELCOME_HINT: &str = "Start by entering a job description to generate relevant questions, \
then ask me anything about resumes and candidates.";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);

    let paragraph = Paragraph::new(build_lines(state)).wrap(Wrap { trim: false });
    // Counted before the block is attached, so only wrapped text rows.
    let total = paragraph.line_count(inner.width);

    let height = usize::from(inner.height);
    let max_scroll = total.saturating_sub(height);
    let offset = state.scroll_offset.min(max_scroll);
    let top = u16::try_from(max_scroll - offset).unwrap_or(u16::MAX);

    let title = if offset > 0 {
        format!(" Chat (scrolled up {offset}) ")
    } else {
        " Chat ".to_string()
    };

    let paragraph = paragraph.block(block.title(title)).scroll((top, 0));
    frame.render_widget(paragraph, area);
}

/// All transcript lines, unwrapped. The paragraph wraps them to the panel.
pub fn build_lines(state: &ViewState) -> Vec<Line<'static>> {
    let snapshot = &state.snapshot;
    let mut lines = Vec::new();

    if snapshot.messages.is_empty() && !snapshot.loading {
        lines.extend(welcome_lines(&state.app_name));
        return lines;
    }

    for message in &snapshot.messages {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    if state.show_typing {
        lines.push(loading::line(Some(loading::THINKING_MESSAGE), state.tick));
    }
    lines
}

fn welcome_lines(app_name: &str) -> Vec<Line<'static>> {
    vec![
        Line::styled(
            format!("Welcome to {app_name}! 👋"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(WELCOME_HINT, Style::default().fg(Color::Gray)),
    ]
}

/// Header (avatar, author, time) followed by one line per line of text.
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (bg, name) = avatar::for_sender(message.sender);
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string();

    let mut lines = vec![Line::from(vec![
        avatar::badge(bg, Some(name), AVATAR_WIDTH),
        Span::raw(" "),
        Span::styled(name, Style::default().fg(bg).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {time}"), Style::default().fg(Color::DarkGray)),
    ])];

    lines.extend(
        message
            .text
            .split('\n')
            .map(|line| Line::raw(line.to_string())),
    );
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
