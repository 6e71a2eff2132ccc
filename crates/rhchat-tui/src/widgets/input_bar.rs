// Chat input line with a character counter.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::focused_border_style;
use crate::{Focus, ViewState};

const PLACEHOLDER: &str = "Type your message...";
const SENDING: &str = "Sending...";
const CURSOR: char = '▏';

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Message ")
        .title_bottom(counter_line(state))
        .border_style(focused_border_style(focused, Style::default()));

    let line = content_line(state, focused);
    let offset = if state.snapshot.input.is_empty() {
        0
    } else {
        tail_offset(&line, block.inner(area).width)
    };
    let paragraph = Paragraph::new(line).block(block).scroll((0, offset));
    frame.render_widget(paragraph, area);
}

/// `used/max` in the bottom border, red once the limit is reached.
pub fn counter_line(state: &ViewState) -> Line<'static> {
    let used = state.snapshot.input.chars().count();
    let color = if used >= state.max_message_length {
        Color::Red
    } else {
        Color::DarkGray
    };
    Line::from(Span::styled(
        format!(" {used}/{} ", state.max_message_length),
        Style::default().fg(color),
    ))
    .right_aligned()
}

/// The input text with the cursor, or a placeholder when there is none.
pub fn content_line(state: &ViewState, focused: bool) -> Line<'static> {
    let input = &state.snapshot.input;
    let dim = Style::default().fg(Color::DarkGray);

    if state.snapshot.loading && input.is_empty() {
        return Line::styled(SENDING, dim);
    }
    if input.is_empty() && !focused {
        return Line::styled(PLACEHOLDER, dim);
    }

    let mut text = input.clone();
    if focused {
        text.push(CURSOR);
    }
    Line::raw(text)
}

/// Columns to scroll right so the end of `line` stays in a `width`-column
/// view. Measured in display columns, so wide glyphs count double.
pub fn tail_offset(line: &Line, width: u16) -> u16 {
    u16::try_from(line.width().saturating_sub(usize::from(width))).unwrap_or(u16::MAX)
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

    /// Render the bar into a `width` x 3 terminal and return its middle row.
    fn rendered_row(state: &ViewState, width: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..width).map(|x| buffer[(x, 1)].symbol()).collect()
    }

    #[test]
    fn placeholder_when_empty_and_unfocused() {
        let state = ViewState::default();
        assert_eq!(text(&content_line(&state, false)), PLACEHOLDER);
    }

    #[test]
    fn sending_shown_while_waiting() {
        let mut state = ViewState::default();
        state.snapshot.loading = true;
        assert_eq!(text(&content_line(&state, true)), SENDING);
    }

    #[test]
    fn long_input_keeps_its_tail_visible() {
        let mut state = ViewState::default();
        state.snapshot.input = "abcdefghij".into();
        assert_eq!(rendered_row(&state, 7), "│ghij▏│");
    }

    #[test]
    fn placeholder_is_not_scrolled() {
        let mut state = ViewState::default();
        state.focus = Focus::JobDescription;
        assert!(rendered_row(&state, 12).starts_with("│Type your "));
    }

    #[test]
    fn tail_offset_counts_display_columns() {
        assert_eq!(tail_offset(&Line::raw("abc"), 5), 0);
        assert_eq!(tail_offset(&Line::raw("abcdefg"), 5), 2);
        assert_eq!(tail_offset(&Line::raw("候选人具有"), 6), 4);
    }

    #[test]
    fn wide_input_tail_stays_visible() {
        let mut state = ViewState::default();
        state.snapshot.input = "候选人具有十年经验".into();
        // 19 columns of text and cursor in an 11-column view.
        let row = rendered_row(&state, 13);
        assert!(row.contains("验"), "{row}");
        assert!(row.contains('▏'), "{row}");
        assert!(!row.contains("候"), "{row}");
    }

    #[test]
    fn counter_turns_red_at_limit() {
        let mut state = ViewState::default();
        state.max_message_length = 3;
        state.snapshot.input = "ab".into();
        assert_eq!(text(&counter_line(&state)), " 2/3 ");
        state.snapshot.input = "abc".into();
        assert_eq!(counter_line(&state).spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
