// Screen layout: panel arrangement and sizing.
//
// +---------------------------------------------------------+
// | Header (1 row)                                           |
// +-------------------+-------------------------------------+
// | Side panel (35%)  | Chat log (fill)                      |
// | +- Job desc (30%) |                                      |
// | +- Sub-q's (35%)  +-------------------------------------+
// | +- Resumes (35%)  | Error banner (4 rows, only on error) |
// |                   +-------------------------------------+
// |                   | Input (3 rows)                       |
// +-------------------+-------------------------------------+
// | Help bar (1 row)                                         |
// +---------------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const ERROR_BANNER_HEIGHT: u16 = 4;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// App name, version and lifecycle phase.
    pub header: Rect,
    pub job_description: Rect,
    pub subquestions: Rect,
    pub resumes: Rect,
    /// Message transcript.
    pub chat_log: Rect,
    /// Zero height when there is no error to show.
    pub error_banner: Rect,
    pub input: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect, has_error: bool) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(8),    // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let header = vertical[0];
    let body = vertical[1];
    let help_bar = vertical[2];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(body);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(horizontal[0]);

    let error_height = if has_error { ERROR_BANNER_HEIGHT } else { 0 };
    let chat = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(error_height),
            Constraint::Length(3),
        ])
        .split(horizontal[1]);

    AppLayout {
        header,
        job_description: side[0],
        subquestions: side[1],
        resumes: side[2],
        chat_log: chat[0],
        error_banner: chat[1],
        input: chat[2],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero_with_error() {
        let layout = build_layout(test_area(), true);
        let rects = [
            ("header", layout.header),
            ("job_description", layout.job_description),
            ("subquestions", layout.subquestions),
            ("resumes", layout.resumes),
            ("chat_log", layout.chat_log),
            ("error_banner", layout.error_banner),
            ("input", layout.input),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0 && rect.height > 0, "{name} has zero size: {rect:?}");
        }
    }

    #[test]
    fn error_banner_collapses_without_error() {
        let layout = build_layout(test_area(), false);
        assert_eq!(layout.error_banner.height, 0);
        let with_error = build_layout(test_area(), true);
        assert_eq!(with_error.error_banner.height, ERROR_BANNER_HEIGHT);
        assert!(layout.chat_log.height > with_error.chat_log.height);
    }

    #[test]
    fn fixed_rows_have_expected_heights() {
        let layout = build_layout(test_area(), false);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.header.y, 0);
        assert_eq!(layout.help_bar.y, 39);
    }

    #[test]
    fn side_panel_is_left_of_chat() {
        let layout = build_layout(test_area(), false);
        assert!(layout.job_description.x < layout.chat_log.x);
        assert_eq!(layout.chat_log.x, layout.input.x);
        assert!(layout.job_description.y < layout.subquestions.y);
        assert!(layout.subquestions.y < layout.resumes.y);
    }
}
