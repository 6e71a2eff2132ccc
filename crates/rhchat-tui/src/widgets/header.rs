// Header bar: app name and version, lifecycle phase, session counters.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use rhchat_core::protocol::Phase;

use crate::ViewState;

const TAGLINE: &str = "AI-powered HR assistant for resume analysis and job matching";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let separator = Span::styled(" | ", Style::default().fg(Color::Gray));
    let snapshot = &state.snapshot;

    let mut spans = vec![
        Span::styled(
            format!(" {} v{}", state.app_name, state.app_version),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        separator.clone(),
        Span::styled("● ", Style::default().fg(phase_color(snapshot.phase))),
        Span::styled(snapshot.phase.label(), Style::default().fg(Color::White)),
    ];

    if !snapshot.resumes.is_empty() {
        spans.push(separator.clone());
        spans.push(Span::raw(format!("{} resumes", snapshot.resumes.len())));
    }
    if snapshot.history_len > 0 {
        spans.push(separator.clone());
        spans.push(Span::raw(format!("{} turns", snapshot.history_len)));
    }

    spans.push(separator);
    spans.push(Span::styled(TAGLINE, Style::default().fg(Color::DarkGray)));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Indicator color for each lifecycle phase.
pub fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Idle => Color::DarkGray,
        Phase::SubquestionsPending => Color::Yellow,
        Phase::SubquestionsEditable => Color::Cyan,
        Phase::SubquestionsLocked => Color::Magenta,
        Phase::SubquestionsSubmitted => Color::Blue,
        Phase::ResumesRetrieved | Phase::Chatting => Color::Green,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
