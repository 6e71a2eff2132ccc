// Side panel: job description editor, sub-question editor, resume list.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use rhchat_core::protocol::{EditMode, SubquestionsView};

use super::{focused_border_style, tail_scroll};
use crate::layout::AppLayout;
use crate::{Focus, ViewState};

const CURSOR: &str = "▏";
const JOB_PLACEHOLDER: &str = "Enter job description here...";
const SUBQUESTIONS_PLACEHOLDER: &str = "Press Ctrl+G to generate sub-questions from the job description.";

pub fn render(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    render_job_description(frame, layout.job_description, state);
    render_subquestions(frame, layout.subquestions, state);
    render_resumes(frame, layout.resumes, state);
}

fn render_job_description(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == Focus::JobDescription;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Job Description ")
        .title_bottom(Line::from(" ^G: get sub-questions ").right_aligned())
        .border_style(focused_border_style(focused, Style::default()));

    render_text_area(
        frame,
        area,
        block,
        &state.snapshot.job_description,
        JOB_PLACEHOLDER,
        focused,
    );
}

fn render_subquestions(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let focused = state.focus == Focus::Subquestions;
    let view = snapshot.subquestions.as_ref();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(subquestions_title(view, snapshot.subquestions_pending))
        .title_bottom(Line::from(subquestions_hint(view)).right_aligned())
        .border_style(focused_border_style(
            focused,
            mode_border_style(view.map(|v| v.mode)),
        ));

    let text = view.map_or("", |v| v.text.as_str());
    let editable = view.is_some_and(|v| v.mode == EditMode::Editable);
    render_text_area(frame, area, block, text, SUBQUESTIONS_PLACEHOLDER, focused && editable);
}

fn render_resumes(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let title = if snapshot.retrieving_resumes {
        " Retrieved Resumes (retrieving...) ".to_string()
    } else {
        format!(" Retrieved Resumes ({}) ", snapshot.resumes.len())
    };

    let lines: Vec<Line> = if snapshot.resumes.is_empty() {
        vec![Line::styled(
            "Press Ctrl+R to retrieve matching resumes.",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        resume_lines(&snapshot.resumes)
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// One numbered line per resume, `#1` first.
pub fn resume_lines(resumes: &[String]) -> Vec<Line<'static>> {
    resumes
        .iter()
        .enumerate()
        .map(|(i, resume)| {
            Line::from(vec![
                Span::styled(
                    format!("#{} ", i + 1),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(resume.clone()),
            ])
        })
        .collect()
}

pub fn subquestions_title(view: Option<&SubquestionsView>, pending: bool) -> String {
    if pending {
        return " Sub-questions (generating...) ".to_string();
    }
    match view.map(|v| v.mode) {
        None => " Sub-questions ".to_string(),
        Some(EditMode::Editable) => " Sub-questions [editable] ".to_string(),
        Some(EditMode::Locked) => " Sub-questions [locked] ".to_string(),
        Some(EditMode::Submitted) => " Sub-questions [submitted] ".to_string(),
    }
}

fn subquestions_hint(view: Option<&SubquestionsView>) -> &'static str {
    match view.map(|v| v.mode) {
        Some(EditMode::Editable) => " ^L: lock  ^S: submit  ^R: resumes ",
        Some(EditMode::Locked) => " ^L: unlock  ^S: submit  ^R: resumes ",
        Some(EditMode::Submitted) => " ^R: resumes ",
        None => "",
    }
}

fn mode_border_style(mode: Option<EditMode>) -> Style {
    match mode {
        Some(EditMode::Locked) => Style::default().fg(Color::Magenta),
        Some(EditMode::Submitted) => Style::default().fg(Color::Blue),
        _ => Style::default(),
    }
}

/// Multi-line text box that keeps its last lines in view. Shows `placeholder`
/// when empty and a cursor when `cursor` is set.
fn render_text_area(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    text: &str,
    placeholder: &str,
    cursor: bool,
) {
    let inner = block.inner(area);

    let lines: Vec<Line> = if text.is_empty() && !cursor {
        vec![Line::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        let mut content = text.to_string();
        if cursor {
            content.push_str(CURSOR);
        }
        content
            .split('\n')
            .map(|line| Line::raw(line.to_string()))
            .collect()
    };

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let scroll = tail_scroll(paragraph.line_count(inner.width), usize::from(inner.height));
    let paragraph = paragraph.block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
