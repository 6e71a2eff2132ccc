// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into `UserCommand`s for the session loop,
// or into local `ViewState` changes (focus, scrolling, confirmation dialog).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use rhchat_core::protocol::{TextEdit, UserCommand};

use crate::{ConfirmAction, Focus, ViewState};

/// Lines moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should be forwarded to the
/// session loop, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Some platforms report Release and Repeat too; act on Press only.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if let Some(action) = view_state.confirm {
        return handle_confirm(key_event, action, view_state);
    }

    if ctrl {
        return handle_ctrl(key_event.code, view_state);
    }
    if key_event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key_event.code {
        KeyCode::Tab => {
            view_state.focus = view_state.focus.next();
            None
        }
        KeyCode::BackTab => {
            view_state.focus = view_state.focus.prev();
            None
        }
        KeyCode::Esc => Some(UserCommand::ClearError),

        KeyCode::Up => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE_SIZE);
            None
        }

        KeyCode::Enter => match view_state.focus {
            // The input is disabled while a reply is pending.
            Focus::Input if view_state.snapshot.loading => None,
            Focus::Input => Some(UserCommand::SendInput),
            _ => Some(edit(view_state, TextEdit::Newline)),
        },
        KeyCode::Backspace => Some(edit(view_state, TextEdit::Backspace)),
        KeyCode::Char(c) => Some(edit(view_state, TextEdit::Insert(c))),

        _ => None,
    }
}

fn handle_ctrl(code: KeyCode, view_state: &mut ViewState) -> Option<UserCommand> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'g' => Some(UserCommand::SubmitJobDescription),
        'l' => Some(UserCommand::ToggleLock),
        's' => Some(UserCommand::SubmitSubquestions),
        'r' => Some(UserCommand::RetrieveResumes),
        't' => Some(UserCommand::Retry),
        'u' => Some(edit(view_state, TextEdit::Clear)),
        'x' => {
            view_state.confirm = Some(ConfirmAction::ClearChat);
            None
        }
        'q' => {
            view_state.confirm = Some(ConfirmAction::Quit);
            None
        }
        _ => None,
    }
}

/// Handle key events while a confirmation dialog is open.
///
/// `y` confirms, `n` or `Esc` cancels; everything else is blocked.
fn handle_confirm(
    key_event: KeyEvent,
    action: ConfirmAction,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm = None;
            Some(match action {
                ConfirmAction::Quit => UserCommand::Quit,
                ConfirmAction::ClearChat => UserCommand::ClearChat,
            })
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm = None;
            None
        }
        _ => None,
    }
}

fn edit(view_state: &ViewState, edit: TextEdit) -> UserCommand {
    UserCommand::Edit {
        field: view_state.focus.field(),
        edit,
    }
}

/// Scroll towards older messages. Clamped at render time.
fn scroll_up(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_offset = view_state.scroll_offset.saturating_add(lines);
}

fn scroll_down(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_offset = view_state.scroll_offset.saturating_sub(lines);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use rhchat_core::protocol::TextField;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl_key(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    // -- Event filtering --

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('a'));
        event.kind = KeyEventKind::Release;
        assert!(handle_key(event, &mut state).is_none());
    }

    #[test]
    fn ctrl_c_quits_even_in_dialog() {
        let mut state = ViewState::default();
        state.confirm = Some(ConfirmAction::ClearChat);
        assert_eq!(handle_key(ctrl_key('c'), &mut state), Some(UserCommand::Quit));
    }

    // -- Typing --

    #[test]
    fn characters_go_to_focused_field() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('h')), &mut state),
            Some(UserCommand::Edit {
                field: TextField::Input,
                edit: TextEdit::Insert('h'),
            })
        );

        state.focus = Focus::JobDescription;
        assert_eq!(
            handle_key(key(KeyCode::Backspace), &mut state),
            Some(UserCommand::Edit {
                field: TextField::JobDescription,
                edit: TextEdit::Backspace,
            })
        );
    }

    #[test]
    fn enter_sends_from_input_and_breaks_lines_elsewhere() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), Some(UserCommand::SendInput));

        state.focus = Focus::Subquestions;
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::Edit {
                field: TextField::Subquestions,
                edit: TextEdit::Newline,
            })
        );
    }

    #[test]
    fn enter_is_blocked_while_reply_pending() {
        let mut state = ViewState::default();
        state.snapshot.loading = true;
        assert!(handle_key(key(KeyCode::Enter), &mut state).is_none());
    }

    #[test]
    fn ctrl_u_clears_focused_field() {
        let mut state = ViewState::default();
        state.focus = Focus::JobDescription;
        assert_eq!(
            handle_key(ctrl_key('u'), &mut state),
            Some(UserCommand::Edit {
                field: TextField::JobDescription,
                edit: TextEdit::Clear,
            })
        );
    }

    // -- Commands --

    #[test]
    fn ctrl_shortcuts_map_to_commands() {
        let mut state = ViewState::default();
        let cases = [
            ('g', UserCommand::SubmitJobDescription),
            ('l', UserCommand::ToggleLock),
            ('s', UserCommand::SubmitSubquestions),
            ('r', UserCommand::RetrieveResumes),
            ('t', UserCommand::Retry),
        ];
        for (c, expected) in cases {
            assert_eq!(handle_key(ctrl_key(c), &mut state), Some(expected), "Ctrl+{c}");
        }
    }

    #[test]
    fn esc_clears_error() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), Some(UserCommand::ClearError));
    }

    #[test]
    fn unknown_ctrl_and_alt_keys_do_nothing() {
        let mut state = ViewState::default();
        assert!(handle_key(ctrl_key('z'), &mut state).is_none());
        let mut alt = key(KeyCode::Char('x'));
        alt.modifiers = KeyModifiers::ALT;
        assert!(handle_key(alt, &mut state).is_none());
    }

    // -- Focus and scroll --

    #[test]
    fn tab_cycles_focus() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::JobDescription);
        handle_key(key(KeyCode::BackTab), &mut state);
        assert_eq!(state.focus, Focus::Input);
    }

    #[test]
    fn scrolling_moves_offset_and_stops_at_bottom() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::PageUp), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.scroll_offset, PAGE_SIZE + 1);
        handle_key(key(KeyCode::PageDown), &mut state);
        handle_key(key(KeyCode::PageDown), &mut state);
        assert_eq!(state.scroll_offset, 0);
    }

    // -- Confirmation --

    #[test]
    fn quit_requires_confirmation() {
        let mut state = ViewState::default();
        assert!(handle_key(ctrl_key('q'), &mut state).is_none());
        assert_eq!(state.confirm, Some(ConfirmAction::Quit));

        // Other keys are swallowed while the dialog is open.
        assert!(handle_key(key(KeyCode::Char('a')), &mut state).is_none());
        assert_eq!(state.confirm, Some(ConfirmAction::Quit));

        assert_eq!(handle_key(key(KeyCode::Char('y')), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn clear_chat_confirmed_or_cancelled() {
        let mut state = ViewState::default();
        handle_key(ctrl_key('x'), &mut state);
        assert_eq!(handle_key(key(KeyCode::Char('n')), &mut state), None);
        assert!(state.confirm.is_none());

        handle_key(ctrl_key('x'), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char('Y')), &mut state),
            Some(UserCommand::ClearChat)
        );
        assert!(state.confirm.is_none());
    }

    #[test]
    fn esc_cancels_dialog_without_clearing_error() {
        let mut state = ViewState::default();
        state.confirm = Some(ConfirmAction::Quit);
        assert!(handle_key(key(KeyCode::Esc), &mut state).is_none());
        assert!(state.confirm.is_none());
    }
}
