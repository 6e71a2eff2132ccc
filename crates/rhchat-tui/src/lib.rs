// Terminal front end: layout, input handling, and widget rendering.
//
// The view owns a `ViewState` holding the latest session snapshot plus
// view-local state (focus, scroll, confirmation dialog, animation). The
// session loop pushes `UiUpdate`s over an mpsc channel; the view applies
// them and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, warn};

use rhchat_core::config::Config;
use rhchat_core::protocol::{SessionSnapshot, TextField, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which text buffer receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    JobDescription,
    Subquestions,
    #[default]
    Input,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::JobDescription => Focus::Subquestions,
            Focus::Subquestions => Focus::Input,
            Focus::Input => Focus::JobDescription,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::JobDescription => Focus::Input,
            Focus::Subquestions => Focus::JobDescription,
            Focus::Input => Focus::Subquestions,
        }
    }

    pub fn field(self) -> TextField {
        match self {
            Focus::JobDescription => TextField::JobDescription,
            Focus::Subquestions => TextField::Subquestions,
            Focus::Input => TextField::Input,
        }
    }
}

/// Destructive actions that need a y/n confirmation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
    ClearChat,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Everything `render_frame` reads.
pub struct ViewState {
    /// Latest session state pushed by the session loop.
    pub snapshot: SessionSnapshot,
    pub app_name: String,
    pub app_version: String,
    pub max_message_length: usize,
    /// How long a reply must be pending before the typing indicator shows.
    pub typing_delay: Duration,
    pub focus: Focus,
    /// Transcript lines scrolled up from the bottom; 0 follows new messages.
    pub scroll_offset: usize,
    /// Pending confirmation dialog, if any.
    pub confirm: Option<ConfirmAction>,
    /// Render tick counter driving the spinner.
    pub tick: usize,
    /// When the current chat request was first seen in flight.
    pub loading_since: Option<Instant>,
    pub show_typing: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(&Config::default())
    }
}

impl ViewState {
    pub fn new(config: &Config) -> Self {
        ViewState {
            snapshot: SessionSnapshot::default(),
            app_name: config.app.name.clone(),
            app_version: config.app.version.clone(),
            max_message_length: config.chat.max_message_length,
            typing_delay: Duration::from_millis(config.chat.typing_indicator_delay_ms),
            focus: Focus::default(),
            scroll_offset: 0,
            confirm: None,
            tick: 0,
            loading_since: None,
            show_typing: false,
        }
    }

    /// Replace the mirrored session state. Jumps back to the newest message
    /// when the transcript grows or is cleared.
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot, now: Instant) {
        if snapshot.messages.len() != self.snapshot.messages.len() {
            self.scroll_offset = 0;
        }
        self.loading_since = match (snapshot.loading, self.loading_since) {
            (true, Some(since)) => Some(since),
            (true, None) => Some(now),
            (false, _) => None,
        };
        self.snapshot = snapshot;
        self.refresh_typing(now);
    }

    /// Advance the animation and re-evaluate the typing indicator.
    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.refresh_typing(now);
    }

    fn refresh_typing(&mut self, now: Instant) {
        self.show_typing = self
            .loading_since
            .is_some_and(|since| now.duration_since(since) >= self.typing_delay);
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot, Instant::now()),
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Render the complete screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.snapshot.error.is_some());

    widgets::header::render(frame, layout.header, state);
    widgets::side_panel::render(frame, &layout, state);
    widgets::chat_log::render(frame, layout.chat_log, state);
    if let Some(error) = &state.snapshot.error {
        widgets::error_banner::render(frame, layout.error_banner, &error.message, error.retry.as_ref());
    }
    widgets::input_bar::render(frame, layout.input, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(action) = state.confirm {
        widgets::confirm::render(frame, frame.area(), action);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the terminal UI until the user quits or the session loop goes away.
///
/// Enters raw mode and the alternate screen, installs a panic hook that
/// restores the terminal, then selects over snapshots, key events and the
/// render tick.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(config);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("TUI started");

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => apply_ui_update(&mut view_state, update),
                    None => {
                        info!("UI channel closed, leaving TUI");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break Err(e.into());
                    }
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                view_state.on_tick(Instant::now());
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(e.into());
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rhchat_core::protocol::{ErrorBanner, Message, Phase, RetryAction};

    fn snapshot_with_messages(n: usize) -> SessionSnapshot {
        SessionSnapshot {
            messages: (0..n).map(|i| Message::user(format!("m{i}"))).collect(),
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn view_state_takes_names_and_limits_from_config() {
        let mut config = Config::default();
        config.app.name = "Talent Desk".into();
        config.chat.max_message_length = 200;
        let state = ViewState::new(&config);
        assert_eq!(state.app_name, "Talent Desk");
        assert_eq!(state.app_version, "1.0.0");
        assert_eq!(state.max_message_length, 200);
        assert_eq!(state.typing_delay, Duration::from_millis(1000));
        assert_eq!(state.focus, Focus::Input);
        assert!(state.confirm.is_none());
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut focus = Focus::JobDescription;
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::JobDescription);
        assert_eq!(Focus::JobDescription.prev(), Focus::Input);
        assert_eq!(Focus::Subquestions.field(), TextField::Subquestions);
    }

    #[test]
    fn new_message_resets_scroll() {
        let now = Instant::now();
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot_with_messages(1), now);
        state.scroll_offset = 5;

        state.apply_snapshot(snapshot_with_messages(1), now);
        assert_eq!(state.scroll_offset, 5);
        state.apply_snapshot(snapshot_with_messages(2), now);
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn typing_indicator_waits_for_delay() {
        let start = Instant::now();
        let mut state = ViewState::default();
        state.apply_snapshot(
            SessionSnapshot {
                loading: true,
                ..SessionSnapshot::default()
            },
            start,
        );
        assert_eq!(state.loading_since, Some(start));
        assert!(!state.show_typing);

        state.on_tick(start + Duration::from_millis(500));
        assert!(!state.show_typing);
        state.on_tick(start + Duration::from_millis(1000));
        assert!(state.show_typing);

        state.apply_snapshot(SessionSnapshot::default(), start + Duration::from_secs(2));
        assert!(state.loading_since.is_none());
        assert!(!state.show_typing);
    }

    #[test]
    fn loading_start_is_kept_across_snapshots() {
        let start = Instant::now();
        let mut state = ViewState::default();
        let loading = SessionSnapshot {
            loading: true,
            ..SessionSnapshot::default()
        };
        state.apply_snapshot(loading.clone(), start);
        state.apply_snapshot(loading, start + Duration::from_millis(300));
        assert_eq!(state.loading_since, Some(start));
    }

    #[test]
    fn apply_ui_update_replaces_snapshot() {
        let mut state = ViewState::default();
        let snapshot = SessionSnapshot {
            phase: Phase::Chatting,
            history_len: 3,
            ..SessionSnapshot::default()
        };
        apply_ui_update(&mut state, UiUpdate::Snapshot(Box::new(snapshot)));
        assert_eq!(state.snapshot.phase, Phase::Chatting);
        assert_eq!(state.snapshot.history_len, 3);
    }

    #[test]
    fn render_frame_does_not_panic_in_any_mode() {
        let backend = ratatui::backend::TestBackend::new(120, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        state.snapshot = SessionSnapshot {
            messages: vec![Message::user("Who fits?"), Message::bot("Resume A.")],
            error: Some(ErrorBanner {
                message: "API Error: 500 - boom".into(),
                retry: Some(RetryAction::SendChat("Who fits?".into())),
            }),
            ..SessionSnapshot::default()
        };
        state.confirm = Some(ConfirmAction::Quit);
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[test]
    fn render_frame_survives_tiny_terminal() {
        let backend = ratatui::backend::TestBackend::new(10, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}
