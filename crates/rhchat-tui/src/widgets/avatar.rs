// Avatar badge: a colored block of initials shown beside each message.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use rhchat_core::protocol::Sender;

pub const USER_COLOR: Color = Color::Rgb(0x54, 0x37, 0xDB);
pub const BOT_COLOR: Color = Color::Rgb(0x11, 0xA2, 0x7F);

pub const USER_NAME: &str = "You";
pub const BOT_NAME: &str = "AI Assistant";

/// Shown when there is no name to take initials from.
const PLACEHOLDER: &str = "?";

/// Background color and display name for a message author.
pub fn for_sender(sender: Sender) -> (Color, &'static str) {
    match sender {
        Sender::User => (USER_COLOR, USER_NAME),
        Sender::Bot => (BOT_COLOR, BOT_NAME),
    }
}

/// Up to two uppercase initials, one per whitespace-separated word.
pub fn initials(name: Option<&str>) -> String {
    let initials: String = name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if initials.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        initials
    }
}

/// The badge as an inline span `width` cells wide with the initials centered.
pub fn badge(bg: Color, name: Option<&str>, width: u16) -> Span<'static> {
    let text = initials(name);
    let used = Span::raw(text.as_str()).width();
    let pad = usize::from(width).saturating_sub(used);
    let left = pad / 2;
    Span::styled(
        format!("{}{text}{}", " ".repeat(left), " ".repeat(pad - left)),
        badge_style(bg),
    )
}

/// Render the badge filling `area`, initials centered on the middle row.
pub fn render(frame: &mut Frame, area: Rect, bg: Color, name: Option<&str>) {
    let pad = usize::from(area.height.saturating_sub(1) / 2);
    let mut text = "\n".repeat(pad);
    text.push_str(&initials(name));
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(badge_style(bg));
    frame.render_widget(paragraph, area);
}

fn badge_style(bg: Color) -> Style {
    Style::default()
        .fg(Color::White)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
