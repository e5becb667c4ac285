use ratatui::style::{Color, Modifier, Style};

/// Color theme for boardhand.
///
/// Text and chrome use the terminal's default foreground (Color::Reset).
/// Only focus, the agent badge, the context marker, and errors get color.
pub struct Theme;

impl Theme {
    pub const FG: Color = Color::Reset;
    pub const DIM: Color = Color::DarkGray;

    // Kanban
    pub const COLUMN_BORDER: Color = Color::DarkGray;
    pub const COLUMN_FOCUSED_BORDER: Color = Color::Cyan;
    pub const CONTEXT_MARKER: Color = Color::Magenta;

    // Panels
    pub const PANEL_BORDER: Color = Color::DarkGray;
    pub const PANEL_FOCUSED_BORDER: Color = Color::Cyan;

    // Header
    pub const APP_NAME: Color = Color::Cyan;
    pub const AGENT: Color = Color::Yellow;
    pub const STATUS_ERROR: Color = Color::Red;

    // Transcript speakers
    pub const WHO_USER: Color = Color::Green;
    pub const WHO_AGENT: Color = Color::Yellow;
    pub const WHO_SYSTEM: Color = Color::DarkGray;

    pub fn dim_style() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn bold() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    /// Reverse-video badge used for the prompt submode and the header title.
    pub fn badge() -> Style {
        Style::default()
            .fg(Self::FG)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(Self::PANEL_FOCUSED_BORDER)
        } else {
            Style::default().fg(Self::PANEL_BORDER)
        }
    }

    /// Color for the speaker column of a transcript entry.
    pub fn who_color(who: &str) -> Color {
        match who {
            "you" => Self::WHO_USER,
            "system" => Self::WHO_SYSTEM,
            w if w.ends_with(" error") => Self::STATUS_ERROR,
            _ => Self::WHO_AGENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_who_colors() {
        assert_eq!(Theme::who_color("you"), Theme::WHO_USER);
        assert_eq!(Theme::who_color("system"), Theme::WHO_SYSTEM);
        assert_eq!(Theme::who_color("codex error"), Theme::STATUS_ERROR);
        assert_eq!(Theme::who_color("claude"), Theme::WHO_AGENT);
    }

    #[test]
    fn test_border_focus() {
        assert_eq!(Theme::border(true).fg, Some(Theme::PANEL_FOCUSED_BORDER));
        assert_eq!(Theme::border(false).fg, Some(Theme::PANEL_BORDER));
    }
}
