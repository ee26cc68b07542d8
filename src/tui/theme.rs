//! Centralized theme and styling constants.

use ratatui::style::{Color, Modifier, Style};

/// Theme constants for consistent styling across the viewer.
pub struct Theme;

impl Theme {
    // Base text colors
    pub const DIM: Style = Style::new().fg(Color::DarkGray);
    pub const NORMAL: Style = Style::new().fg(Color::White);
    pub const ERROR: Style = Style::new().fg(Color::Red);

    // UI chrome colors
    pub const BORDER: Color = Color::DarkGray;
    pub const TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    pub const KEY_HINT: Style = Style::new().fg(Color::Yellow);

    // Tree rendering
    pub const POST: Color = Color::Rgb(230, 190, 90);
    pub const BEST_PATH: Color = Color::Rgb(120, 220, 140);
    pub const NEGATIVE: Color = Color::Rgb(200, 110, 110);
    pub const SELECTED: Color = Color::White;
    pub const EDGE: Color = Color::DarkGray;
    pub const INDEX_LABEL: Style = Style::new().fg(Color::Gray);

    // Vote display
    pub const UPVOTE: Style = Style::new().fg(Color::Green);
    pub const DOWNVOTE: Style = Style::new().fg(Color::Red);

    /// Node color for an ordinary comment at `level`.
    #[must_use]
    pub const fn level_color(level: i32) -> Color {
        match level.rem_euclid(4) {
            0 => Color::Rgb(110, 160, 230),
            1 => Color::Rgb(170, 130, 220),
            2 => Color::Rgb(90, 190, 200),
            _ => Color::Rgb(200, 160, 120),
        }
    }
}
