//! Color scheme and styles.
//!
//! Row colors follow device health: green for reporting, yellow for
//! attention (low battery, closed valves), red for faults, grey for offline.

use ratatui::style::{Color, Modifier, Style};

use crate::view::RowStyleClass;

pub struct Theme;

impl Theme {
    pub const TEXT: Color = Color::White;
    pub const MUTED: Color = Color::DarkGray;

    /// Header bar and table header background.
    pub const BAR: Color = Color::Blue;
    pub const CURSOR: Color = Color::DarkGray;

    pub const HEALTHY: Color = Color::Green;
    pub const ATTENTION: Color = Color::Yellow;
    pub const FAULT: Color = Color::Red;
    /// Multi-device clusters, sorted column, active tab.
    pub const HIGHLIGHT: Color = Color::Cyan;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    fn fg(color: Color) -> Style {
        Style::default().fg(color)
    }

    fn bold(color: Color) -> Style {
        Self::fg(color).add_modifier(Modifier::BOLD)
    }

    /// Default text style.
    pub fn default() -> Style {
        Self::fg(Theme::TEXT).bg(Color::Reset)
    }

    /// Top bar: clock, survey, tabs.
    pub fn header() -> Style {
        Self::bold(Theme::TEXT).bg(Theme::BAR)
    }

    pub fn table_header() -> Style {
        Self::header()
    }

    /// Column the table is sorted by.
    pub fn sorted_header() -> Style {
        Self::bold(Theme::HIGHLIGHT).bg(Theme::BAR)
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::CURSOR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Self::fg(Theme::ATTENTION)
    }

    pub fn tab_active() -> Style {
        Self::bold(Theme::HIGHLIGHT)
    }

    pub fn tab_inactive() -> Style {
        Self::dim()
    }

    pub fn dim() -> Style {
        Self::fg(Theme::MUTED)
    }

    pub fn filter_input() -> Style {
        Self::fg(Theme::TEXT).add_modifier(Modifier::UNDERLINED)
    }

    /// Key names in help and pager lines.
    pub fn help_key() -> Style {
        Self::bold(Theme::TEXT)
    }

    pub fn help() -> Style {
        Self::dim()
    }

    /// Maps a UI-agnostic [`RowStyleClass`] to a ratatui [`Style`].
    pub fn from_class(class: RowStyleClass) -> Style {
        match class {
            RowStyleClass::Normal => Self::default(),
            RowStyleClass::Active => Self::fg(Theme::HEALTHY),
            RowStyleClass::Warning => Self::warning(),
            RowStyleClass::Critical => Self::bold(Theme::FAULT),
            RowStyleClass::Dimmed => Self::dim(),
            RowStyleClass::Accent => Self::fg(Theme::HIGHLIGHT),
        }
    }
}
