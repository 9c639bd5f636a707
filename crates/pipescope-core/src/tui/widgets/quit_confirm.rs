//! Quit confirmation popup widget.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::style::{Styles, Theme};

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let width = (area.width / 2).clamp(36, 56).min(area.width);
    let height = 6.min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Exit pipescope ")
        .borders(Borders::ALL)
        .border_style(Styles::default().fg(Theme::HIGHLIGHT));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let keys = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(key, Styles::warning()),
            Span::styled(what, Styles::dim()),
        ])
    };
    let content = vec![
        Line::from("Leave the dashboard?"),
        Line::from(""),
        keys("Enter/q", " quit   "),
        keys("Esc/n", " stay"),
    ];
    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center),
        inner,
    );
}
