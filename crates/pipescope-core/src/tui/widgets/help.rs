//! Help popup with per-tab key bindings.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::state::Tab;
use crate::tui::style::{Styles, Theme};

const GENERAL: &[(&str, &str)] = &[
    ("Tab / 1-4", "switch tab (DEV, VLV, AST, MAP)"),
    ("Up/Down j/k", "select row"),
    ("Home/End", "first/last row on screen"),
    ("R", "reload records from the source"),
    ("?", "toggle this help"),
    ("q", "quit (asks for confirmation)"),
];

const TABLE: &[(&str, &str)] = &[
    ("n / Right", "next page"),
    ("p / Left", "previous page"),
    ("g / G", "first / last page"),
    ("s", "sort by the next column (ascending)"),
    ("r", "reverse the sort direction"),
    ("+ / -", "grow / shrink the page size"),
    ("/", "filter rows by text, Enter keeps, Esc clears"),
];

const MAP: &[(&str, &str)] = &[
    ("+ / -", "zoom in / out (smaller / larger cluster radius)"),
    ("a i f o", "show/hide active, idle, fault, offline devices"),
    ("v", "show/hide valve operations"),
];

fn section(title: &str, keys: &[(&str, &str)], lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Styles::help_key().fg(Theme::ATTENTION),
    )));
    for (key, what) in keys {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", key), Styles::help_key()),
            Span::raw(what.to_string()),
        ]));
    }
    lines.push(Line::from(""));
}

/// Title and body of the help popup for `tab`.
pub(crate) fn help_content(tab: Tab) -> (String, Vec<Line<'static>>) {
    let mut lines = Vec::new();
    match tab {
        Tab::Map => {
            section("Map", MAP, &mut lines);
            lines.push(Line::from(
                "Devices within the zoom radius of a seed device are grouped; \
                 the label is the member count, or the device id for a single marker.",
            ));
            lines.push(Line::from(""));
        }
        _ => section("Table", TABLE, &mut lines),
    }
    section("General", GENERAL, &mut lines);
    (format!("Help: {}", tab.name()), lines)
}

/// Renders the help popup centered on screen with scroll support.
pub fn render_help(frame: &mut Frame, area: Rect, tab: Tab, scroll: &mut usize) {
    let width = (area.width * 60 / 100).clamp(40, 80).min(area.width);
    let height = (area.height * 80 / 100).clamp(10, 30).min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, popup);

    let (title, content) = help_content(tab);
    let content_lines = content.len();

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Styles::default().fg(Theme::HIGHLIGHT));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

    let max_scroll = content_lines.saturating_sub(chunks[0].height as usize);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0));
    frame.render_widget(paragraph, chunks[0]);

    let footer = if max_scroll > 0 {
        format!(" Esc close  Up/Down scroll [{}/{}]", *scroll + 1, max_scroll + 1)
    } else {
        " Esc close".to_string()
    };
    frame.render_widget(Paragraph::new(footer).style(Styles::help()), chunks[1]);
}
