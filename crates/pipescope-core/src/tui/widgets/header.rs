//! Header widget showing time, survey and tabs.

use chrono::{Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::fmt::{FmtStyle, format_age, truncate};
use crate::tui::state::{AppState, InputMode, Tab};
use crate::tui::style::Styles;

pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::horizontal([
        Constraint::Length(21), // Time
        Constraint::Length(34), // Survey
        Constraint::Min(24),    // Tabs
        Constraint::Length(40), // Filter/status/source
    ])
    .split(area);

    let time = Local::now().format(" %Y-%m-%d %H:%M:%S").to_string();
    frame.render_widget(Paragraph::new(time).style(Styles::header()), chunks[0]);

    let survey = match (&state.survey, &state.survey_name) {
        (Some(id), Some(name)) => format!("{} {}", id, name),
        (Some(id), None) => id.to_string(),
        (None, _) => "all surveys".to_string(),
    };
    let survey = truncate(&survey, chunks[1].width.saturating_sub(1) as usize);
    frame.render_widget(Paragraph::new(survey).style(Styles::header()), chunks[1]);

    let tabs: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == state.current_tab {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            vec![
                Span::styled(format!(" {}:", i + 1), Styles::dim()),
                Span::styled(format!("{} ", tab.name()), style),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(Styles::header()),
        chunks[2],
    );

    let (right, style) = if let Some(msg) = &state.status_message {
        (msg.clone(), Styles::warning())
    } else {
        match state.input_mode {
            InputMode::Filter => (
                format!("Filter: {}█", state.filter_input),
                Styles::filter_input(),
            ),
            InputMode::Normal => match state.current_filter() {
                Some(filter) => (format!("/{}", filter), Styles::header()),
                None => (
                    format!(
                        "{} loaded {}",
                        state.source_name,
                        format_age(state.loaded_at, Utc::now(), FmtStyle::Compact)
                    ),
                    Styles::header(),
                ),
            },
        }
    };
    let right = truncate(&right, chunks[3].width as usize);
    frame.render_widget(Paragraph::new(right).style(style), chunks[3]);
}
