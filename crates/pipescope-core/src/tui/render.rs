//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use super::state::{AppState, PopupState, Tab};
use super::widgets::{
    render_clusters, render_header, render_help, render_map_footer, render_pager,
    render_quit_confirm, render_record_table,
};

pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(5),    // Content
        Constraint::Length(1), // Pager / map controls
    ])
    .split(area);

    render_header(frame, chunks[0], state);
    render_content(frame, chunks[1], state);
    render_footer(frame, chunks[2], state);

    // Popups are drawn last to overlay everything.
    let tab = state.current_tab;
    match &mut state.popup {
        PopupState::Help { scroll } => render_help(frame, area, tab, scroll),
        PopupState::QuitConfirm => render_quit_confirm(frame, area),
        PopupState::None => {}
    }
}

fn render_content(frame: &mut Frame, area: Rect, state: &mut AppState) {
    match state.current_tab {
        Tab::Devices => render_record_table(frame, area, &mut state.devices, "DEV: Devices"),
        Tab::Valves => {
            render_record_table(frame, area, &mut state.valves, "VLV: Valve operations")
        }
        Tab::Assets => render_record_table(frame, area, &mut state.assets, "AST: Assets"),
        Tab::Map => render_clusters(frame, area, state),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.current_tab {
        Tab::Devices => render_pager(frame, area, state.devices.controller.page_info()),
        Tab::Valves => render_pager(frame, area, state.valves.controller.page_info()),
        Tab::Assets => render_pager(frame, area, state.assets.controller.page_info()),
        Tab::Map => render_map_footer(frame, area, state),
    }
}
