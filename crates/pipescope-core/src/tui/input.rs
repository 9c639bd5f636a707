//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::DeviceStatus;
use crate::table::{FieldAccessor, TableError};

use super::navigable::NavigableTable;
use super::state::{AppState, InputMode, PopupState, Tab, TableTabState};

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    /// Re-read the record source.
    Reload,
}

enum NavAction {
    Up,
    Down,
    First,
    Last,
}

fn dispatch_navigation(state: &mut AppState, action: NavAction) {
    if let PopupState::Help { scroll } = &mut state.popup {
        match action {
            NavAction::Up => *scroll = scroll.saturating_sub(1),
            NavAction::Down => *scroll = scroll.saturating_add(1),
            NavAction::First => *scroll = 0,
            NavAction::Last => {}
        }
        return;
    }
    let nav: &mut dyn NavigableTable = match state.current_tab {
        Tab::Devices => &mut state.devices,
        Tab::Valves => &mut state.valves,
        Tab::Assets => &mut state.assets,
        Tab::Map => &mut state.map,
    };
    match action {
        NavAction::Up => nav.select_up(),
        NavAction::Down => nav.select_down(),
        NavAction::First => nav.select_first(),
        NavAction::Last => nav.select_last(),
    }
}

/// Page operations on the current table tab.
enum PageAction {
    Next,
    Previous,
    First,
    Last,
    Grow,
    Shrink,
    CycleSort,
    ToggleDirection,
}

fn apply_page<R: FieldAccessor + Clone>(
    tab: &mut TableTabState<R>,
    action: PageAction,
) -> Result<(), TableError> {
    match action {
        PageAction::Next => tab.next_page(),
        PageAction::Previous => tab.previous_page(),
        PageAction::First => tab.first_page(),
        PageAction::Last => tab.last_page(),
        PageAction::Grow => return tab.grow_page(),
        PageAction::Shrink => return tab.shrink_page(),
        PageAction::CycleSort => tab.cycle_sort(),
        PageAction::ToggleDirection => tab.toggle_sort_direction(),
    }
    Ok(())
}

fn dispatch_page(state: &mut AppState, action: PageAction) {
    let result = match state.current_tab {
        Tab::Devices => apply_page(&mut state.devices, action),
        Tab::Valves => apply_page(&mut state.valves, action),
        Tab::Assets => apply_page(&mut state.assets, action),
        Tab::Map => {
            match action {
                PageAction::Grow => state.map.zoom_in(),
                PageAction::Shrink => state.map.zoom_out(),
                _ => {}
            }
            Ok(())
        }
    };
    if let Err(e) = result {
        state.status_message = Some(e.to_string());
    }
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if matches!(state.popup, PopupState::QuitConfirm) {
        return handle_quit_confirm(state, key);
    }
    if matches!(state.popup, PopupState::Help { .. }) {
        return handle_help(state, key);
    }
    match state.input_mode {
        InputMode::Normal => handle_normal_mode(state, key),
        InputMode::Filter => handle_filter_mode(state, key),
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
            state.popup = PopupState::None;
        }
        KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
        KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
        KeyCode::Home => dispatch_navigation(state, NavAction::First),
        _ => {}
    }
    KeyAction::None
}

fn handle_normal_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    // Any key dismisses a pending status message.
    state.status_message = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::QuitConfirm;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }

        KeyCode::Tab => state.switch_tab(state.current_tab.next()),
        KeyCode::BackTab => state.switch_tab(state.current_tab.prev()),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            if let Some(&tab) = Tab::all().get(idx) {
                state.switch_tab(tab);
            }
        }

        KeyCode::Char('?') => state.popup = PopupState::Help { scroll: 0 },
        KeyCode::Char('R') => return KeyAction::Reload,

        KeyCode::Up | KeyCode::Char('k') => dispatch_navigation(state, NavAction::Up),
        KeyCode::Down | KeyCode::Char('j') => dispatch_navigation(state, NavAction::Down),
        KeyCode::Home => dispatch_navigation(state, NavAction::First),
        KeyCode::End => dispatch_navigation(state, NavAction::Last),

        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            dispatch_page(state, PageAction::Next)
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            dispatch_page(state, PageAction::Previous)
        }
        KeyCode::Char('g') => dispatch_page(state, PageAction::First),
        KeyCode::Char('G') => dispatch_page(state, PageAction::Last),
        KeyCode::Char('+') | KeyCode::Char('=') => dispatch_page(state, PageAction::Grow),
        KeyCode::Char('-') => dispatch_page(state, PageAction::Shrink),
        KeyCode::Char('s') => dispatch_page(state, PageAction::CycleSort),
        KeyCode::Char('r') => dispatch_page(state, PageAction::ToggleDirection),

        KeyCode::Char(c @ ('a' | 'i' | 'f' | 'o')) if state.current_tab == Tab::Map => {
            let status = match c {
                'a' => DeviceStatus::Active,
                'i' => DeviceStatus::Idle,
                'f' => DeviceStatus::Fault,
                _ => DeviceStatus::Offline,
            };
            state.map.toggle_status(status);
        }
        KeyCode::Char('v') if state.current_tab == Tab::Map => state.map.toggle_valves(),

        KeyCode::Char('/') => {
            if state.current_tab.is_table() {
                state.input_mode = InputMode::Filter;
                state.filter_input = state.current_filter().unwrap_or_default();
            } else {
                state.status_message = Some("Filter is not available on MAP".to_string());
            }
        }
        KeyCode::Esc => {
            if state.current_filter().is_some() {
                state.filter_input.clear();
                state.set_current_filter(None);
            }
        }
        _ => {}
    }
    KeyAction::None
}

fn handle_filter_mode(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
            state.filter_input.clear();
            state.set_current_filter(None);
        }
        KeyCode::Enter => {
            // Already applied while typing.
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            state.filter_input.pop();
            apply_current_filter(state);
        }
        KeyCode::Char(c) => {
            state.filter_input.push(c);
            apply_current_filter(state);
        }
        _ => {}
    }
    KeyAction::None
}

fn apply_current_filter(state: &mut AppState) {
    let filter = if state.filter_input.is_empty() {
        None
    } else {
        Some(state.filter_input.clone())
    };
    state.set_current_filter(filter);
}
