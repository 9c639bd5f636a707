//! Application state management.

mod app_state;
mod tab_states;

pub use app_state::*;
pub use tab_states::*;

/// Available tabs in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Devices,
    Valves,
    Assets,
    Map,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Devices, Tab::Valves, Tab::Assets, Tab::Map]
    }

    /// Returns the display name of the tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Devices => "DEV",
            Tab::Valves => "VLV",
            Tab::Assets => "AST",
            Tab::Map => "MAP",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Devices => Tab::Valves,
            Tab::Valves => Tab::Assets,
            Tab::Assets => Tab::Map,
            Tab::Map => Tab::Devices,
        }
    }

    pub fn prev(&self) -> Tab {
        match self {
            Tab::Devices => Tab::Map,
            Tab::Valves => Tab::Devices,
            Tab::Assets => Tab::Valves,
            Tab::Map => Tab::Assets,
        }
    }

    /// Tabs backed by a paginated record table.
    pub fn is_table(&self) -> bool {
        !matches!(self, Tab::Map)
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    None,
    /// Help popup with scroll offset.
    Help { scroll: usize },
    QuitConfirm,
}
