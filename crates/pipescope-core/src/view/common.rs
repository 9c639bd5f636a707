//! UI-agnostic view model types.
//!
//! These types represent presentation data without any dependency on a specific
//! rendering framework. The TUI maps them to ratatui styles.

use crate::models::{
    Device, DeviceStatus, DynamicRecord, Located, MapMarker, ValveAction, ValveOperation,
};
use crate::table::PageInfo;

/// Row-level style classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowStyleClass {
    #[default]
    Normal,
    /// Warning level (TUI: yellow). E.g. low battery.
    Warning,
    /// Critical level (TUI: red). E.g. device fault.
    Critical,
    /// Positive/active (TUI: green).
    Active,
    /// Dimmed (TUI: dark gray). E.g. offline devices.
    Dimmed,
    /// Accent (TUI: cyan). E.g. multi-member clusters.
    Accent,
}

impl RowStyleClass {
    /// Attention ranking used when several rows collapse into one.
    pub fn severity(self) -> u8 {
        match self {
            RowStyleClass::Critical => 4,
            RowStyleClass::Warning => 3,
            RowStyleClass::Active => 2,
            RowStyleClass::Normal | RowStyleClass::Accent => 1,
            RowStyleClass::Dimmed => 0,
        }
    }
}

/// Row style of a record.
pub trait StyledRow {
    fn row_style(&self) -> RowStyleClass {
        RowStyleClass::Normal
    }
}

impl StyledRow for Device {
    fn row_style(&self) -> RowStyleClass {
        match self.status {
            DeviceStatus::Fault => RowStyleClass::Critical,
            DeviceStatus::Offline => RowStyleClass::Dimmed,
            _ if self.is_low_battery() => RowStyleClass::Warning,
            DeviceStatus::Active => RowStyleClass::Active,
            DeviceStatus::Idle => RowStyleClass::Normal,
        }
    }
}

impl StyledRow for ValveOperation {
    fn row_style(&self) -> RowStyleClass {
        match self.action {
            ValveAction::Close => RowStyleClass::Warning,
            ValveAction::Open | ValveAction::Throttle => RowStyleClass::Normal,
        }
    }
}

impl StyledRow for DynamicRecord {}

impl StyledRow for MapMarker<'_> {
    fn row_style(&self) -> RowStyleClass {
        match self {
            MapMarker::Device(d) => d.row_style(),
            MapMarker::Valve(v) => v.row_style(),
        }
    }
}

impl<T: StyledRow> StyledRow for Located<'_, T> {
    fn row_style(&self) -> RowStyleClass {
        self.record.row_style()
    }
}

impl<T: StyledRow + ?Sized> StyledRow for &T {
    fn row_style(&self) -> RowStyleClass {
        (**self).row_style()
    }
}

/// A single table cell; it inherits the row style.
#[derive(Debug, Clone, Default)]
pub struct ViewCell {
    pub text: String,
}

impl ViewCell {
    pub fn plain(text: String) -> Self {
        Self { text }
    }
}

/// One table row, parameterized by entity ID type.
#[derive(Debug, Clone)]
pub struct ViewRow<Id> {
    pub id: Id,
    pub cells: Vec<ViewCell>,
    pub style: RowStyleClass,
}

/// Current page of a table, ready to be rendered by any frontend.
#[derive(Debug, Clone)]
pub struct TableViewModel<Id> {
    pub title: String,
    pub headers: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<ViewRow<Id>>,
    /// Index into `headers`, `None` when unsorted.
    pub sort_column: Option<usize>,
    pub sort_ascending: bool,
    pub page: PageInfo,
}
