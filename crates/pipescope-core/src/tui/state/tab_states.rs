//! Per-tab state: table tabs wrap a [`TableController`], the map tab holds
//! zoom and status filters.

use std::collections::BTreeSet;

use ratatui::widgets::TableState as RatatuiTableState;

use crate::cluster::ZoomRadiusTable;
use crate::models::{Device, DeviceStatus, MapMarker, ValveOperation, map_markers};
use crate::table::{FieldAccessor, TableController, TableError};
use crate::tui::navigable::{NavigableTable, resolve_index};

/// Page size change per `+`/`-` press.
pub const PAGE_SIZE_STEP: usize = 5;
/// Deepest zoom the map tab allows.
pub const MAX_ZOOM: u8 = 22;

/// State of one record table tab.
#[derive(Debug)]
pub struct TableTabState<R: FieldAccessor> {
    /// Records of the active survey before the text filter.
    all: Vec<R>,
    pub controller: TableController<R>,
    pub filter: Option<String>,
    /// Selected row within the current page.
    pub selected: usize,
    /// Row id of the selection, kept across re-sorts and reloads.
    pub tracked_id: Option<u64>,
    pub ratatui_state: RatatuiTableState,
}

impl<R: FieldAccessor + Clone> TableTabState<R> {
    pub fn new(page_size: usize, sort_key: Option<R::Field>) -> Result<Self, TableError> {
        Ok(Self {
            all: Vec::new(),
            controller: TableController::new(Vec::new(), page_size, sort_key)?,
            filter: None,
            selected: 0,
            tracked_id: None,
            ratatui_state: RatatuiTableState::default(),
        })
    }

    /// Replaces the records, keeping filter, sort and page (clamped).
    pub fn set_data(&mut self, records: Vec<R>) {
        self.all = records;
        self.apply_filter();
    }

    pub fn all(&self) -> &[R] {
        &self.all
    }

    /// Changing the filter returns to the first page.
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
        self.controller.first_page();
        self.reset_selection();
    }

    fn apply_filter(&mut self) {
        let filtered: Vec<R> = match &self.filter {
            Some(f) => self
                .all
                .iter()
                .filter(|r| r.matches_filter(f))
                .cloned()
                .collect(),
            None => self.all.clone(),
        };
        self.controller.set_records(filtered);
    }

    /// Sorts by the column after the current sort key (wrapping), ascending.
    pub fn cycle_sort(&mut self) {
        let columns = self.controller.columns();
        if columns.is_empty() {
            return;
        }
        let next = match self
            .controller
            .sort_key()
            .and_then(|key| columns.iter().position(|c| c == key))
        {
            Some(i) => columns[(i + 1) % columns.len()].clone(),
            None => columns[0].clone(),
        };
        self.controller.set_sort_key(next);
    }

    /// Re-applies the current key, which flips the direction.
    pub fn toggle_sort_direction(&mut self) {
        match self.controller.sort_key().cloned() {
            Some(key) => self.controller.set_sort_key(key),
            None => self.cycle_sort(),
        }
    }

    pub fn next_page(&mut self) {
        self.controller.next_page();
        self.reset_selection();
    }

    pub fn previous_page(&mut self) {
        self.controller.previous_page();
        self.reset_selection();
    }

    pub fn first_page(&mut self) {
        self.controller.first_page();
        self.reset_selection();
    }

    pub fn last_page(&mut self) {
        self.controller.last_page();
        self.reset_selection();
    }

    pub fn grow_page(&mut self) -> Result<(), TableError> {
        self.controller
            .set_page_size(self.controller.page_size().saturating_add(PAGE_SIZE_STEP))
    }

    pub fn shrink_page(&mut self) -> Result<(), TableError> {
        let size = self
            .controller
            .page_size()
            .saturating_sub(PAGE_SIZE_STEP)
            .max(1);
        self.controller.set_page_size(size)
    }

    /// Points the selection at the tracked row if it is on this page.
    pub fn resolve_selection(&mut self, row_ids: &[u64]) {
        let idx = resolve_index(row_ids, self.tracked_id, self.selected);
        if let Some(i) = idx {
            self.selected = i;
            self.tracked_id = row_ids.get(i).copied();
        }
        self.ratatui_state.select(idx);
    }

    fn reset_selection(&mut self) {
        self.selected = 0;
        self.tracked_id = None;
    }
}

impl<R: FieldAccessor> NavigableTable for TableTabState<R> {
    fn selected(&self) -> usize {
        self.selected
    }

    fn selected_mut(&mut self) -> &mut usize {
        &mut self.selected
    }

    fn clear_tracked(&mut self) {
        self.tracked_id = None;
    }

    fn visible_rows(&self) -> usize {
        self.controller.sorted_and_paginated_view().len()
    }
}

/// Map tab: zoom level, radius table, per-status visibility of devices and
/// whether valve operations are placed too.
#[derive(Debug)]
pub struct MapTabState {
    pub zoom: u8,
    pub radius_table: ZoomRadiusTable,
    pub hidden: BTreeSet<DeviceStatus>,
    pub show_valves: bool,
    pub selected: usize,
    /// Cluster rows rendered last frame.
    pub row_count: usize,
    pub ratatui_state: RatatuiTableState,
}

impl MapTabState {
    pub fn new(zoom: u8, radius_table: ZoomRadiusTable) -> Self {
        Self {
            zoom: zoom.min(MAX_ZOOM),
            radius_table,
            hidden: BTreeSet::new(),
            show_valves: true,
            selected: 0,
            row_count: 0,
            ratatui_state: RatatuiTableState::default(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius_table.radius_for(self.zoom)
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1);
    }

    pub fn toggle_status(&mut self, status: DeviceStatus) {
        if !self.hidden.remove(&status) {
            self.hidden.insert(status);
        }
    }

    pub fn is_visible(&self, status: DeviceStatus) -> bool {
        !self.hidden.contains(&status)
    }

    /// Devices whose status is not hidden, in input order.
    pub fn visible<'a>(&self, devices: &'a [Device]) -> Vec<&'a Device> {
        devices
            .iter()
            .filter(|d| self.is_visible(d.status))
            .collect()
    }

    pub fn toggle_valves(&mut self) {
        self.show_valves = !self.show_valves;
    }

    /// Visible devices, then valve operations when shown.
    pub fn markers<'a>(
        &self,
        devices: &'a [Device],
        valves: &'a [ValveOperation],
    ) -> Vec<MapMarker<'a>> {
        let valves: &[ValveOperation] = if self.show_valves { valves } else { &[] };
        map_markers(self.visible(devices), valves)
    }

    pub fn resolve_selection(&mut self, rows: usize) {
        self.row_count = rows;
        if rows == 0 {
            self.ratatui_state.select(None);
            return;
        }
        self.selected = self.selected.min(rows - 1);
        self.ratatui_state.select(Some(self.selected));
    }
}

impl NavigableTable for MapTabState {
    fn selected(&self) -> usize {
        self.selected
    }

    fn selected_mut(&mut self) -> &mut usize {
        &mut self.selected
    }

    fn clear_tracked(&mut self) {}

    fn visible_rows(&self) -> usize {
        self.row_count
    }
}
