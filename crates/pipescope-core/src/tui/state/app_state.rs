//! Main application state.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cluster::ZoomRadiusTable;
use crate::models::{Device, DeviceField, DynamicRecord, ValveField, ValveOperation};
use crate::provider::RecordProvider;
use crate::survey::SurveyId;
use crate::table::TableError;

use super::{InputMode, MapTabState, PopupState, Tab, TableTabState};

/// Startup settings for the TUI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub page_size: usize,
    pub device_sort: Option<DeviceField>,
    pub zoom: u8,
    pub radius_table: ZoomRadiusTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            device_sort: None,
            zoom: 12,
            radius_table: ZoomRadiusTable::default(),
        }
    }
}

/// Main application state.
#[derive(Debug)]
pub struct AppState {
    pub current_tab: Tab,
    pub input_mode: InputMode,
    /// Filter input buffer.
    pub filter_input: String,
    pub popup: PopupState,
    /// Temporary message shown in the header (errors, survey changes).
    pub status_message: Option<String>,
    /// Active survey; `None` shows every record.
    pub survey: Option<SurveyId>,
    pub survey_name: Option<String>,
    pub source_name: String,
    /// When the records were last pulled from the provider.
    pub loaded_at: Option<DateTime<Utc>>,
    pub devices: TableTabState<Device>,
    pub valves: TableTabState<ValveOperation>,
    pub assets: TableTabState<DynamicRecord>,
    pub map: MapTabState,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, TableError> {
        Ok(Self {
            current_tab: Tab::Devices,
            input_mode: InputMode::Normal,
            filter_input: String::new(),
            popup: PopupState::None,
            status_message: None,
            survey: None,
            survey_name: None,
            source_name: String::new(),
            loaded_at: None,
            devices: TableTabState::new(config.page_size, config.device_sort)?,
            valves: TableTabState::new(config.page_size, Some(ValveField::PerformedAt))?,
            assets: TableTabState::new(config.page_size, None)?,
            map: MapTabState::new(config.zoom, config.radius_table.clone()),
        })
    }

    /// Refreshes every tab from `provider` for the active survey.
    pub fn load(&mut self, provider: &dyn RecordProvider) {
        let survey = self.survey.as_ref();
        self.devices.set_data(provider.devices(survey));
        self.valves.set_data(provider.valve_operations(survey));
        self.assets.set_data(provider.assets(survey));
        self.survey_name = survey.and_then(|id| {
            provider
                .surveys()
                .into_iter()
                .find(|s| &s.id == id)
                .map(|s| s.name)
        });
        self.source_name = provider.source_name();
        self.loaded_at = Some(Utc::now());
        debug!(
            "Loaded survey {:?}: {} devices, {} valve operations, {} assets",
            self.survey,
            self.devices.all().len(),
            self.valves.all().len(),
            self.assets.all().len()
        );
    }

    /// Switches the active survey and reloads all tabs from page 1.
    pub fn set_survey(&mut self, survey: Option<SurveyId>, provider: &dyn RecordProvider) {
        self.survey = survey;
        self.load(provider);
        self.devices.first_page();
        self.valves.first_page();
        self.assets.first_page();
        self.map.selected = 0;
    }

    /// Returns the filter string for the current tab.
    pub fn current_filter(&self) -> Option<String> {
        match self.current_tab {
            Tab::Devices => self.devices.filter.clone(),
            Tab::Valves => self.valves.filter.clone(),
            Tab::Assets => self.assets.filter.clone(),
            Tab::Map => None,
        }
    }

    /// Applies `filter` to the current table tab.
    pub fn set_current_filter(&mut self, filter: Option<String>) {
        match self.current_tab {
            Tab::Devices => self.devices.set_filter(filter),
            Tab::Valves => self.valves.set_filter(filter),
            Tab::Assets => self.assets.set_filter(filter),
            Tab::Map => {}
        }
    }

    /// Switches tab and syncs the filter input buffer from the new tab.
    pub fn switch_tab(&mut self, new_tab: Tab) {
        if self.current_tab != new_tab {
            self.current_tab = new_tab;
            self.filter_input = self.current_filter().unwrap_or_default();
        }
    }
}
