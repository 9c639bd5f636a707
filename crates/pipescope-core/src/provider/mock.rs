//! Deterministic in-memory dataset for tests and `--demo`.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use super::{Dataset, ProviderError, RecordProvider};
use crate::models::{
    Device, DeviceKind, DeviceStatus, DynamicRecord, GeoPoint, Survey, ValveAction,
    ValveOperation,
};
use crate::models::DeviceKind::{GasDetector as Gas, GpsTracker as Gps, PressureLogger as Press};
use crate::models::DeviceStatus::{Active, Fault, Idle, Offline};
use crate::survey::SurveyId;

/// 2024-05-01T12:00:00Z, the "now" of the scenario.
const BASE_TS: i64 = 1_714_564_800;

pub const HARBOUR_SURVEY: &str = "S-2024-HBR";
pub const RIDGE_SURVEY: &str = "S-2024-RDG";

type DeviceRow = (
    &'static str,
    &'static str,
    DeviceKind,
    DeviceStatus,
    Option<u8>,
    Option<(f64, f64)>,
    i64,
);

// (id, name, kind, status, battery %, position, minutes since last report)
const HARBOUR_DEVICES: &[DeviceRow] = &[
    ("HBR-001", "Quay gate detector", Gas, Active, Some(92), Some((53.5450, 9.9660)), 1),
    ("HBR-002", "Quay gate logger", Press, Active, Some(81), Some((53.5452, 9.9663)), 2),
    ("HBR-003", "Quay east detector", Gas, Idle, Some(64), Some((53.5455, 9.9671)), 14),
    ("HBR-004", "Quay tracker", Gps, Active, Some(17), Some((53.5448, 9.9666)), 1),
    ("HBR-005", "Dock 4 logger", Press, Fault, Some(55), Some((53.5301, 10.0102)), 45),
    ("HBR-006", "Dock 4 detector", Gas, Active, Some(73), Some((53.5304, 10.0098)), 3),
    ("HBR-007", "Dock 4 tracker", Gps, Offline, None, Some((53.5299, 10.0107)), 380),
    ("HBR-008", "Bridge south detector", Gas, Active, Some(88), Some((53.5190, 9.9880)), 1),
    ("HBR-009", "Bridge north logger", Press, Idle, Some(12), Some((53.5240, 9.9905)), 22),
    ("HBR-010", "Tunnel mouth detector", Gas, Active, Some(99), Some((53.5410, 9.9510)), 0),
    ("HBR-011", "Spare detector", Gas, Offline, Some(100), None, 4_320),
    ("HBR-012", "Canal logger", Press, Active, Some(47), Some((53.5560, 10.0230)), 5),
    ("HBR-013", "Canal tracker", Gps, Fault, Some(8), Some((53.5562, 10.0236)), 90),
    ("HBR-014", "Yard detector", Gas, Active, Some(66), Some((53.5020, 9.9400)), 2),
];

const RIDGE_DEVICES: &[DeviceRow] = &[
    ("RDG-001", "Ridge crest detector", Gas, Active, Some(77), Some((47.4210, 10.9850)), 1),
    ("RDG-002", "Ridge crest logger", Press, Active, Some(71), Some((47.4213, 10.9856)), 1),
    ("RDG-003", "Valley tracker", Gps, Idle, Some(34), Some((47.3980, 11.0120)), 30),
    ("RDG-004", "Station logger", Press, Offline, None, None, 1_440),
];

// (id, survey, valve, action, operator, pressure, minutes ago, position)
type ValveRow = (
    &'static str,
    &'static str,
    &'static str,
    ValveAction,
    &'static str,
    Option<f64>,
    i64,
    Option<(f64, f64)>,
);

const VALVE_OPERATIONS: &[ValveRow] = &[
    ("OP-101", HARBOUR_SURVEY, "V-12", ValveAction::Close, "m.berger", Some(4.20), 180, Some((53.5451, 9.9658))),
    ("OP-102", HARBOUR_SURVEY, "V-12", ValveAction::Open, "m.berger", Some(3.95), 150, Some((53.5451, 9.9658))),
    ("OP-103", HARBOUR_SURVEY, "V-07", ValveAction::Throttle, "a.yilmaz", Some(2.10), 120, Some((53.5302, 10.0100))),
    ("OP-104", HARBOUR_SURVEY, "V-07", ValveAction::Close, "a.yilmaz", None, 95, Some((53.5302, 10.0100))),
    ("OP-105", HARBOUR_SURVEY, "V-31", ValveAction::Close, "", Some(5.05), 60, None),
    ("OP-106", HARBOUR_SURVEY, "V-31", ValveAction::Open, "j.okafor", Some(4.80), 20, None),
    ("OP-201", RIDGE_SURVEY, "V-02", ValveAction::Throttle, "l.moreau", Some(6.40), 240, Some((47.4211, 10.9853))),
    ("OP-202", RIDGE_SURVEY, "V-02", ValveAction::Open, "l.moreau", Some(6.10), 200, Some((47.4211, 10.9853))),
];

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_TS, 0).unwrap_or_default()
}

fn point(pos: Option<(f64, f64)>) -> Option<GeoPoint> {
    pos.and_then(|(lat, lng)| GeoPoint::new(lat, lng).ok())
}

fn devices(survey: &str, rows: &[DeviceRow]) -> Vec<Device> {
    let now = base_time();
    rows.iter()
        .map(
            |&(id, name, kind, status, battery_pct, pos, minutes_ago)| Device {
                id: id.to_string(),
                survey_id: SurveyId::new(survey),
                name: name.to_string(),
                kind,
                status,
                battery_pct,
                last_seen: Some(now - Duration::minutes(minutes_ago)),
                location: point(pos),
            },
        )
        .collect()
}

fn valve_operations() -> Vec<ValveOperation> {
    let now = base_time();
    VALVE_OPERATIONS
        .iter()
        .map(
            |&(id, survey, valve, action, operator, pressure_bar, minutes_ago, pos)| {
                ValveOperation {
                    id: id.to_string(),
                    survey_id: SurveyId::new(survey),
                    valve_id: valve.to_string(),
                    action,
                    operator: operator.to_string(),
                    pressure_bar,
                    performed_at: now - Duration::minutes(minutes_ago),
                    location: point(pos),
                }
            },
        )
        .collect()
}

fn assets() -> Vec<DynamicRecord> {
    let rows = json!([
        {"id": "PIPE-HBR-01", "survey_id": HARBOUR_SURVEY, "material": "steel", "diameter_mm": 400, "depth_m": 1.8, "installed": "1987-06-01T00:00:00Z"},
        {"id": "PIPE-HBR-02", "survey_id": HARBOUR_SURVEY, "material": "pe", "diameter_mm": 160, "depth_m": 1.2, "installed": "2011-03-15T00:00:00Z"},
        {"id": "PIPE-HBR-03", "survey_id": HARBOUR_SURVEY, "material": "cast iron", "diameter_mm": 300, "cathodic_protection": false},
        {"id": "VLV-HBR-12", "survey_id": HARBOUR_SURVEY, "material": "steel", "diameter_mm": 400, "remote_controlled": true},
        {"id": "VLV-HBR-31", "survey_id": HARBOUR_SURVEY, "diameter_mm": 250, "note": null},
        {"id": "PIPE-RDG-01", "survey_id": RIDGE_SURVEY, "material": "steel", "diameter_mm": 500, "depth_m": 2.4},
        {"id": "PIPE-RDG-02", "survey_id": RIDGE_SURVEY, "material": "pe", "diameter_mm": 110}
    ]);
    serde_json::from_value(rows).unwrap_or_default()
}

/// Fixed two-survey scenario.
pub struct MockProvider {
    dataset: Dataset,
    reloads: usize,
}

impl MockProvider {
    /// Harbour survey with three dense device groups plus scattered singles,
    /// and a small mountain survey. Includes faults, offline units, low
    /// batteries and devices without a position.
    pub fn typical_survey() -> Self {
        let mut all_devices = devices(HARBOUR_SURVEY, HARBOUR_DEVICES);
        all_devices.extend(devices(RIDGE_SURVEY, RIDGE_DEVICES));
        let now = base_time();
        Self::new(Dataset {
            surveys: vec![
                Survey {
                    id: SurveyId::new(HARBOUR_SURVEY),
                    name: "Harbour ring main".to_string(),
                    started_at: Some(now - Duration::days(3)),
                },
                Survey {
                    id: SurveyId::new(RIDGE_SURVEY),
                    name: "Ridge transmission line".to_string(),
                    started_at: Some(now - Duration::days(10)),
                },
            ],
            devices: all_devices,
            valve_operations: valve_operations(),
            assets: assets(),
        })
    }

    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            reloads: 0,
        }
    }

    /// Reference time of the scenario.
    pub fn now() -> DateTime<Utc> {
        base_time()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads
    }
}

impl RecordProvider for MockProvider {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn reload(&mut self) -> Result<(), ProviderError> {
        self.reloads += 1;
        Ok(())
    }

    fn source_name(&self) -> String {
        "demo".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::located;

    #[test]
    fn test_typical_survey_is_consistent() {
        let provider = MockProvider::typical_survey();
        let harbour = SurveyId::new(HARBOUR_SURVEY);
        let ridge = SurveyId::new(RIDGE_SURVEY);

        assert_eq!(provider.surveys().len(), 2);
        assert_eq!(provider.devices(Some(&harbour)).len(), HARBOUR_DEVICES.len());
        assert_eq!(provider.devices(Some(&ridge)).len(), RIDGE_DEVICES.len());
        assert_eq!(provider.valve_operations(Some(&ridge)).len(), 2);
        assert_eq!(provider.assets(Some(&harbour)).len(), 5);
        assert_eq!(provider.assets(None).len(), 7);
    }

    #[test]
    fn test_every_declared_position_is_valid() {
        let provider = MockProvider::typical_survey();
        let devices = provider.devices(None);
        let with_position = HARBOUR_DEVICES
            .iter()
            .chain(RIDGE_DEVICES)
            .filter(|row| row.5.is_some())
            .count();
        assert_eq!(located(&devices).len(), with_position);
    }

    #[test]
    fn test_reload_counts() {
        let mut provider = MockProvider::typical_survey();
        provider.reload().unwrap();
        provider.reload().unwrap();
        assert_eq!(provider.reload_count(), 2);
        assert_eq!(provider.source_name(), "demo");
    }

    #[test]
    fn test_now_is_fixed() {
        assert_eq!(MockProvider::now().to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }
}
