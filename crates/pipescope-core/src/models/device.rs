use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, MaybeLocated, row_hash};
use crate::fmt::{NONE, format_battery, format_degrees, format_timestamp};
use crate::survey::SurveyId;
use crate::table::{FieldAccessor, SortValue, TableError};

/// Battery level at or below which a device is flagged.
pub const LOW_BATTERY_PCT: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    GasDetector,
    PressureLogger,
    GpsTracker,
    #[default]
    #[serde(other)]
    Other,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::GasDetector => "gas_detector",
            DeviceKind::PressureLogger => "pressure_logger",
            DeviceKind::GpsTracker => "gps_tracker",
            DeviceKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Active,
    Idle,
    Fault,
    #[default]
    Offline,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 4] = [
        DeviceStatus::Active,
        DeviceStatus::Idle,
        DeviceStatus::Fault,
        DeviceStatus::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Idle => "idle",
            DeviceStatus::Fault => "fault",
            DeviceStatus::Offline => "offline",
        }
    }
}

/// A field instrument deployed along the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub survey_id: SurveyId,
    pub name: String,
    #[serde(default)]
    pub kind: DeviceKind,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub battery_pct: Option<u8>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Device {
    pub fn is_low_battery(&self) -> bool {
        self.battery_pct.is_some_and(|b| b <= LOW_BATTERY_PCT)
    }
}

/// Device table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceField {
    Id,
    Name,
    Kind,
    Status,
    Battery,
    LastSeen,
    Lat,
    Lng,
}

impl DeviceField {
    pub const ALL: [DeviceField; 8] = [
        DeviceField::Id,
        DeviceField::Name,
        DeviceField::Kind,
        DeviceField::Status,
        DeviceField::Battery,
        DeviceField::LastSeen,
        DeviceField::Lat,
        DeviceField::Lng,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DeviceField::Id => "id",
            DeviceField::Name => "name",
            DeviceField::Kind => "kind",
            DeviceField::Status => "status",
            DeviceField::Battery => "battery",
            DeviceField::LastSeen => "last_seen",
            DeviceField::Lat => "lat",
            DeviceField::Lng => "lng",
        }
    }
}

impl FromStr for DeviceField {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DeviceField::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| TableError::UnknownField(s.to_string()))
    }
}

impl FieldAccessor for Device {
    type Field = DeviceField;

    fn columns(_records: &[Self]) -> Vec<DeviceField> {
        DeviceField::ALL.to_vec()
    }

    fn field_name(field: &DeviceField) -> String {
        field.name().to_uppercase()
    }

    fn field_value(&self, field: &DeviceField) -> SortValue {
        match field {
            DeviceField::Id => self.id.as_str().into(),
            DeviceField::Name => self.name.as_str().into(),
            DeviceField::Kind => self.kind.as_str().into(),
            DeviceField::Status => self.status.as_str().into(),
            DeviceField::Battery => self.battery_pct.into(),
            DeviceField::LastSeen => self.last_seen.into(),
            DeviceField::Lat => self.location.map(|p| p.lat()).into(),
            DeviceField::Lng => self.location.map(|p| p.lng()).into(),
        }
    }

    fn display_value(&self, field: &DeviceField) -> String {
        match field {
            DeviceField::Id => self.id.clone(),
            DeviceField::Name => self.name.clone(),
            DeviceField::Kind => self.kind.as_str().to_string(),
            DeviceField::Status => self.status.as_str().to_string(),
            DeviceField::Battery => format_battery(self.battery_pct),
            DeviceField::LastSeen => format_timestamp(self.last_seen),
            DeviceField::Lat => self
                .location
                .map(|p| format_degrees(p.lat()))
                .unwrap_or_else(|| NONE.to_string()),
            DeviceField::Lng => self
                .location
                .map(|p| format_degrees(p.lng()))
                .unwrap_or_else(|| NONE.to_string()),
        }
    }

    fn row_id(&self) -> u64 {
        row_hash(&self.id)
    }
}

impl MaybeLocated for Device {
    fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    fn marker_id(&self) -> String {
        self.id.clone()
    }
}
