use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, MaybeLocated, row_hash};
use crate::fmt::{format_pressure, format_timestamp};
use crate::survey::SurveyId;
use crate::table::{FieldAccessor, SortValue, TableError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValveAction {
    Open,
    Close,
    Throttle,
}

impl ValveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValveAction::Open => "open",
            ValveAction::Close => "close",
            ValveAction::Throttle => "throttle",
        }
    }
}

/// One recorded manipulation of a pipeline valve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveOperation {
    pub id: String,
    pub survey_id: SurveyId,
    pub valve_id: String,
    pub action: ValveAction,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub pressure_bar: Option<f64>,
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveField {
    Id,
    Valve,
    Action,
    Operator,
    Pressure,
    PerformedAt,
}

impl ValveField {
    pub const ALL: [ValveField; 6] = [
        ValveField::Id,
        ValveField::Valve,
        ValveField::Action,
        ValveField::Operator,
        ValveField::Pressure,
        ValveField::PerformedAt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValveField::Id => "id",
            ValveField::Valve => "valve",
            ValveField::Action => "action",
            ValveField::Operator => "operator",
            ValveField::Pressure => "pressure",
            ValveField::PerformedAt => "performed_at",
        }
    }
}

impl FromStr for ValveField {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ValveField::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| TableError::UnknownField(s.to_string()))
    }
}

impl FieldAccessor for ValveOperation {
    type Field = ValveField;

    fn columns(_records: &[Self]) -> Vec<ValveField> {
        ValveField::ALL.to_vec()
    }

    fn field_name(field: &ValveField) -> String {
        field.name().to_uppercase()
    }

    fn field_value(&self, field: &ValveField) -> SortValue {
        match field {
            ValveField::Id => self.id.as_str().into(),
            ValveField::Valve => self.valve_id.as_str().into(),
            ValveField::Action => self.action.as_str().into(),
            ValveField::Operator if self.operator.is_empty() => SortValue::Missing,
            ValveField::Operator => self.operator.as_str().into(),
            ValveField::Pressure => self.pressure_bar.into(),
            ValveField::PerformedAt => self.performed_at.into(),
        }
    }

    fn display_value(&self, field: &ValveField) -> String {
        match field {
            ValveField::Id => self.id.clone(),
            ValveField::Valve => self.valve_id.clone(),
            ValveField::Action => self.action.as_str().to_string(),
            ValveField::Operator => self.operator.clone(),
            ValveField::Pressure => format_pressure(self.pressure_bar),
            ValveField::PerformedAt => format_timestamp(Some(self.performed_at)),
        }
    }

    fn row_id(&self) -> u64 {
        row_hash(&self.id)
    }
}

impl MaybeLocated for ValveOperation {
    fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    fn marker_id(&self) -> String {
        self.valve_id.clone()
    }
}
