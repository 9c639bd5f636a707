use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::row_hash;
use crate::fmt::NONE;
use crate::survey::SurveyId;
use crate::table::{FieldAccessor, SortValue};

const ID_KEY: &str = "id";
const SURVEY_KEY: &str = "survey_id";

/// Column of a schema-less record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(pub String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Asset attribute row: arbitrary JSON object keyed by field name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: Map<String, Value>,
}

impl DynamicRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn survey_id(&self) -> Option<SurveyId> {
        self.fields
            .get(SURVEY_KEY)
            .and_then(Value::as_str)
            .map(SurveyId::new)
    }

    fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

fn value_to_sort(value: &Value) -> SortValue {
    match value {
        Value::Null => SortValue::Missing,
        Value::Bool(b) => SortValue::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SortValue::Integer(i),
            None => n.as_f64().map(SortValue::Float).unwrap_or(SortValue::Missing),
        },
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => SortValue::Date(ts.with_timezone(&Utc)),
            Err(_) => SortValue::Text(s.clone()),
        },
        other => SortValue::Text(other.to_string()),
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => NONE.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FieldAccessor for DynamicRecord {
    type Field = FieldName;

    /// `id` first, then every other key in first-seen order. `survey_id` is
    /// implied by the active survey and not shown.
    fn columns(records: &[Self]) -> Vec<FieldName> {
        let mut columns: Vec<FieldName> = Vec::new();
        if records.iter().any(|r| r.fields.contains_key(ID_KEY)) {
            columns.push(FieldName::from(ID_KEY));
        }
        for key in records.iter().flat_map(|r| r.keys()) {
            if key == ID_KEY || key == SURVEY_KEY {
                continue;
            }
            if !columns.iter().any(|c| c.as_str() == key) {
                columns.push(FieldName::new(key.as_str()));
            }
        }
        columns
    }

    fn field_name(field: &FieldName) -> String {
        field.as_str().to_uppercase()
    }

    fn field_value(&self, field: &FieldName) -> SortValue {
        self.fields
            .get(field.as_str())
            .map(value_to_sort)
            .unwrap_or(SortValue::Missing)
    }

    fn display_value(&self, field: &FieldName) -> String {
        self.fields
            .get(field.as_str())
            .map(value_to_display)
            .unwrap_or_else(|| NONE.to_string())
    }

    fn row_id(&self) -> u64 {
        match self.fields.get(ID_KEY) {
            Some(id) => row_hash(&value_to_display(id)),
            None => row_hash(&Value::Object(self.fields.clone()).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableController;
    use serde_json::json;

    fn rows(values: Value) -> Vec<DynamicRecord> {
        serde_json::from_value(values).unwrap()
    }

    fn ids(view: &[&DynamicRecord]) -> Vec<i64> {
        view.iter()
            .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
            .collect()
    }

    #[test]
    fn test_sort_and_paginate_by_id() {
        let records = rows(json!([{"id": 3}, {"id": 1}, {"id": 2}]));
        let mut table = TableController::new(records, 2, Some(FieldName::from("id"))).unwrap();
        assert_eq!(ids(&table.sorted_and_paginated_view()), vec![1, 2]);
        table.next_page();
        assert_eq!(ids(&table.sorted_and_paginated_view()), vec![3]);
        let info = table.page_info();
        assert_eq!(info.total_items, 3);
        assert_eq!(info.total_pages, 2);
    }

    #[test]
    fn test_absent_field_sorts_as_missing() {
        let records = rows(json!([
            {"id": 1, "diameter_mm": 300},
            {"id": 2},
            {"id": 3, "diameter_mm": 150}
        ]));
        let mut table =
            TableController::new(records, 10, Some(FieldName::from("diameter_mm"))).unwrap();
        assert_eq!(ids(&table.sorted_and_paginated_view()), vec![2, 3, 1]);
        table.set_sort_key(FieldName::from("diameter_mm"));
        assert_eq!(ids(&table.sorted_and_paginated_view()), vec![1, 3, 2]);
    }

    #[test]
    fn test_value_mapping() {
        assert_eq!(value_to_sort(&json!(null)), SortValue::Missing);
        assert_eq!(value_to_sort(&json!(true)), SortValue::Integer(1));
        assert_eq!(value_to_sort(&json!(2.5)), SortValue::Float(2.5));
        assert_eq!(value_to_sort(&json!("steel")), SortValue::Text("steel".into()));
        assert!(matches!(
            value_to_sort(&json!("2024-05-01T10:00:00Z")),
            SortValue::Date(_)
        ));
        assert_eq!(value_to_sort(&json!([1, 2])), SortValue::Text("[1,2]".into()));
    }

    #[test]
    fn test_large_integers_and_floats_sort_numerically() {
        let records = rows(json!([
            {"id": "a", "v": 9007199254740993_i64},
            {"id": "b", "v": 9007199254740992.0},
            {"id": "c", "v": 9007199254740992_i64}
        ]));
        let table = TableController::new(records, 10, Some(FieldName::from("v"))).unwrap();
        let ids: Vec<&str> = table
            .sorted_records()
            .map(|r| r.get("id").and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_columns_id_first_without_survey() {
        let records = rows(json!([
            {"survey_id": "S-1", "material": "pe", "id": "A1"},
            {"id": "A2", "depth_m": 1.2}
        ]));
        let columns = DynamicRecord::columns(&records);
        let names: Vec<&str> = columns.iter().map(FieldName::as_str).collect();
        assert_eq!(names[0], "id");
        assert!(names.contains(&"material"));
        assert!(names.contains(&"depth_m"));
        assert!(!names.contains(&"survey_id"));
        assert_eq!(records[0].survey_id(), Some(SurveyId::new("S-1")));
    }

    #[test]
    fn test_row_id_from_id_field() {
        let records = rows(json!([{"id": "A1", "x": 1}, {"id": "A1", "x": 2}]));
        assert_eq!(records[0].row_id(), records[1].row_id());
        assert_eq!(records[0].row_id(), row_hash("A1"));
    }

    #[test]
    fn test_display_value() {
        let records = rows(json!([{"id": 7, "note": null, "material": "pe"}]));
        let r = &records[0];
        assert_eq!(r.display_value(&FieldName::from("id")), "7");
        assert_eq!(r.display_value(&FieldName::from("note")), "-");
        assert_eq!(r.display_value(&FieldName::from("absent")), "-");
        assert!(r.matches_filter("PE"));
    }
}
