//! Survey domain records: devices, valve operations, asset attribute rows.
//!
//! Typed records implement [`FieldAccessor`](crate::table::FieldAccessor) with a
//! field enum; asset rows are schema-less and use [`DynamicRecord`].

mod device;
mod record;
mod valve;

pub use device::*;
pub use record::*;
pub use valve::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

pub use crate::cluster::GeoPoint;
use crate::cluster::Geolocated;
use crate::survey::SurveyId;

/// A survey campaign. Devices and operations belong to exactly one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: SurveyId,
    pub name: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// Stable numeric row id derived from a record's string id.
pub fn row_hash(id: &str) -> u64 {
    xxh3_64(id.as_bytes())
}

/// Record that may carry a map position.
pub trait MaybeLocated {
    fn location(&self) -> Option<GeoPoint>;
    fn marker_id(&self) -> String;
}

/// A record paired with its position, ready for clustering.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a, T> {
    pub record: &'a T,
    pub point: GeoPoint,
}

impl<T: MaybeLocated> Geolocated for Located<'_, T> {
    fn geo_point(&self) -> GeoPoint {
        self.point
    }

    fn marker_id(&self) -> String {
        self.record.marker_id()
    }
}

/// Something the map can place: a device or a valve operation.
#[derive(Debug, Clone, Copy)]
pub enum MapMarker<'a> {
    Device(&'a Device),
    Valve(&'a ValveOperation),
}

impl MaybeLocated for MapMarker<'_> {
    fn location(&self) -> Option<GeoPoint> {
        match self {
            MapMarker::Device(d) => d.location(),
            MapMarker::Valve(v) => v.location(),
        }
    }

    fn marker_id(&self) -> String {
        match self {
            MapMarker::Device(d) => d.marker_id(),
            MapMarker::Valve(v) => v.marker_id(),
        }
    }
}

/// Devices followed by valve operations, as map markers.
pub fn map_markers<'a>(
    devices: impl IntoIterator<Item = &'a Device>,
    valves: impl IntoIterator<Item = &'a ValveOperation>,
) -> Vec<MapMarker<'a>> {
    devices
        .into_iter()
        .map(MapMarker::Device)
        .chain(valves.into_iter().map(MapMarker::Valve))
        .collect()
}

/// Records that have a position, in input order.
pub fn located<'a, T, I>(records: I) -> Vec<Located<'a, T>>
where
    T: MaybeLocated + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter_map(|record| {
            record
                .location()
                .map(|point| Located { record, point })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_hash_is_stable() {
        assert_eq!(row_hash("DEV-001"), row_hash("DEV-001"));
        assert_ne!(row_hash("DEV-001"), row_hash("DEV-002"));
    }

    #[test]
    fn test_map_markers_include_located_valves() {
        use crate::cluster::cluster_points_with;
        use crate::provider::{HARBOUR_SURVEY, MockProvider, RecordProvider};

        let provider = MockProvider::typical_survey();
        let survey = SurveyId::new(HARBOUR_SURVEY);
        let devices = provider.devices(Some(&survey));
        let valves = provider.valve_operations(Some(&survey));
        let markers = map_markers(&devices, &valves);
        assert_eq!(markers.len(), devices.len() + valves.len());

        let points = located(&markers);
        let located_valves = valves.iter().filter(|v| v.location.is_some()).count();
        let located_devices = devices.iter().filter(|d| d.location.is_some()).count();
        assert_eq!(points.len(), located_devices + located_valves);

        // Valve V-12 sits at the quay gate; its marker id is the valve id.
        let clusters = cluster_points_with(&points, 0.002);
        let quay = clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m.marker_id() == "V-12"))
            .unwrap();
        assert!(quay.members.iter().any(|m| m.marker_id() == "HBR-001"));
    }

    #[test]
    fn test_survey_from_json() {
        let survey: Survey =
            serde_json::from_str(r#"{"id": "S-2024-07", "name": "Harbour loop"}"#).unwrap();
        assert_eq!(survey.id.as_str(), "S-2024-07");
        assert!(survey.started_at.is_none());
    }
}
