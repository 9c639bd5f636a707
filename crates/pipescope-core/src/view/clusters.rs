//! Map tab view model: one row per cluster.

use crate::cluster::{Cluster, GeoPoint, Geolocated};
use crate::fmt::{format_point, format_radius};
use crate::view::common::{RowStyleClass, StyledRow};

#[derive(Debug, Clone)]
pub struct ClusterRow {
    pub label: String,
    pub centroid: GeoPoint,
    pub member_count: usize,
    pub member_ids: Vec<String>,
    /// Most severe member style; multi-member groups of normal rows are accented.
    pub style: RowStyleClass,
}

#[derive(Debug, Clone)]
pub struct ClusterViewModel {
    pub title: String,
    pub zoom: u8,
    pub radius: f64,
    pub total_points: usize,
    pub rows: Vec<ClusterRow>,
}

impl ClusterViewModel {
    pub fn headers() -> [&'static str; 4] {
        ["LABEL", "CENTROID", "COUNT", "MEMBERS"]
    }
}

pub fn build_cluster_view<T>(clusters: &[Cluster<'_, T>], zoom: u8, radius: f64) -> ClusterViewModel
where
    T: Geolocated + StyledRow,
{
    let rows: Vec<ClusterRow> = clusters
        .iter()
        .map(|c| {
            let worst = c
                .members
                .iter()
                .map(|m| m.row_style())
                .max_by_key(|s| s.severity())
                .unwrap_or_default();
            let style = if c.is_cluster() && worst.severity() <= RowStyleClass::Active.severity() {
                RowStyleClass::Accent
            } else {
                worst
            };
            ClusterRow {
                label: c.label(),
                centroid: c.centroid,
                member_count: c.len(),
                member_ids: c.members.iter().map(|m| m.marker_id()).collect(),
                style,
            }
        })
        .collect();

    let total_points = rows.iter().map(|r| r.member_count).sum();
    let title = format!(
        "MAP: {} markers in {} clusters (zoom {}, radius {})",
        total_points,
        rows.len(),
        zoom,
        format_radius(radius)
    );

    ClusterViewModel {
        title,
        zoom,
        radius,
        total_points,
        rows,
    }
}

impl ClusterRow {
    pub fn centroid_text(&self) -> String {
        format_point(Some(self.centroid))
    }

    /// Member ids joined for a single cell.
    pub fn members_text(&self) -> String {
        self.member_ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ZoomRadiusTable, cluster_points};
    use crate::models::located;
    use crate::provider::{MockProvider, RecordProvider};

    #[test]
    fn test_cluster_view_counts_and_labels() {
        let devices = MockProvider::typical_survey().devices(None);
        let points = located(&devices);
        let table = ZoomRadiusTable::default();
        let clusters = cluster_points(&points, 14, &table);
        let view = build_cluster_view(&clusters, 14, table.radius_for(14));

        assert_eq!(view.total_points, points.len());
        assert_eq!(view.rows.len(), clusters.len());
        for row in &view.rows {
            assert_eq!(row.member_ids.len(), row.member_count);
            if row.member_count == 1 {
                assert_eq!(row.label, row.member_ids[0]);
            } else {
                assert_eq!(row.label, row.member_count.to_string());
            }
        }
        assert!(view.title.contains("zoom 14"));
        assert!(view.title.contains("radius 0.0025°"));
    }

    #[test]
    fn test_fault_member_marks_cluster_critical() {
        let devices = MockProvider::typical_survey().devices(None);
        let points = located(&devices);
        // Wide enough to group the whole dock 4 site, which has a faulty logger.
        let clusters = cluster_points(&points, 13, &ZoomRadiusTable::default());
        let view = build_cluster_view(&clusters, 13, 0.005);
        let dock = view
            .rows
            .iter()
            .find(|r| r.member_ids.iter().any(|id| id == "HBR-005"))
            .unwrap();
        assert!(dock.member_count > 1);
        assert_eq!(dock.style, RowStyleClass::Critical);
    }

    #[test]
    fn test_empty_clusters() {
        let points: Vec<crate::models::Located<'_, crate::models::Device>> = Vec::new();
        let clusters = cluster_points(&points, 12, &ZoomRadiusTable::default());
        let view = build_cluster_view(&clusters, 12, 0.01);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_points, 0);
    }
}
