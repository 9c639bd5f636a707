//! Zoom-dependent grouping of map markers into clusters.
//!
//! Single-pass greedy grouping: every unvisited point seeds a cluster and
//! absorbs the remaining unvisited points within the zoom radius. Distances
//! are Euclidean in raw degree space, which is close enough at city scale.
//! O(n^2) per call; inputs are a few hundred devices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Radius used when the zoom table has no entries at all.
pub const DEFAULT_RADIUS: f64 = 0.01;

/// Hand-tuned zoom -> radius (degrees) breakpoints.
const DEFAULT_LEVELS: &[(u8, f64)] = &[
    (3, 5.0),
    (4, 2.5),
    (5, 1.2),
    (6, 0.6),
    (7, 0.3),
    (8, 0.15),
    (9, 0.08),
    (10, 0.04),
    (11, 0.02),
    (12, 0.01),
    (13, 0.005),
    (14, 0.0025),
    (15, 0.0012),
    (16, 0.0006),
    (17, 0.0003),
    (18, 0.00015),
];

/// Invalid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    NotFinite { lat: f64, lng: f64 },
    OutOfRange { lat: f64, lng: f64 },
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::NotFinite { lat, lng } => {
                write!(f, "coordinates ({}, {}) are not finite", lat, lng)
            }
            GeoError::OutOfRange { lat, lng } => write!(
                f,
                "coordinates ({}, {}) out of range (lat -90..90, lng -180..180)",
                lat, lng
            ),
        }
    }
}

impl std::error::Error for GeoError {}

/// Invalid zoom radius table.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterConfigError {
    /// Radius is negative or not finite.
    InvalidRadius { zoom: u8, radius: f64 },
    /// A higher zoom level has a larger radius than a lower one.
    NotMonotonic { zoom: u8, radius: f64, previous: f64 },
    /// The same zoom level appears twice.
    DuplicateZoom(u8),
}

impl std::fmt::Display for ClusterConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterConfigError::InvalidRadius { zoom, radius } => {
                write!(f, "zoom {}: invalid radius {}", zoom, radius)
            }
            ClusterConfigError::NotMonotonic {
                zoom,
                radius,
                previous,
            } => write!(
                f,
                "zoom {}: radius {} is larger than the previous level's {}",
                zoom, radius, previous
            ),
            ClusterConfigError::DuplicateZoom(zoom) => write!(f, "zoom {} listed twice", zoom),
        }
    }
}

impl std::error::Error for ClusterConfigError {}

/// Validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoError::NotFinite { lat, lng });
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::OutOfRange { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Euclidean distance in degrees (not geodesic).
    pub fn degree_distance(&self, other: &GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }

    /// Arithmetic mean of the points, `None` for an empty input.
    pub fn centroid<I>(points: I) -> Option<GeoPoint>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let (mut lat, mut lng, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            lat += p.lat;
            lng += p.lng;
            n += 1;
        }
        if n == 0 {
            return None;
        }
        // The mean of in-range coordinates is in range.
        Some(GeoPoint {
            lat: lat / n as f64,
            lng: lng / n as f64,
        })
    }
}

/// Anything that can be drawn as a map marker.
pub trait Geolocated {
    fn geo_point(&self) -> GeoPoint;

    /// Identity shown when the marker is not grouped.
    fn marker_id(&self) -> String;
}

impl<T: Geolocated + ?Sized> Geolocated for &T {
    fn geo_point(&self) -> GeoPoint {
        (**self).geo_point()
    }

    fn marker_id(&self) -> String {
        (**self).marker_id()
    }
}

impl Geolocated for GeoPoint {
    fn geo_point(&self) -> GeoPoint {
        *self
    }

    fn marker_id(&self) -> String {
        format!("{:.5},{:.5}", self.lat, self.lng)
    }
}

/// One entry of a zoom radius config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRadius {
    pub zoom: u8,
    pub radius: f64,
}

/// Zoom level -> clustering radius lookup.
///
/// Radii never grow as zoom increases, so zooming in never merges markers
/// through the radius alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZoomRadius>", into = "Vec<ZoomRadius>")]
pub struct ZoomRadiusTable {
    levels: BTreeMap<u8, f64>,
}

impl ZoomRadiusTable {
    pub fn new(levels: impl IntoIterator<Item = (u8, f64)>) -> Result<Self, ClusterConfigError> {
        let mut map = BTreeMap::new();
        for (zoom, radius) in levels {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ClusterConfigError::InvalidRadius { zoom, radius });
            }
            if map.insert(zoom, radius).is_some() {
                return Err(ClusterConfigError::DuplicateZoom(zoom));
            }
        }

        let mut previous: Option<f64> = None;
        for (&zoom, &radius) in &map {
            if let Some(prev) = previous
                && radius > prev
            {
                return Err(ClusterConfigError::NotMonotonic {
                    zoom,
                    radius,
                    previous: prev,
                });
            }
            previous = Some(radius);
        }

        Ok(Self { levels: map })
    }

    /// Radius for `zoom`. Never fails: below the first level uses the first
    /// level, above the last uses the last, gaps use the nearest lower level,
    /// and an empty table yields [`DEFAULT_RADIUS`].
    pub fn radius_for(&self, zoom: u8) -> f64 {
        if let Some((_, &radius)) = self.levels.range(..=zoom).next_back() {
            return radius;
        }
        self.levels.values().next().copied().unwrap_or(DEFAULT_RADIUS)
    }

    pub fn levels(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.levels.iter().map(|(&z, &r)| (z, r))
    }
}

impl Default for ZoomRadiusTable {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.iter().copied().collect(),
        }
    }
}

impl TryFrom<Vec<ZoomRadius>> for ZoomRadiusTable {
    type Error = ClusterConfigError;

    fn try_from(levels: Vec<ZoomRadius>) -> Result<Self, Self::Error> {
        Self::new(levels.into_iter().map(|l| (l.zoom, l.radius)))
    }
}

impl From<ZoomRadiusTable> for Vec<ZoomRadius> {
    fn from(table: ZoomRadiusTable) -> Self {
        table
            .levels
            .into_iter()
            .map(|(zoom, radius)| ZoomRadius { zoom, radius })
            .collect()
    }
}

/// One marker group for a single render pass. Borrows its members.
#[derive(Debug, Clone)]
pub struct Cluster<'a, T> {
    pub centroid: GeoPoint,
    pub members: Vec<&'a T>,
}

impl<T: Geolocated> Cluster<'_, T> {
    /// More than one member.
    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member count for groups, the member's marker id otherwise.
    pub fn label(&self) -> String {
        match self.members.as_slice() {
            [single] => single.marker_id(),
            members => members.len().to_string(),
        }
    }
}

/// Clusters `points` using the radius `table` assigns to `zoom`.
pub fn cluster_points<'a, T: Geolocated>(
    points: &'a [T],
    zoom: u8,
    table: &ZoomRadiusTable,
) -> Vec<Cluster<'a, T>> {
    cluster_points_with(points, table.radius_for(zoom))
}

/// Clusters `points` with an explicit radius in degrees.
pub fn cluster_points_with<T: Geolocated>(points: &[T], radius: f64) -> Vec<Cluster<'_, T>> {
    let positions: Vec<GeoPoint> = points.iter().map(Geolocated::geo_point).collect();
    let mut visited = vec![false; points.len()];
    let mut clusters = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let origin = positions[i];
        let mut members = vec![seed];
        let mut member_points = vec![origin];

        for (j, candidate) in points.iter().enumerate().skip(i + 1) {
            if !visited[j] && origin.degree_distance(&positions[j]) <= radius {
                visited[j] = true;
                members.push(candidate);
                member_points.push(positions[j]);
            }
        }

        let centroid = GeoPoint::centroid(member_points).unwrap_or(origin);
        clusters.push(Cluster { centroid, members });
    }

    debug!(
        "Clustered {} points into {} clusters (radius {})",
        points.len(),
        clusters.len(),
        radius
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Marker {
        id: &'static str,
        at: GeoPoint,
    }

    impl Geolocated for Marker {
        fn geo_point(&self) -> GeoPoint {
            self.at
        }

        fn marker_id(&self) -> String {
            self.id.to_string()
        }
    }

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    /// Points along a meridian spaced by 2^-10 degrees, so every distance is exact.
    fn meridian_line(n: usize) -> Vec<GeoPoint> {
        (0..n).map(|k| pt(k as f64 / 1024.0, 0.0)).collect()
    }

    #[test]
    fn test_close_points_form_one_cluster() {
        let points = vec![pt(0.0, 0.0), pt(0.0, 0.001)];
        let clusters = cluster_points_with(&points, 0.01);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert!(clusters[0].is_cluster());
        assert_eq!(clusters[0].label(), "2");
    }

    #[test]
    fn test_default_table_zoom_12_groups_close_points() {
        let table = ZoomRadiusTable::default();
        assert_eq!(table.radius_for(12), 0.01);
        let points = vec![pt(0.0, 0.0), pt(0.0, 0.001)];
        assert_eq!(cluster_points(&points, 12, &table).len(), 1);
    }

    #[test]
    fn test_far_points_stay_separate() {
        let table = ZoomRadiusTable::default();
        let points = vec![pt(0.0, 0.0), pt(10.0, 10.0)];
        for zoom in 6..=22 {
            assert!(table.radius_for(zoom) < 1.0);
            let clusters = cluster_points(&points, zoom, &table);
            assert_eq!(clusters.len(), 2);
            assert!(clusters.iter().all(|c| !c.is_cluster()));
        }
    }

    #[test]
    fn test_empty_input() {
        let points: Vec<GeoPoint> = Vec::new();
        assert!(cluster_points(&points, 10, &ZoomRadiusTable::default()).is_empty());
    }

    #[test]
    fn test_identical_points_single_cluster() {
        let points = vec![pt(52.5, 13.4); 5];
        let clusters = cluster_points_with(&points, 0.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 5);
        assert_eq!(clusters[0].centroid, pt(52.5, 13.4));
    }

    #[test]
    fn test_every_point_in_exactly_one_cluster() {
        let table = ZoomRadiusTable::default();
        let points: Vec<GeoPoint> = (0..200)
            .map(|i| {
                let i = i as f64;
                pt((i * 0.37).sin() * 0.5 + 48.0, (i * 0.91).cos() * 0.5 + 11.0)
            })
            .collect();
        for zoom in 0..=20 {
            let clusters = cluster_points(&points, zoom, &table);
            let total: usize = clusters.iter().map(Cluster::len).sum();
            assert_eq!(total, points.len(), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_single_member_label_is_marker_id() {
        let markers = vec![
            Marker {
                id: "DEV-1",
                at: pt(1.0, 1.0),
            },
            Marker {
                id: "DEV-2",
                at: pt(40.0, 40.0),
            },
        ];
        let clusters = cluster_points_with(&markers, 0.5);
        assert_eq!(clusters[0].label(), "DEV-1");
        assert_eq!(clusters[1].label(), "DEV-2");
    }

    #[test]
    fn test_seed_order_follows_input() {
        let points = vec![pt(0.0, 0.0), pt(0.0, 0.3), pt(0.0, 0.6)];
        let clusters = cluster_points_with(&points, 0.35);
        // Seed (0,0) absorbs (0,0.3); (0,0.6) is out of the seed's reach.
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[1].len(), 1);
    }

    #[test]
    fn test_centroid_is_mean() {
        let points = vec![pt(0.0, 0.0), pt(0.0, 0.002), pt(0.002, 0.001)];
        let clusters = cluster_points_with(&points, 0.01);
        assert_eq!(clusters.len(), 1);
        let c = clusters[0].centroid;
        assert!((c.lat() - 0.002 / 3.0).abs() < 1e-12);
        assert!((c.lng() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_radius_lookup_is_non_increasing() {
        let table = ZoomRadiusTable::default();
        for zoom in 0..u8::MAX {
            assert!(table.radius_for(zoom + 1) <= table.radius_for(zoom));
        }
    }

    #[test]
    fn test_radius_lookup_fallbacks() {
        let table = ZoomRadiusTable::new([(8, 0.2), (10, 0.05), (14, 0.001)]).unwrap();
        assert_eq!(table.radius_for(0), 0.2);
        assert_eq!(table.radius_for(9), 0.2);
        assert_eq!(table.radius_for(12), 0.05);
        assert_eq!(table.radius_for(30), 0.001);

        let empty = ZoomRadiusTable::new(Vec::new()).unwrap();
        assert_eq!(empty.radius_for(12), DEFAULT_RADIUS);
        assert_eq!(empty.levels().count(), 0);
    }

    #[test]
    fn test_cluster_count_non_decreasing_with_zoom() {
        let table = ZoomRadiusTable::default();
        let points = meridian_line(64);
        let mut previous = 0;
        for zoom in 0..=20 {
            let count = cluster_points(&points, zoom, &table).len();
            assert!(count >= previous, "zoom {}: {} < {}", zoom, count, previous);
            previous = count;
        }
        assert_eq!(cluster_points(&points, 0, &table).len(), 1);
        assert_eq!(cluster_points(&points, 20, &table).len(), 64);
    }

    #[test]
    fn test_cluster_count_non_decreasing_with_custom_table() {
        let table =
            ZoomRadiusTable::new([(1, 4.0), (2, 2.0), (3, 1.0), (4, 0.5), (5, 0.25)]).unwrap();
        let points: Vec<GeoPoint> = (0..40).map(|k| pt(0.0, k as f64 * 0.25)).collect();
        let counts: Vec<usize> = (1..=5)
            .map(|z| cluster_points(&points, z, &table).len())
            .collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
        assert_eq!(counts, vec![3, 5, 8, 14, 20]);
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(
            ZoomRadiusTable::new([(5, 0.1), (6, 0.2)]),
            Err(ClusterConfigError::NotMonotonic {
                zoom: 6,
                radius: 0.2,
                previous: 0.1
            })
        );
        assert!(matches!(
            ZoomRadiusTable::new([(5, -1.0)]),
            Err(ClusterConfigError::InvalidRadius { .. })
        ));
        assert!(matches!(
            ZoomRadiusTable::new([(5, f64::NAN)]),
            Err(ClusterConfigError::InvalidRadius { .. })
        ));
        assert_eq!(
            ZoomRadiusTable::new([(5, 0.1), (5, 0.1)]),
            Err(ClusterConfigError::DuplicateZoom(5))
        );
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"[{"zoom": 14, "radius": 0.001}, {"zoom": 10, "radius": 0.05}]"#;
        let table: ZoomRadiusTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.levels().collect::<Vec<_>>(), vec![(10, 0.05), (14, 0.001)]);

        let bad = r#"[{"zoom": 10, "radius": 0.01}, {"zoom": 14, "radius": 0.5}]"#;
        assert!(serde_json::from_str::<ZoomRadiusTable>(bad).is_err());
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(matches!(
            GeoPoint::new(90.1, 0.0),
            Err(GeoError::OutOfRange { .. })
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(GeoError::NotFinite { .. })
        ));
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": 0.0, "lng": 200.0}"#).is_err());
        let p: GeoPoint = serde_json::from_str(r#"{"lat": 52.5, "lng": 13.4}"#).unwrap();
        assert_eq!(p, pt(52.5, 13.4));
    }
}
