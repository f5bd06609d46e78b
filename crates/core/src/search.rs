//! Sighting search: query normalization, predicate composition and ranking.
//!
//! Raw request parameters ([`SearchParams`]) are validated into a
//! [`SightingQuery`] by one of the endpoint-specific constructors. The query
//! is then executed by [`search`] against any [`SightingStore`]:
//!
//! 1. Time range, unit substring and (when a spatial filter is active) a
//!    bounding box are pushed to the store as a coarse prefilter.
//! 2. Candidates are filtered by exact great-circle distance.
//! 3. Spatial results are stably sorted by ascending distance from the center;
//!    other results keep the store's order.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::geo::{BoundingBox, GeoPoint, Located};
use crate::mgrs::CoordinateConverter;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Largest accepted search radius. Bounds the candidate scan.
pub const MAX_RADIUS_KM: f64 = 1000.0;

/// Naive (offset-less) timestamp layouts accepted in query strings, tried in order.
/// Offset-less values are interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts that RFC 3339 parsing does not cover (no seconds).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%#z"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Client-side search validation failures. Each maps to its own HTTP error code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error(
        "Invalid date format for {field}: '{value}'. Use ISO format (YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS)"
    )]
    InvalidTimeFormat { field: &'static str, value: String },

    #[error("start_time and end_time must be provided together")]
    IncompleteTimeRange,

    #[error("end_time must be >= start_time")]
    InvalidRange,

    #[error("{0}")]
    IncompleteSpatialFilter(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

// ---------------------------------------------------------------------------
// Raw parameters
// ---------------------------------------------------------------------------

/// Query-string parameters shared by every search endpoint.
///
/// Blank strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub mgrs: Option<String>,
    pub unit: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Normalized query
// ---------------------------------------------------------------------------

/// Inclusive observation-time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// Build a range from optional bounds.
    ///
    /// Both absent yields `Ok(None)`; exactly one present is
    /// [`SearchError::IncompleteTimeRange`].
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, SearchError> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_timestamp("start_time", start)?;
                let end = parse_timestamp("end_time", end)?;
                if end < start {
                    return Err(SearchError::InvalidRange);
                }
                Ok(Some(Self { start, end }))
            }
            _ => Err(SearchError::IncompleteTimeRange),
        }
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A resolved search center with its radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFilter {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl SpatialFilter {
    /// Filter centered on an explicit latitude/longitude.
    pub fn from_point(latitude: f64, longitude: f64, radius_km: f64) -> Result<Self, SearchError> {
        let radius_km = validate_radius(radius_km)?;
        let center = GeoPoint::new(latitude, longitude);
        if !center.is_valid() {
            return Err(SearchError::InvalidCoordinate(format!(
                "latitude must be within [-90, 90] and longitude within [-180, 180], got {latitude}, {longitude}"
            )));
        }
        Ok(Self { center, radius_km })
    }

    /// Filter centered on the square referenced by an MGRS string.
    pub fn from_mgrs(
        converter: &dyn CoordinateConverter,
        reference: &str,
        radius_km: f64,
    ) -> Result<Self, SearchError> {
        let radius_km = validate_radius(radius_km)?;
        let center = converter
            .to_lat_lon(reference)
            .map_err(|e| SearchError::InvalidCoordinate(e.to_string()))?;
        Ok(Self { center, radius_km })
    }

    /// Coarse rectangle pushed to the store ahead of the exact distance check.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(&self.center, self.radius_km)
    }

    /// Keep records within the radius (inclusive), nearest first.
    ///
    /// The sort is stable: equidistant records keep their input order.
    pub fn apply<T: Located>(&self, candidates: Vec<T>) -> Vec<T> {
        let within: Vec<(f64, T)> = candidates
            .into_iter()
            .map(|record| (self.center.distance_to(&record.position()), record))
            .filter(|(distance, _)| *distance <= self.radius_km)
            .collect();
        rank_by_distance(within)
    }
}

/// Order `(distance, record)` pairs by ascending distance, stably.
pub fn rank_by_distance<T>(mut scored: Vec<(f64, T)>) -> Vec<T> {
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, record)| record).collect()
}

/// Check a radius lies in `(0, MAX_RADIUS_KM]`.
pub fn validate_radius(radius_km: f64) -> Result<f64, SearchError> {
    if radius_km.is_finite() && radius_km > 0.0 && radius_km <= MAX_RADIUS_KM {
        Ok(radius_km)
    } else {
        Err(SearchError::IncompleteSpatialFilter(format!(
            "radius_km must be greater than 0 and at most {MAX_RADIUS_KM}, got {radius_km}"
        )))
    }
}

/// A validated search. Absent parts do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SightingQuery {
    pub time: Option<TimeRange>,
    pub unit: Option<String>,
    pub spatial: Option<SpatialFilter>,
}

impl SightingQuery {
    /// `/sightings/search/time`: both bounds are required.
    pub fn time_window(params: &SearchParams) -> Result<Self, SearchError> {
        let start = non_blank(&params.start_time);
        let end = non_blank(&params.end_time);
        if start.is_none() && end.is_none() {
            return Err(SearchError::IncompleteTimeRange);
        }
        Ok(Self {
            time: TimeRange::from_bounds(start, end)?,
            ..Self::default()
        })
    }

    /// `/sightings/search/proximity`: latitude, longitude and radius are required.
    pub fn proximity(params: &SearchParams) -> Result<Self, SearchError> {
        match (params.latitude, params.longitude, params.radius_km) {
            (Some(lat), Some(lon), Some(radius)) => Ok(Self {
                spatial: Some(SpatialFilter::from_point(lat, lon, radius)?),
                ..Self::default()
            }),
            _ => Err(SearchError::IncompleteSpatialFilter(
                "latitude, longitude and radius_km are all required".into(),
            )),
        }
    }

    /// `/sightings/search`: every group is optional.
    ///
    /// A partial latitude/longitude/radius triple disables spatial filtering
    /// rather than failing.
    pub fn combined(params: &SearchParams) -> Result<Self, SearchError> {
        let time = TimeRange::from_bounds(
            non_blank(&params.start_time),
            non_blank(&params.end_time),
        )?;
        let spatial = match (params.latitude, params.longitude, params.radius_km) {
            (Some(lat), Some(lon), Some(radius)) => Some(SpatialFilter::from_point(lat, lon, radius)?),
            _ => None,
        };
        Ok(Self {
            time,
            unit: non_blank(&params.unit).map(str::to_string),
            spatial,
        })
    }

    /// `/sightings/search/mgrs`: MGRS and radius are required, time and unit optional.
    pub fn mgrs(
        params: &SearchParams,
        converter: &dyn CoordinateConverter,
    ) -> Result<Self, SearchError> {
        let time = TimeRange::from_bounds(
            non_blank(&params.start_time),
            non_blank(&params.end_time),
        )?;
        let reference = non_blank(&params.mgrs).ok_or_else(|| {
            SearchError::IncompleteSpatialFilter("mgrs is required for MGRS search".into())
        })?;
        let radius = params.radius_km.ok_or_else(|| {
            SearchError::IncompleteSpatialFilter("radius_km is required when mgrs is supplied".into())
        })?;
        Ok(Self {
            time,
            unit: non_blank(&params.unit).map(str::to_string),
            spatial: Some(SpatialFilter::from_mgrs(converter, reference, radius)?),
        })
    }

    /// Predicates pushed down to the store.
    pub fn store_filter(&self) -> StoreFilter {
        StoreFilter {
            time: self.time,
            unit: self.unit.clone(),
            bounding_box: self.spatial.as_ref().map(SpatialFilter::bounding_box),
        }
    }
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Predicates a [`SightingStore`] must evaluate. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreFilter {
    /// Inclusive on both ends.
    pub time: Option<TimeRange>,
    /// Case-insensitive substring of the reporting unit.
    pub unit: Option<String>,
    pub bounding_box: Option<BoundingBox>,
}

impl StoreFilter {
    /// Evaluate the filter in memory, for stores without a query engine.
    pub fn matches(&self, time: Timestamp, unit: Option<&str>, position: &GeoPoint) -> bool {
        self.time.is_none_or(|range| range.contains(time))
            && self
                .unit
                .as_deref()
                .is_none_or(|needle| unit_contains(unit, needle))
            && self.bounding_box.is_none_or(|bbox| bbox.contains(position))
    }
}

/// Case-insensitive "contains" used for the unit filter.
pub fn unit_contains(unit: Option<&str>, needle: &str) -> bool {
    unit.is_some_and(|u| u.to_lowercase().contains(&needle.to_lowercase()))
}

/// Escape `%`, `_` and `\` so user input matches literally inside a `LIKE` pattern.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Read access to stored sightings.
#[async_trait]
pub trait SightingStore: Send + Sync {
    type Record: Located + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every record matching `filter`, in the store's natural order.
    async fn find(&self, filter: &StoreFilter) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Execute a validated query against `store`.
///
/// Non-spatial queries return the store's result untouched. Spatial queries
/// are narrowed to the exact radius and ranked by distance.
pub async fn search<S>(store: &S, query: &SightingQuery) -> Result<Vec<S::Record>, S::Error>
where
    S: SightingStore + ?Sized,
{
    let candidates = store.find(&query.store_filter()).await?;
    Ok(match &query.spatial {
        Some(spatial) => spatial.apply(candidates),
        None => candidates,
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 timestamp from a query string.
///
/// Accepts RFC 3339 (with offset or `Z`), offset-less date-times with or
/// without seconds (`T` or space separator, read as UTC), and bare dates
/// (midnight UTC).
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<Timestamp, SearchError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(SearchError::InvalidTimeFormat {
        field,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;
    use crate::geo::EARTH_RADIUS_KM;
    use crate::mgrs::{MgrsError, UtmGridConverter};

    // -- fixtures ----------------------------------------------------------

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        time: Timestamp,
        unit: Option<String>,
        point: GeoPoint,
    }

    impl Located for Row {
        fn position(&self) -> GeoPoint {
            self.point
        }
    }

    /// In-memory store that also counts the rows it hands back.
    #[derive(Default)]
    struct MemoryStore {
        rows: Vec<Row>,
        returned: AtomicUsize,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("store offline")]
    struct Offline;

    #[async_trait]
    impl SightingStore for MemoryStore {
        type Record = Row;
        type Error = Offline;

        async fn find(&self, filter: &StoreFilter) -> Result<Vec<Row>, Offline> {
            let rows: Vec<Row> = self
                .rows
                .iter()
                .filter(|r| filter.matches(r.time, r.unit.as_deref(), &r.point))
                .cloned()
                .collect();
            self.returned.fetch_add(rows.len(), Ordering::SeqCst);
            Ok(rows)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SightingStore for FailingStore {
        type Record = Row;
        type Error = Offline;

        async fn find(&self, _filter: &StoreFilter) -> Result<Vec<Row>, Offline> {
            Err(Offline)
        }
    }

    const CENTER: GeoPoint = GeoPoint {
        latitude: 49.45,
        longitude: 7.56,
    };

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 9, 10, h, m, 0).unwrap()
    }

    fn north_of(p: GeoPoint, km: f64) -> GeoPoint {
        GeoPoint::new(p.latitude + (km / EARTH_RADIUS_KM).to_degrees(), p.longitude)
    }

    fn row(id: i64, time: Timestamp, unit: Option<&str>, point: GeoPoint) -> Row {
        Row {
            id,
            time,
            unit: unit.map(str::to_string),
            point,
        }
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    fn store(rows: Vec<Row>) -> MemoryStore {
        MemoryStore {
            rows,
            returned: AtomicUsize::new(0),
        }
    }

    fn params() -> SearchParams {
        SearchParams::default()
    }

    // -- timestamp parsing -------------------------------------------------

    #[test]
    fn parses_minute_precision_iso() {
        assert_eq!(parse_timestamp("start_time", "2025-09-10T09:00").unwrap(), at(9, 0));
    }

    #[test]
    fn parses_second_precision_and_space_separator() {
        assert_eq!(parse_timestamp("t", "2025-09-10T09:00:00").unwrap(), at(9, 0));
        assert_eq!(parse_timestamp("t", "2025-09-10 17:00").unwrap(), at(17, 0));
    }

    #[test]
    fn parses_offsets_into_utc() {
        assert_eq!(parse_timestamp("t", "2025-09-10T11:00:00+02:00").unwrap(), at(9, 0));
        assert_eq!(parse_timestamp("t", "2025-09-10T09:00:00Z").unwrap(), at(9, 0));
        assert_eq!(parse_timestamp("t", "2025-09-10T11:00+02:00").unwrap(), at(9, 0));
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        assert_eq!(parse_timestamp("t", "2025-09-10").unwrap(), at(0, 0));
    }

    #[test]
    fn rejects_garbage_time() {
        assert_matches!(
            parse_timestamp("end_time", "yesterday"),
            Err(SearchError::InvalidTimeFormat { field: "end_time", .. })
        );
        assert_matches!(
            parse_timestamp("end_time", "2025-13-40T99:00"),
            Err(SearchError::InvalidTimeFormat { .. })
        );
    }

    // -- query construction ------------------------------------------------

    #[test]
    fn one_sided_time_range_is_incomplete() {
        let p = SearchParams {
            start_time: Some("2025-09-10T09:00".into()),
            ..params()
        };
        assert_matches!(SightingQuery::combined(&p), Err(SearchError::IncompleteTimeRange));
        assert_matches!(SightingQuery::time_window(&p), Err(SearchError::IncompleteTimeRange));
    }

    #[test]
    fn time_endpoint_requires_bounds() {
        assert_matches!(
            SightingQuery::time_window(&params()),
            Err(SearchError::IncompleteTimeRange)
        );
    }

    #[test]
    fn reversed_range_is_invalid_regardless_of_other_params() {
        let reversed = SearchParams {
            start_time: Some("2025-09-10T17:00".into()),
            end_time: Some("2025-09-10T09:00".into()),
            ..params()
        };
        let with_everything = SearchParams {
            latitude: Some(999.0),
            longitude: Some(7.56),
            radius_km: Some(-1.0),
            mgrs: Some("garbage".into()),
            unit: Some("x".into()),
            ..reversed.clone()
        };
        assert_matches!(SightingQuery::time_window(&reversed), Err(SearchError::InvalidRange));
        assert_matches!(SightingQuery::combined(&with_everything), Err(SearchError::InvalidRange));
        assert_matches!(
            SightingQuery::mgrs(&with_everything, &UtmGridConverter),
            Err(SearchError::InvalidRange)
        );
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let p = SearchParams {
            start_time: Some("2025-09-10T09:00".into()),
            end_time: Some("2025-09-10T09:00".into()),
            ..params()
        };
        let q = SightingQuery::time_window(&p).unwrap();
        assert_eq!(q.time, Some(TimeRange { start: at(9, 0), end: at(9, 0) }));
    }

    #[test]
    fn blank_strings_are_absent() {
        let p = SearchParams {
            start_time: Some("".into()),
            end_time: Some("  ".into()),
            unit: Some(" ".into()),
            ..params()
        };
        assert_eq!(SightingQuery::combined(&p).unwrap(), SightingQuery::default());
    }

    #[test]
    fn partial_triple_disables_spatial_filter() {
        let p = SearchParams {
            latitude: Some(49.45),
            longitude: Some(7.56),
            ..params()
        };
        assert_eq!(SightingQuery::combined(&p).unwrap().spatial, None);
    }

    #[test]
    fn proximity_endpoint_requires_full_triple() {
        let p = SearchParams {
            latitude: Some(49.45),
            radius_km: Some(5.0),
            ..params()
        };
        assert_matches!(
            SightingQuery::proximity(&p),
            Err(SearchError::IncompleteSpatialFilter(_))
        );
    }

    #[test]
    fn radius_bounds_are_enforced() {
        for bad in [0.0, -3.0, 1000.5, f64::NAN, f64::INFINITY] {
            assert_matches!(
                validate_radius(bad),
                Err(SearchError::IncompleteSpatialFilter(_)),
                "radius {bad} should be rejected"
            );
        }
        assert_eq!(validate_radius(1000.0).unwrap(), 1000.0);
        assert_eq!(validate_radius(0.001).unwrap(), 0.001);
    }

    #[test]
    fn out_of_range_center_is_invalid_coordinate() {
        assert_matches!(
            SpatialFilter::from_point(91.0, 0.0, 5.0),
            Err(SearchError::InvalidCoordinate(_))
        );
        assert_matches!(
            SpatialFilter::from_point(0.0, 181.0, 5.0),
            Err(SearchError::InvalidCoordinate(_))
        );
    }

    #[test]
    fn mgrs_requires_radius() {
        let p = SearchParams {
            mgrs: Some("18SUJ234678".into()),
            ..params()
        };
        assert_matches!(
            SightingQuery::mgrs(&p, &UtmGridConverter),
            Err(SearchError::IncompleteSpatialFilter(_))
        );
    }

    #[test]
    fn malformed_mgrs_is_invalid_coordinate() {
        let p = SearchParams {
            mgrs: Some("ZZ000000000".into()),
            radius_km: Some(5.0),
            ..params()
        };
        assert_matches!(
            SightingQuery::mgrs(&p, &UtmGridConverter),
            Err(SearchError::InvalidCoordinate(_))
        );
    }

    #[test]
    fn mgrs_center_comes_from_converter() {
        struct Fixed;
        impl CoordinateConverter for Fixed {
            fn to_lat_lon(&self, reference: &str) -> Result<GeoPoint, MgrsError> {
                assert_eq!(reference, "32UMV");
                Ok(GeoPoint::new(49.45, 7.56))
            }
        }
        let p = SearchParams {
            mgrs: Some(" 32UMV ".into()),
            radius_km: Some(5.0),
            unit: Some("Recon".into()),
            ..params()
        };
        let q = SightingQuery::mgrs(&p, &Fixed).unwrap();
        assert_eq!(q.spatial.unwrap().center, CENTER);
        assert_eq!(q.unit.as_deref(), Some("Recon"));
    }

    #[test]
    fn store_filter_carries_box_only_for_spatial_queries() {
        let p = SearchParams {
            unit: Some("alpha".into()),
            ..params()
        };
        let filter = SightingQuery::combined(&p).unwrap().store_filter();
        assert_eq!(filter.unit.as_deref(), Some("alpha"));
        assert!(filter.bounding_box.is_none());

        let q = SightingQuery::proximity(&SearchParams {
            latitude: Some(49.45),
            longitude: Some(7.56),
            radius_km: Some(5.0),
            ..params()
        })
        .unwrap();
        let bbox = q.store_filter().bounding_box.unwrap();
        assert!(bbox.contains(&CENTER));
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("1st_BN 100%"), "1st\\_BN 100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn unit_match_is_case_insensitive_substring() {
        assert!(unit_contains(Some("2nd Cavalry Regiment"), "CAVALRY"));
        assert!(!unit_contains(Some("2nd Cavalry Regiment"), "infantry"));
        assert!(!unit_contains(None, "cavalry"));
    }

    // -- composer ----------------------------------------------------------

    #[tokio::test]
    async fn time_window_is_inclusive() {
        let s = store(vec![
            row(1, at(8, 59), None, CENTER),
            row(2, at(9, 0), None, CENTER),
            row(3, at(12, 30), None, CENTER),
            row(4, at(17, 0), None, CENTER),
            row(5, at(17, 1), None, CENTER),
        ]);
        let q = SightingQuery::time_window(&SearchParams {
            start_time: Some("2025-09-10T09:00".into()),
            end_time: Some("2025-09-10T17:00".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn proximity_keeps_only_points_inside_radius() {
        let s = store(vec![
            row(1, at(10, 0), None, north_of(CENTER, 6.0)),
            row(2, at(10, 0), None, north_of(CENTER, 4.0)),
        ]);
        let q = SightingQuery::proximity(&SearchParams {
            latitude: Some(49.45),
            longitude: Some(7.56),
            radius_km: Some(5.0),
            ..params()
        })
        .unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![2]);
    }

    #[tokio::test]
    async fn radius_is_inclusive() {
        let edge = north_of(CENTER, 5.0);
        let s = store(vec![row(1, at(10, 0), None, edge)]);
        let q = SightingQuery {
            spatial: Some(SpatialFilter {
                center: CENTER,
                radius_km: CENTER.distance_to(&edge),
            }),
            ..SightingQuery::default()
        };
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn combined_is_intersection_ranked_by_distance() {
        let s = store(vec![
            row(1, at(10, 0), None, north_of(CENTER, 3.0)),
            row(2, at(18, 0), None, north_of(CENTER, 1.0)), // outside window
            row(3, at(11, 0), None, north_of(CENTER, 0.5)),
            row(4, at(12, 0), None, north_of(CENTER, 8.0)), // outside radius
            row(5, at(13, 0), None, north_of(CENTER, 2.0)),
        ]);
        let q = SightingQuery::combined(&SearchParams {
            start_time: Some("2025-09-10T09:00".into()),
            end_time: Some("2025-09-10T17:00".into()),
            latitude: Some(49.45),
            longitude: Some(7.56),
            radius_km: Some(5.0),
            ..params()
        })
        .unwrap();
        let results = search(&s, &q).await.unwrap();
        assert_eq!(ids(&results), vec![3, 5, 1]);

        for pair in results.windows(2) {
            assert!(CENTER.distance_to(&pair[0].point) <= CENTER.distance_to(&pair[1].point));
        }
    }

    #[tokio::test]
    async fn equidistant_results_keep_store_order() {
        let p = north_of(CENTER, 1.0);
        let s = store(vec![
            row(7, at(10, 0), None, p),
            row(3, at(10, 0), None, north_of(CENTER, 0.2)),
            row(5, at(10, 0), None, p),
            row(1, at(10, 0), None, p),
        ]);
        let q = SightingQuery {
            spatial: Some(SpatialFilter::from_point(49.45, 7.56, 5.0).unwrap()),
            ..SightingQuery::default()
        };
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![3, 7, 5, 1]);
    }

    #[tokio::test]
    async fn lat_lon_without_radius_leaves_result_unmodified() {
        let rows = vec![
            row(4, at(10, 0), Some("Alpha"), north_of(CENTER, 500.0)),
            row(2, at(11, 0), Some("alpha co"), CENTER),
            row(9, at(12, 0), Some("Bravo"), CENTER),
        ];
        let s = store(rows);
        let q = SightingQuery::combined(&SearchParams {
            latitude: Some(49.45),
            longitude: Some(7.56),
            unit: Some("ALPHA".into()),
            ..params()
        })
        .unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![4, 2]);
    }

    #[tokio::test]
    async fn no_filters_returns_store_order() {
        let s = store(vec![
            row(3, at(10, 0), None, CENTER),
            row(1, at(9, 0), None, north_of(CENTER, 900.0)),
            row(2, at(8, 0), None, CENTER),
        ]);
        let q = SightingQuery::combined(&params()).unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn bounding_box_prefilters_far_candidates() {
        let mut rows: Vec<Row> = (0..50)
            .map(|i| row(i, at(10, 0), None, north_of(CENTER, 50.0 + i as f64)))
            .collect();
        rows.push(row(100, at(10, 0), None, north_of(CENTER, 1.0)));
        let s = store(rows);
        let q = SightingQuery::proximity(&SearchParams {
            latitude: Some(49.45),
            longitude: Some(7.56),
            radius_km: Some(5.0),
            ..params()
        })
        .unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![100]);
        assert_eq!(s.returned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mgrs_search_finds_sightings_near_reference() {
        let center = crate::mgrs::mgrs_to_lat_lon("18SUJ234678").unwrap();
        let s = store(vec![
            row(1, at(10, 0), None, north_of(center, 2.0)),
            row(2, at(10, 0), None, north_of(center, 30.0)),
            row(3, at(10, 0), None, center),
        ]);
        let q = SightingQuery::mgrs(
            &SearchParams {
                mgrs: Some("18S UJ 234 678".into()),
                radius_km: Some(10.0),
                ..params()
            },
            &UtmGridConverter,
        )
        .unwrap();
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![3, 1]);
    }

    #[tokio::test]
    async fn search_across_antimeridian() {
        let center = GeoPoint::new(-17.0, 179.95);
        let s = store(vec![
            row(1, at(10, 0), None, GeoPoint::new(-17.0, -179.97)),
            row(2, at(10, 0), None, GeoPoint::new(-17.0, 179.0)),
        ]);
        let q = SightingQuery {
            spatial: Some(SpatialFilter {
                center,
                radius_km: 20.0,
            }),
            ..SightingQuery::default()
        };
        assert_eq!(ids(&search(&s, &q).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let q = SightingQuery::default();
        assert_matches!(search(&FailingStore, &q).await, Err(Offline));
    }
}
