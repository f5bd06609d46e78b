//! Geodesy helpers: points, great-circle distance and bounding boxes.
//!
//! Distances use the haversine formula on a spherical Earth. Bounding boxes
//! are coarse prefilters that are always a superset of the exact radius.

use std::fmt;

/// Mean Earth radius used for all distance computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude in the flat-Earth box approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Floor applied to `cos(latitude)` so the longitude delta stays finite near the poles.
pub const MIN_COS_LATITUDE: f64 = 1e-6;

/// Slack added to every box edge so points exactly on the radius survive
/// floating-point rounding in the store comparison.
const BOX_PADDING_DEG: f64 = 1e-9;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their degree ranges.
    pub fn is_valid(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_km(self, other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Anything with a fixed position on the globe.
///
/// Implemented by stored sightings so the search composer can filter and
/// rank them without knowing their concrete type.
pub trait Located {
    fn position(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Haversine great-circle distance between two points, in kilometres.
///
/// Symmetric and zero for coincident points. Inputs outside the valid degree
/// ranges produce meaningless results; validate before calling.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `h` a hair above 1 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

// ---------------------------------------------------------------------------
// Bounding boxes
// ---------------------------------------------------------------------------

/// Longitude constraint of a [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudeSpan {
    /// Every longitude qualifies (the circle reaches a pole or wraps the globe).
    Any,
    /// A single inclusive `[west, east]` range.
    Range(f64, f64),
    /// The box crosses the antimeridian: two inclusive ranges, either may match.
    Split((f64, f64), (f64, f64)),
}

impl LongitudeSpan {
    pub fn contains(&self, lon: f64) -> bool {
        match *self {
            Self::Any => true,
            Self::Range(w, e) => (w..=e).contains(&lon),
            Self::Split((w1, e1), (w2, e2)) => (w1..=e1).contains(&lon) || (w2..=e2).contains(&lon),
        }
    }

    /// The span as up to two `(west, east)` ranges, for binding into store queries.
    pub fn ranges(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        match *self {
            Self::Any => (None, None),
            Self::Range(w, e) => (Some((w, e)), None),
            Self::Split(a, b) => (Some(a), Some(b)),
        }
    }
}

/// Coarse latitude/longitude rectangle around a search center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub longitude: LongitudeSpan,
}

impl BoundingBox {
    /// Box enclosing every point within `radius_km` of `center`.
    ///
    /// Latitude uses `radius / 111`. Longitude uses the flat-Earth
    /// `radius / (111 * cos(lat))`, widened to the exact spherical bound when
    /// that is larger so the box never excludes a point inside the circle.
    pub fn around(center: &GeoPoint, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE + BOX_PADDING_DEG;
        let north = center.latitude + lat_delta;
        let south = center.latitude - lat_delta;

        let min_lat = south.max(MIN_LAT);
        let max_lat = north.min(MAX_LAT);

        if north >= MAX_LAT || south <= MIN_LAT {
            return Self {
                min_lat,
                max_lat,
                longitude: LongitudeSpan::Any,
            };
        }

        let cos_lat = center.latitude.to_radians().cos().max(MIN_COS_LATITUDE);
        let flat_delta = radius_km / (KM_PER_DEGREE * cos_lat);

        let angular = radius_km / EARTH_RADIUS_KM;
        let ratio = angular.sin() / cos_lat;
        let spherical_delta = if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
            f64::INFINITY
        } else {
            ratio.asin().to_degrees()
        };

        let lon_delta = flat_delta.max(spherical_delta) + BOX_PADDING_DEG;
        if lon_delta >= 180.0 {
            return Self {
                min_lat,
                max_lat,
                longitude: LongitudeSpan::Any,
            };
        }

        let west = center.longitude - lon_delta;
        let east = center.longitude + lon_delta;
        let longitude = if west < MIN_LON {
            LongitudeSpan::Split((west + 360.0, MAX_LON), (MIN_LON, east))
        } else if east > MAX_LON {
            LongitudeSpan::Split((west, MAX_LON), (MIN_LON, east - 360.0))
        } else {
            LongitudeSpan::Range(west, east)
        };

        Self {
            min_lat,
            max_lat,
            longitude,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && self.longitude.contains(point.longitude)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
