//! Military Grid Reference System (MGRS) to latitude/longitude conversion.
//!
//! A reference such as `18SUJ234678` is decoded in three steps:
//!
//! 1. Grid zone designator: UTM zone number (1-60) and latitude band (C-X,
//!    skipping I and O).
//! 2. 100 km square identifier: column and row letters, resolved against the
//!    lettering set of the zone (six sets, repeating every six zones).
//! 3. Numeric easting/northing inside the square (0-5 digits each).
//!
//! The resulting UTM coordinate is projected back onto the WGS84 ellipsoid.
//! Polar references (bands A, B, Y, Z) use UPS and are not supported.

use std::sync::LazyLock;

use regex::Regex;

use crate::geo::GeoPoint;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// UTM scale factor on the central meridian.
const K0: f64 = 0.9996;

/// WGS84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 first eccentricity squared.
const WGS84_ECC_SQUARED: f64 = 0.006_694_38;

/// False easting applied to every UTM zone.
const FALSE_EASTING: f64 = 500_000.0;

/// False northing applied in the southern hemisphere.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Side of a 100 km grid square in metres.
const SQUARE_SIZE_M: f64 = 100_000.0;

/// Row letters repeat every 2,000 km of northing.
const ROW_CYCLE_M: f64 = 2_000_000.0;

/// Column letters (I and O are never used).
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Row letters (I and O are never used; rows stop at V).
const ROW_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUV";

/// First column letter of each of the six 100 km lettering sets.
const SET_ORIGIN_COLUMNS: &[u8; 6] = b"AJSAJS";

/// First row letter of each of the six 100 km lettering sets.
const SET_ORIGIN_ROWS: &[u8; 6] = b"AFAFAF";

/// Each lettering set spans eight 100 km columns.
const COLUMNS_PER_SET: usize = 8;

/// Maximum numeric digits (5 easting + 5 northing, 1 m precision).
pub const MAX_DIGITS: usize = 10;

static MGRS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})([A-Z])([A-Z])([A-Z])([0-9]*)$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an MGRS string cannot be converted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MgrsError {
    #[error("MGRS reference is empty")]
    Empty,

    #[error("'{0}' is not an MGRS reference (expected e.g. 18SUJ234678)")]
    Malformed(String),

    #[error("UTM zone {0} is out of range (1-60)")]
    InvalidZone(u32),

    #[error("latitude band '{0}' is not a UTM band (C-X, excluding I and O)")]
    InvalidBand(char),

    #[error("100 km square '{0}' does not exist in zone {1}")]
    InvalidSquare(String, u32),

    #[error("easting/northing '{0}' must have an even number of digits, at most 10")]
    InvalidDigits(String),

    #[error("MGRS reference decodes outside valid latitude/longitude ranges")]
    OutOfRange,
}

// ---------------------------------------------------------------------------
// Converter seam
// ---------------------------------------------------------------------------

/// Converts grid references into geographic coordinates.
///
/// The search layer depends on this trait rather than a concrete algorithm so
/// the conversion can be replaced by a validated library.
pub trait CoordinateConverter: Send + Sync {
    /// Convert an MGRS string to the center of the referenced grid square.
    fn to_lat_lon(&self, reference: &str) -> Result<GeoPoint, MgrsError>;
}

/// MGRS decoder built on the inverse transverse Mercator series for WGS84.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtmGridConverter;

impl CoordinateConverter for UtmGridConverter {
    fn to_lat_lon(&self, reference: &str) -> Result<GeoPoint, MgrsError> {
        let utm = decode(reference)?;
        let half = utm.precision_m / 2.0;
        let point = utm_to_lat_lon(utm.easting + half, utm.northing + half, utm.zone, utm.band);

        if !point.is_valid() {
            return Err(MgrsError::OutOfRange);
        }
        Ok(point)
    }
}

/// Convert an MGRS string with the default converter.
pub fn mgrs_to_lat_lon(reference: &str) -> Result<GeoPoint, MgrsError> {
    UtmGridConverter.to_lat_lon(reference)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded MGRS reference: the south-west corner of its square in UTM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoordinate {
    pub zone: u32,
    pub band: char,
    pub easting: f64,
    pub northing: f64,
    /// Side of the referenced square in metres (1 for a 10-digit reference).
    pub precision_m: f64,
}

/// Parse an MGRS string into UTM. Whitespace is ignored and letters are case-folded.
pub fn decode(reference: &str) -> Result<UtmCoordinate, MgrsError> {
    let cleaned: String = reference
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if cleaned.is_empty() {
        return Err(MgrsError::Empty);
    }

    let caps = MGRS_RE
        .captures(&cleaned)
        .ok_or_else(|| MgrsError::Malformed(reference.trim().to_string()))?;

    let zone: u32 = caps[1]
        .parse()
        .map_err(|_| MgrsError::Malformed(reference.trim().to_string()))?;
    if !(1..=60).contains(&zone) {
        return Err(MgrsError::InvalidZone(zone));
    }

    let band = caps[2].as_bytes()[0] as char;
    let min_northing = band_min_northing(band).ok_or(MgrsError::InvalidBand(band))?;

    let column = caps[3].as_bytes()[0];
    let row = caps[4].as_bytes()[0];
    let set = lettering_set(zone);
    let square_err = || MgrsError::InvalidSquare(format!("{}{}", column as char, row as char), zone);

    let east_100k = column_easting(column, set).ok_or_else(square_err)?;
    let mut north_100k = row_northing(row, set).ok_or_else(square_err)?;
    while north_100k < min_northing {
        north_100k += ROW_CYCLE_M;
    }

    let digits = &caps[5];
    if digits.len() % 2 != 0 || digits.len() > MAX_DIGITS {
        return Err(MgrsError::InvalidDigits(digits.to_string()));
    }
    let half = digits.len() / 2;
    let precision_m = 10f64.powi(5 - half as i32);
    let (east_digits, north_digits) = digits.split_at(half);

    Ok(UtmCoordinate {
        zone,
        band,
        easting: east_100k + parse_digits(east_digits, digits)? * precision_m,
        northing: north_100k + parse_digits(north_digits, digits)? * precision_m,
        precision_m,
    })
}

/// Parse one half of the numeric part. An empty half (square-only reference) is 0.
fn parse_digits(half: &str, all: &str) -> Result<f64, MgrsError> {
    if half.is_empty() {
        return Ok(0.0);
    }
    half.parse::<u32>()
        .map(f64::from)
        .map_err(|_| MgrsError::InvalidDigits(all.to_string()))
}

/// Lettering set (1-6) used by a UTM zone.
fn lettering_set(zone: u32) -> usize {
    match (zone % 6) as usize {
        0 => 6,
        n => n,
    }
}

fn letter_index(alphabet: &[u8], letter: u8) -> Option<usize> {
    alphabet.iter().position(|&c| c == letter)
}

/// Easting of the west edge of the 100 km column `letter` in lettering `set`.
fn column_easting(letter: u8, set: usize) -> Option<f64> {
    let origin = letter_index(COLUMN_LETTERS, SET_ORIGIN_COLUMNS[set - 1])?;
    let index = letter_index(COLUMN_LETTERS, letter)?;
    let offset = (index + COLUMN_LETTERS.len() - origin) % COLUMN_LETTERS.len();
    if offset >= COLUMNS_PER_SET {
        return None;
    }
    Some((offset as f64 + 1.0) * SQUARE_SIZE_M)
}

/// Northing (modulo 2,000 km) of the south edge of row `letter` in lettering `set`.
fn row_northing(letter: u8, set: usize) -> Option<f64> {
    let origin = letter_index(ROW_LETTERS, SET_ORIGIN_ROWS[set - 1])?;
    let index = letter_index(ROW_LETTERS, letter)?;
    let offset = (index + ROW_LETTERS.len() - origin) % ROW_LETTERS.len();
    Some(offset as f64 * SQUARE_SIZE_M)
}

/// Lowest northing found in a latitude band, or `None` for non-UTM bands.
fn band_min_northing(band: char) -> Option<f64> {
    let n = match band {
        'C' => 1_100_000.0,
        'D' => 2_000_000.0,
        'E' => 2_800_000.0,
        'F' => 3_700_000.0,
        'G' => 4_600_000.0,
        'H' => 5_500_000.0,
        'J' => 6_400_000.0,
        'K' => 7_300_000.0,
        'L' => 8_200_000.0,
        'M' => 9_100_000.0,
        'N' => 0.0,
        'P' => 800_000.0,
        'Q' => 1_700_000.0,
        'R' => 2_600_000.0,
        'S' => 3_500_000.0,
        'T' => 4_400_000.0,
        'U' => 5_300_000.0,
        'V' => 6_200_000.0,
        'W' => 7_000_000.0,
        'X' => 7_900_000.0,
        _ => return None,
    };
    Some(n)
}

// ---------------------------------------------------------------------------
// UTM -> geographic
// ---------------------------------------------------------------------------

/// Inverse transverse Mercator projection for a UTM coordinate.
fn utm_to_lat_lon(easting: f64, northing: f64, zone: u32, band: char) -> GeoPoint {
    let ecc2 = WGS84_ECC_SQUARED;
    let ecc_prime2 = ecc2 / (1.0 - ecc2);
    let e1 = (1.0 - (1.0 - ecc2).sqrt()) / (1.0 + (1.0 - ecc2).sqrt());

    let x = easting - FALSE_EASTING;
    let y = if band < 'N' {
        northing - FALSE_NORTHING_SOUTH
    } else {
        northing
    };

    let long_origin = f64::from(zone - 1) * 6.0 - 180.0 + 3.0;

    let m = y / K0;
    let mu = m / (WGS84_A * (1.0 - ecc2 / 4.0 - 3.0 * ecc2.powi(2) / 64.0 - 5.0 * ecc2.powi(3) / 256.0));

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = WGS84_A / (1.0 - ecc2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ecc_prime2 * cos_phi1.powi(2);
    let r1 = WGS84_A * (1.0 - ecc2) / (1.0 - ecc2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ecc_prime2) * d.powi(4)
                    / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ecc_prime2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ecc_prime2 + 24.0 * t1.powi(2))
            * d.powi(5)
            / 120.0)
        / cos_phi1;

    let mut longitude = long_origin + lon.to_degrees();
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }

    GeoPoint::new(lat.to_degrees(), longitude)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
