//! Field rules for sighting reports.

use serde::{Deserialize, Deserializer};

use crate::error::CoreError;
use crate::search::parse_timestamp;
use crate::types::Timestamp;

pub const ENTITY: &str = "sighting";

/// Longest accepted value for the short text columns.
pub const MAX_SHORT_TEXT: usize = 255;

/// Longest accepted `symbol_code`.
pub const MAX_SYMBOL_CODE: usize = 50;

/// Reject positions outside the valid latitude/longitude ranges.
pub fn validate_position(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "latitude must be between -90 and 90, got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "longitude must be between -180 and 180, got {longitude}"
        )));
    }
    Ok(())
}

/// Required short text: non-blank and at most [`MAX_SHORT_TEXT`] characters.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_SHORT_TEXT {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_SHORT_TEXT} characters"
        )));
    }
    Ok(())
}

/// Optional text: when present, at most `max` characters.
pub fn require_max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Length limits of the optional reference fields.
pub fn validate_references(
    symbol_code: Option<&str>,
    ascc: Option<&str>,
    unit: Option<&str>,
) -> Result<(), CoreError> {
    require_max_len("symbol_code", symbol_code, MAX_SYMBOL_CODE)?;
    require_max_len("ascc", ascc, MAX_SHORT_TEXT)?;
    require_max_len("unit", unit, MAX_SHORT_TEXT)
}

/// Serde adapter accepting every timestamp layout the search endpoints accept.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp("time", &raw).map_err(serde::de::Error::custom)
}

/// Optional variant of [`deserialize_timestamp`]. Use with `#[serde(default)]`.
pub fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp("time", &raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
