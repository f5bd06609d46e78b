//! Sighting entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uas_core::error::CoreError;
use uas_core::geo::{GeoPoint, Located};
use uas_core::sighting::{
    deserialize_optional_timestamp, deserialize_timestamp, require_text, validate_position,
    validate_references,
};
use uas_core::types::{DbId, Timestamp};

/// A row from the `uas_sightings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sighting {
    pub id: DbId,
    pub type_of_sighting: String,
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub description: String,
    pub symbol_code: Option<String>,
    /// Parent command of the reporting unit.
    pub ascc: Option<String>,
    pub unit: Option<String>,
    pub image_urls: Json<Vec<String>>,
    pub created_at: Timestamp,
    /// `None` until the first update.
    pub updated_at: Option<Timestamp>,
}

impl Located for Sighting {
    fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// DTO for reporting a new sighting.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSighting {
    pub type_of_sighting: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub description: String,
    pub symbol_code: Option<String>,
    pub ascc: Option<String>,
    pub unit: Option<String>,
    /// Defaults to an empty list.
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl CreateSighting {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("type_of_sighting", &self.type_of_sighting)?;
        require_text("location_name", &self.location_name)?;
        if self.description.trim().is_empty() {
            return Err(CoreError::Validation("description must not be empty".into()));
        }
        validate_references(
            self.symbol_code.as_deref(),
            self.ascc.as_deref(),
            self.unit.as_deref(),
        )?;
        validate_position(self.latitude, self.longitude)
    }
}

/// DTO for updating a sighting. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSighting {
    pub type_of_sighting: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub time: Option<Timestamp>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub description: Option<String>,
    pub symbol_code: Option<String>,
    pub ascc: Option<String>,
    pub unit: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

impl UpdateSighting {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(v) = &self.type_of_sighting {
            require_text("type_of_sighting", v)?;
        }
        if let Some(v) = &self.location_name {
            require_text("location_name", v)?;
        }
        if self.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(CoreError::Validation("description must not be empty".into()));
        }
        validate_references(
            self.symbol_code.as_deref(),
            self.ascc.as_deref(),
            self.unit.as_deref(),
        )?;
        // Each coordinate is checked against its own range; 0.0 is in range for both.
        validate_position(self.latitude.unwrap_or(0.0), self.longitude.unwrap_or(0.0))
    }
}
