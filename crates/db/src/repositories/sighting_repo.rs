//! Repository for the `uas_sightings` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uas_core::search::{escape_like, StoreFilter};
use uas_core::types::DbId;

use crate::models::sighting::{CreateSighting, Sighting, UpdateSighting};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, type_of_sighting, time, latitude, longitude, location_name, \
    description, symbol_code, ascc, unit, image_urls, created_at, updated_at";

/// Provides CRUD and filtered search over sightings.
pub struct SightingRepo;

impl SightingRepo {
    /// Insert a new sighting, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSighting) -> Result<Sighting, sqlx::Error> {
        let query = format!(
            "INSERT INTO uas_sightings
                (type_of_sighting, time, latitude, longitude, location_name,
                 description, symbol_code, ascc, unit, image_urls)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sighting>(&query)
            .bind(&input.type_of_sighting)
            .bind(input.time)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.location_name)
            .bind(&input.description)
            .bind(&input.symbol_code)
            .bind(&input.ascc)
            .bind(&input.unit)
            .bind(Json(&input.image_urls))
            .fetch_one(pool)
            .await
    }

    /// Find a sighting by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sighting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM uas_sightings WHERE id = $1");
        sqlx::query_as::<_, Sighting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sightings in insertion (id) order with offset pagination.
    pub async fn list(pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<Sighting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM uas_sightings ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Sighting>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a sighting. Only non-`None` fields in `input` are applied and
    /// `updated_at` is always stamped.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSighting,
    ) -> Result<Option<Sighting>, sqlx::Error> {
        let query = format!(
            "UPDATE uas_sightings SET
                type_of_sighting = COALESCE($2, type_of_sighting),
                time = COALESCE($3, time),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                location_name = COALESCE($6, location_name),
                description = COALESCE($7, description),
                symbol_code = COALESCE($8, symbol_code),
                ascc = COALESCE($9, ascc),
                unit = COALESCE($10, unit),
                image_urls = COALESCE($11, image_urls),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sighting>(&query)
            .bind(id)
            .bind(&input.type_of_sighting)
            .bind(input.time)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.location_name)
            .bind(&input.description)
            .bind(&input.symbol_code)
            .bind(&input.ascc)
            .bind(&input.unit)
            .bind(input.image_urls.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Fetch sightings matching the coarse search predicates, ordered by id.
    ///
    /// `NULL` parameters disable their predicate. The longitude constraint is
    /// one range, two ranges (antimeridian split) or none (polar boxes).
    pub async fn search(pool: &PgPool, filter: &StoreFilter) -> Result<Vec<Sighting>, sqlx::Error> {
        let (start, end) = filter.time.map(|t| (t.start, t.end)).unzip();
        let unit = filter.unit.as_deref().map(escape_like);
        let (lat, (west, east)) = match filter.bounding_box {
            Some(bbox) => (Some((bbox.min_lat, bbox.max_lat)), bbox.longitude.ranges()),
            None => (None, (None, None)),
        };
        let (min_lat, max_lat) = lat.unzip();
        let (lon_a_min, lon_a_max) = west.unzip();
        let (lon_b_min, lon_b_max) = east.unzip();

        let query = format!(
            r"SELECT {COLUMNS} FROM uas_sightings
              WHERE ($1::timestamptz IS NULL OR time >= $1)
                AND ($2::timestamptz IS NULL OR time <= $2)
                AND ($3::text IS NULL OR unit ILIKE '%' || $3 || '%' ESCAPE '\')
                AND ($4::float8 IS NULL OR latitude BETWEEN $4 AND $5::float8)
                AND (
                    $6::float8 IS NULL
                    OR longitude BETWEEN $6 AND $7::float8
                    OR ($8::float8 IS NOT NULL AND longitude BETWEEN $8 AND $9::float8)
                )
              ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Sighting>(&query)
            .bind(start)
            .bind(end)
            .bind(unit)
            .bind(min_lat)
            .bind(max_lat)
            .bind(lon_a_min)
            .bind(lon_a_max)
            .bind(lon_b_min)
            .bind(lon_b_max)
            .fetch_all(pool)
            .await?;

        tracing::debug!(
            candidates = rows.len(),
            has_time = filter.time.is_some(),
            has_unit = filter.unit.is_some(),
            has_box = filter.bounding_box.is_some(),
            "Sighting search prefilter",
        );
        Ok(rows)
    }
}
