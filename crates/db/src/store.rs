//! PostgreSQL-backed [`SightingStore`].

use async_trait::async_trait;
use uas_core::search::{SightingStore, StoreFilter};

use crate::models::sighting::Sighting;
use crate::repositories::SightingRepo;
use crate::DbPool;

/// Runs search prefilters through [`SightingRepo::search`].
#[derive(Debug, Clone)]
pub struct PgSightingStore {
    pool: DbPool,
}

impl PgSightingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SightingStore for PgSightingStore {
    type Record = Sighting;
    type Error = sqlx::Error;

    async fn find(&self, filter: &StoreFilter) -> Result<Vec<Sighting>, sqlx::Error> {
        SightingRepo::search(&self.pool, filter).await
    }
}
