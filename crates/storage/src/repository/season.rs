use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Season;

pub struct SeasonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeasonRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Season> {
        let season = sqlx::query_as::<_, Season>(
            r#"
            SELECT id, league_id, name, is_active
            FROM seasons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(season)
    }

    /// The league's currently active season, if one is configured.
    pub async fn find_active(&self, league_id: Uuid) -> Result<Option<Season>> {
        let season = sqlx::query_as::<_, Season>(
            r#"
            SELECT id, league_id, name, is_active
            FROM seasons
            WHERE league_id = $1 AND is_active = true
            LIMIT 1
            "#,
        )
        .bind(league_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(season)
    }
}
