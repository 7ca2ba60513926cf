use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::League;

pub struct LeagueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeagueRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Soft-deleted leagues are invisible to this subsystem.
    pub async fn find_by_id(&self, id: Uuid) -> Result<League> {
        let league = sqlx::query_as::<_, League>(
            r#"
            SELECT id, created_at, name, slug, is_deleted
            FROM leagues
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(league)
    }
}
