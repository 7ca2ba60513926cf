use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Driver;

pub struct DriverRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DriverRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Which of `ids` actually belong to `league_id`. Used for the tenancy
    /// check on submission: driver ids from another league are rejected.
    pub async fn find_ids_in_league(&self, league_id: Uuid, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let found = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM drivers
            WHERE league_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(league_id)
        .bind(ids.to_vec())
        .fetch_all(self.pool)
        .await?;

        Ok(found)
    }
}
