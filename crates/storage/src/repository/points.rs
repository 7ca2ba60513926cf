use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::PointsRule;

pub struct PointsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PointsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Rules of the default scheme at one scope level, ordered by position.
    /// `season_id = None` selects the league-wide (no season) scope, not all
    /// seasons. Returns `None` when no default scheme exists at that scope.
    pub async fn default_scheme_rules(
        &self,
        league_id: Uuid,
        season_id: Option<Uuid>,
    ) -> Result<Option<Vec<PointsRule>>> {
        let scheme_id = match season_id {
            Some(season_id) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    SELECT id FROM points_schemes
                    WHERE league_id = $1 AND season_id = $2 AND is_default = true
                    LIMIT 1
                    "#,
                )
                .bind(league_id)
                .bind(season_id)
                .fetch_optional(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    SELECT id FROM points_schemes
                    WHERE league_id = $1 AND season_id IS NULL AND is_default = true
                    LIMIT 1
                    "#,
                )
                .bind(league_id)
                .fetch_optional(self.pool)
                .await?
            }
        };

        let Some(scheme_id) = scheme_id else {
            return Ok(None);
        };

        let rules = sqlx::query_as::<_, PointsRule>(
            r#"
            SELECT id, scheme_id, position, points
            FROM points_rules
            WHERE scheme_id = $1
            ORDER BY position
            "#,
        )
        .bind(scheme_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(rules))
    }
}
