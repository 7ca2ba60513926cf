use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::models::EventStatus;

/// Unordered per-driver aggregate; ranking happens in the service layer.
#[derive(Debug, FromRow)]
pub struct StandingsRow {
    pub driver_id: Uuid,
    pub display_name: String,
    pub points: i64,
    pub wins: i64,
    pub best_finish: Option<i32>,
}

pub struct StandingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StandingsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One row per driver of the league, zero-result drivers included (the
    /// joins are LEFT so the table stays driver-complete). Only COMPLETED
    /// events count, and the season is matched exactly: `None` matches
    /// null-season events only, never all seasons.
    pub async fn aggregate(
        &self,
        league_id: Uuid,
        season_id: Option<Uuid>,
    ) -> Result<Vec<StandingsRow>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT
                d.id AS driver_id,
                d.display_name,
                COALESCE(SUM(CASE WHEN e.id IS NOT NULL THEN r.total_points ELSE 0 END), 0) AS points,
                COALESCE(SUM(CASE WHEN e.id IS NOT NULL AND r.finish_position = 1 THEN 1 ELSE 0 END), 0) AS wins,
                MIN(CASE WHEN e.id IS NOT NULL THEN r.finish_position END) AS best_finish
            FROM drivers d
            LEFT JOIN results r ON r.driver_id = d.id
            LEFT JOIN events e ON e.id = r.event_id
                AND e.league_id = d.league_id
                AND e.status =
            "#,
        );
        query.push_bind(EventStatus::Completed);

        match season_id {
            Some(season_id) => {
                query.push(" AND e.season_id = ");
                query.push_bind(season_id);
            }
            None => {
                query.push(" AND e.season_id IS NULL");
            }
        }

        query.push(" WHERE d.league_id = ");
        query.push_bind(league_id);
        query.push(" GROUP BY d.id, d.display_name");

        let rows: Vec<StandingsRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows)
    }
}
