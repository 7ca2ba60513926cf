use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{RaceResult, ResultStatus};

pub struct ResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<RaceResult>> {
        let results = sqlx::query_as::<_, RaceResult>(
            r#"
            SELECT id, event_id, driver_id, finish_position, started_position,
                   status, bonus_points, penalty_points, total_points
            FROM results
            WHERE event_id = $1
            ORDER BY finish_position
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(results)
    }
}

/// A fully computed row ready to persist. `total_points` is already floored
/// at zero by the caller.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub driver_id: Uuid,
    pub finish_position: i32,
    pub started_position: Option<i32>,
    pub status: ResultStatus,
    pub bonus_points: i32,
    pub penalty_points: i32,
    pub total_points: i32,
}

pub async fn delete_for_event(conn: &mut PgConnection, event_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM results WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn insert_for_event(
    conn: &mut PgConnection,
    event_id: Uuid,
    rows: &[NewResult],
) -> Result<Vec<RaceResult>> {
    let mut inserted = Vec::with_capacity(rows.len());
    for row in rows {
        let result = sqlx::query_as::<_, RaceResult>(
            r#"
            INSERT INTO results (
                event_id, driver_id, finish_position, started_position,
                status, bonus_points, penalty_points, total_points
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, event_id, driver_id, finish_position, started_position,
                      status, bonus_points, penalty_points, total_points
            "#,
        )
        .bind(event_id)
        .bind(row.driver_id)
        .bind(row.finish_position)
        .bind(row.started_position)
        .bind(row.status)
        .bind(row.bonus_points)
        .bind(row.penalty_points)
        .bind(row.total_points)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(result);
    }

    Ok(inserted)
}
