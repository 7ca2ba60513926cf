use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Event, EventStatus};

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, league_id, season_id, name, track, start_time,
                   laps, distance_km, status
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(event)
    }
}

/// Transition the event inside the ingestion transaction. Setting COMPLETED
/// on an already-COMPLETED event is a no-op difference-wise.
pub async fn mark_completed(conn: &mut PgConnection, event_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE events SET status = $2 WHERE id = $1")
        .bind(event_id)
        .bind(EventStatus::Completed)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
