use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;

/// Before/after snapshot written alongside a mutation. This subsystem only
/// ever writes audit rows; reading them belongs to the audit surface.
#[derive(Debug)]
pub struct AuditEntry<'a> {
    pub actor_id: Uuid,
    pub league_id: Uuid,
    pub entity: &'a str,
    pub entity_id: String,
    pub action: &'a str,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
}

pub async fn record(conn: &mut PgConnection, entry: AuditEntry<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (
            actor_id, league_id, entity, entity_id, action, before_state, after_state
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entry.actor_id)
    .bind(entry.league_id)
    .bind(entry.entity)
    .bind(entry.entity_id)
    .bind(entry.action)
    .bind(entry.before)
    .bind(entry.after)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
