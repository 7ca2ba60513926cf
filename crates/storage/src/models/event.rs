use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Event lifecycle. COMPLETED is reached only through a successful results
/// submission; CANCELED is set externally and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub league_id: Uuid,
    pub season_id: Option<Uuid>,
    pub name: String,
    pub track: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub laps: Option<i32>,
    pub distance_km: Option<Decimal>,
    pub status: EventStatus,
}
