use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    #[default]
    Finished,
    Dnf,
    Dns,
    Dsq,
}

/// One scored row per (event, driver). The full set for an event is replaced
/// atomically on every accepted submission; rows are never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RaceResult {
    pub id: Uuid,
    pub event_id: Uuid,
    pub driver_id: Uuid,
    pub finish_position: i32,
    pub started_position: Option<i32>,
    pub status: ResultStatus,
    pub bonus_points: i32,
    pub penalty_points: i32,
    pub total_points: i32,
}
