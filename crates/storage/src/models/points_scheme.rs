use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Named position-to-points table, scoped to a league and optionally a
/// season. At most one scheme per (league, season scope) is marked default;
/// that invariant is enforced by the scheme CRUD, which lives outside this
/// subsystem. The resolver only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PointsScheme {
    pub id: Uuid,
    pub league_id: Uuid,
    pub season_id: Option<Uuid>,
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PointsRule {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub position: i32,
    pub points: i32,
}
