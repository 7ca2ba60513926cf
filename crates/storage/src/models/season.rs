use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Season {
    pub id: Uuid,
    pub league_id: Uuid,
    pub name: String,
    pub is_active: bool,
}
