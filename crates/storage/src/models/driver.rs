use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Driver {
    pub id: Uuid,
    pub league_id: Uuid,
    pub display_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
