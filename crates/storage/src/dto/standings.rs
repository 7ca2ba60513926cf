use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One ranked row of a championship table. `best_finish` is `None` for a
/// driver with no completed results; such drivers still appear (standings is
/// driver-complete, not results-complete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StandingsItem {
    pub driver_id: Uuid,
    pub display_name: String,
    pub points: i64,
    pub wins: i64,
    pub best_finish: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeasonStandings {
    pub league_id: Uuid,
    pub season_id: Option<Uuid>,
    pub items: Vec<StandingsItem>,
}
