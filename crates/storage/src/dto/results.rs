use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Event, RaceResult, ResultStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResultEntryCreate {
    pub driver_id: Uuid,
    #[validate(range(min = 1))]
    pub finish_position: i32,
    #[validate(range(min = 1))]
    pub started_position: Option<i32>,
    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bonus_points: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub penalty_points: i32,
}

/// An empty entry list is deliberately not a schema error: ingestion rejects
/// it with its own distinct code after the event lookup.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResultSubmission {
    #[validate(nested)]
    pub entries: Vec<ResultEntryCreate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultEntryRead {
    pub driver_id: Uuid,
    pub finish_position: i32,
    pub started_position: Option<i32>,
    pub status: ResultStatus,
    pub bonus_points: i32,
    pub penalty_points: i32,
    pub total_points: i32,
}

impl From<&RaceResult> for ResultEntryRead {
    fn from(row: &RaceResult) -> Self {
        Self {
            driver_id: row.driver_id,
            finish_position: row.finish_position,
            started_position: row.started_position,
            status: row.status,
            bonus_points: row.bonus_points,
            penalty_points: row.penalty_points,
            total_points: row.total_points,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventResults {
    pub event_id: Uuid,
    pub league_id: Uuid,
    pub season_id: Option<Uuid>,
    pub items: Vec<ResultEntryRead>,
}

impl EventResults {
    /// Rows are presented in finish order regardless of insertion order.
    pub fn from_rows(event: &Event, mut rows: Vec<RaceResult>) -> Self {
        rows.sort_by_key(|row| row.finish_position);
        Self {
            event_id: event.id,
            league_id: event.league_id,
            season_id: event.season_id,
            items: rows.iter().map(ResultEntryRead::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(finish_position: i32) -> ResultEntryCreate {
        ResultEntryCreate {
            driver_id: Uuid::new_v4(),
            finish_position,
            started_position: None,
            status: ResultStatus::Finished,
            bonus_points: 0,
            penalty_points: 0,
        }
    }

    #[test]
    fn empty_entry_lists_pass_schema_validation() {
        // The emptiness rejection belongs to ingestion, where it carries its
        // own error code instead of a generic validation failure.
        let submission = ResultSubmission { entries: vec![] };
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn field_constraints_are_checked_per_entry() {
        let submission = ResultSubmission {
            entries: vec![entry(0)],
        };
        assert!(submission.validate().is_err());

        let submission = ResultSubmission {
            entries: vec![entry(1)],
        };
        assert!(submission.validate().is_ok());
    }
}
