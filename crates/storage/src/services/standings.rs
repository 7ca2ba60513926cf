//! Championship table aggregation and ordering.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::standings::StandingsItem;
use crate::error::Result;
use crate::repository::standings::{StandingsRepository, StandingsRow};

/// Strict total order: points desc, wins desc, best finish asc with "never
/// finished" after any real position, then display name case-insensitively
/// as the final deterministic tie-break.
pub(crate) fn rank(rows: Vec<StandingsRow>) -> Vec<StandingsItem> {
    let mut items: Vec<StandingsItem> = rows
        .into_iter()
        .map(|row| StandingsItem {
            driver_id: row.driver_id,
            display_name: row.display_name,
            points: row.points,
            wins: row.wins,
            best_finish: row.best_finish,
        })
        .collect();

    items.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| {
                let a_best = a.best_finish.unwrap_or(i32::MAX);
                let b_best = b.best_finish.unwrap_or(i32::MAX);
                a_best.cmp(&b_best)
            })
            .then_with(|| {
                a.display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase())
            })
    });

    items
}

/// Aggregate persisted results into the ranked table for (league, season).
/// Every driver of the league appears, zero-result drivers included.
pub async fn calculate(
    pool: &PgPool,
    league_id: Uuid,
    season_id: Option<Uuid>,
) -> Result<Vec<StandingsItem>> {
    let rows = StandingsRepository::new(pool)
        .aggregate(league_id, season_id)
        .await?;
    Ok(rank(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, points: i64, wins: i64, best_finish: Option<i32>) -> StandingsRow {
        StandingsRow {
            driver_id: Uuid::new_v4(),
            display_name: name.to_string(),
            points,
            wins,
            best_finish,
        }
    }

    fn names(items: &[StandingsItem]) -> Vec<&str> {
        items.iter().map(|item| item.display_name.as_str()).collect()
    }

    #[test]
    fn points_dominate_the_ordering() {
        let ranked = rank(vec![
            row("Second", 18, 0, Some(2)),
            row("First", 26, 1, Some(1)),
        ]);
        assert_eq!(names(&ranked), ["First", "Second"]);
    }

    #[test]
    fn wins_break_point_ties() {
        let ranked = rank(vec![
            row("NoWin", 25, 0, Some(2)),
            row("OneWin", 25, 1, Some(1)),
        ]);
        assert_eq!(names(&ranked), ["OneWin", "NoWin"]);
    }

    #[test]
    fn best_finish_breaks_remaining_ties_ascending() {
        let ranked = rank(vec![
            row("P3Best", 20, 1, Some(3)),
            row("P2Best", 20, 1, Some(2)),
        ]);
        assert_eq!(names(&ranked), ["P2Best", "P3Best"]);
    }

    #[test]
    fn never_finished_sorts_after_any_real_position() {
        let ranked = rank(vec![row("Never", 0, 0, None), row("Once", 0, 0, Some(19))]);
        assert_eq!(names(&ranked), ["Once", "Never"]);
    }

    #[test]
    fn display_name_is_the_final_case_insensitive_tie_break() {
        let ranked = rank(vec![
            row("zimmer", 10, 0, Some(4)),
            row("Abel", 10, 0, Some(4)),
            row("aaron", 10, 0, Some(4)),
        ]);
        assert_eq!(names(&ranked), ["aaron", "Abel", "zimmer"]);
    }

    #[test]
    fn zero_result_drivers_rank_after_scorers() {
        let ranked = rank(vec![
            row("Rookie", 0, 0, None),
            row("Champ", 26, 1, Some(1)),
            row("Runner", 18, 0, Some(2)),
        ]);
        assert_eq!(names(&ranked), ["Champ", "Runner", "Rookie"]);
        assert_eq!(ranked[2].best_finish, None);
    }
}
