//! Points-scheme resolution and score computation.
//!
//! Resolution order, first match wins: the default scheme scoped to the
//! event's exact season, then the league's no-season default scheme, then
//! the built-in classic top-10 table. A default scheme with an empty rule
//! set does not match its level; resolution falls through to the next one.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::repository::points::PointsRepository;

/// Classic top-10 scoring, applied when a league has configured nothing.
pub const DEFAULT_POINTS: [(i32, i32); 10] = [
    (1, 25),
    (2, 18),
    (3, 15),
    (4, 12),
    (5, 10),
    (6, 8),
    (7, 6),
    (8, 4),
    (9, 2),
    (10, 1),
];

pub fn default_points_map() -> BTreeMap<i32, i32> {
    DEFAULT_POINTS.into_iter().collect()
}

/// Reject duplicate positions in user-provided rule sets. The resolver never
/// corrects a duplicate; it is a caller error.
pub fn normalize_points_entries(entries: &[(i32, i32)]) -> std::result::Result<Vec<(i32, i32)>, String> {
    let mut seen = std::collections::HashSet::new();
    let mut normalized = Vec::with_capacity(entries.len());
    for &(position, points) in entries {
        if !seen.insert(position) {
            return Err(format!("Duplicate position {position} in points map"));
        }
        normalized.push((position, points));
    }
    normalized.sort_by_key(|&(position, _)| position);
    Ok(normalized)
}

/// total = max(0, base + bonus - penalty); a penalty can never drive a row
/// below zero.
pub fn total_points(base: i32, bonus: i32, penalty: i32) -> i32 {
    (base + bonus - penalty).max(0)
}

/// Pure core of the hierarchy so the resolution order is testable without a
/// database. Empty rule sets are treated as absent.
fn resolve_from(
    season_rules: Option<Vec<(i32, i32)>>,
    league_rules: Option<Vec<(i32, i32)>>,
) -> BTreeMap<i32, i32> {
    for rules in [season_rules, league_rules].into_iter().flatten() {
        if !rules.is_empty() {
            return rules.into_iter().collect();
        }
    }
    default_points_map()
}

/// Resolve the position-to-points table for an event's (league, season).
pub async fn resolve(
    pool: &PgPool,
    league_id: Uuid,
    season_id: Option<Uuid>,
) -> Result<BTreeMap<i32, i32>> {
    let repo = PointsRepository::new(pool);

    let season_rules = match season_id {
        Some(season_id) => repo
            .default_scheme_rules(league_id, Some(season_id))
            .await?
            .map(|rules| rules.iter().map(|r| (r.position, r.points)).collect()),
        None => None,
    };
    let league_rules = repo
        .default_scheme_rules(league_id, None)
        .await?
        .map(|rules| rules.iter().map(|r| (r.position, r.points)).collect());

    Ok(resolve_from(season_rules, league_rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_classic_top_10() {
        let map = default_points_map();
        assert_eq!(map.len(), 10);
        assert_eq!(map[&1], 25);
        assert_eq!(map[&2], 18);
        assert_eq!(map[&10], 1);
        assert_eq!(map.get(&11), None);
    }

    #[test]
    fn total_points_is_floored_at_zero() {
        assert_eq!(total_points(25, 1, 0), 26);
        assert_eq!(total_points(1, 0, 5), 0);
        assert_eq!(total_points(0, 0, 0), 0);
        assert_eq!(total_points(10, 5, 15), 0);
    }

    #[test]
    fn normalize_rejects_duplicate_positions() {
        assert!(normalize_points_entries(&[(1, 25), (1, 18)]).is_err());

        let normalized = normalize_points_entries(&[(2, 18), (1, 25)]).expect("unique positions");
        assert_eq!(normalized, vec![(1, 25), (2, 18)]);
    }

    #[test]
    fn season_scheme_wins_over_league_scheme() {
        let resolved = resolve_from(Some(vec![(1, 20)]), Some(vec![(1, 10)]));
        assert_eq!(resolved[&1], 20);
    }

    #[test]
    fn league_scheme_applies_when_season_has_none() {
        let resolved = resolve_from(None, Some(vec![(1, 10)]));
        assert_eq!(resolved[&1], 10);
    }

    #[test]
    fn empty_rule_sets_fall_through() {
        let resolved = resolve_from(Some(vec![]), Some(vec![]));
        assert_eq!(resolved, default_points_map());
    }

    #[test]
    fn builtin_table_applies_when_nothing_configured() {
        assert_eq!(resolve_from(None, None), default_points_map());
    }
}
