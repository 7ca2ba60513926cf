//! Results ingestion: turns a race's finishing order into scored rows
//! exactly once per client submission.
//!
//! The mutation is a replace-all inside one read-committed transaction.
//! Concurrent submissions for the same event are each internally atomic, so
//! the final state is exactly one of the submitted sets, never a merge; the
//! idempotency key only protects against client retries double-applying.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::Database;
use crate::dto::results::{EventResults, ResultEntryCreate, ResultEntryRead, ResultSubmission};
use crate::error::StorageError;
use crate::models::{Event, EventStatus, RaceResult};
use crate::repository::driver::DriverRepository;
use crate::repository::event::{self, EventRepository};
use crate::repository::result::{self, NewResult, ResultRepository};
use crate::repository::{audit, audit::AuditEntry};
use crate::services::access::{self, AccessError, ActorContext, LeagueRole};
use crate::services::cache::StandingsCache;
use crate::services::dispatch::NotificationDispatch;
use crate::services::idempotency::{ClaimOutcome, IdempotencyGuard};
use crate::services::points;

const IDEMPOTENCY_SCOPE: &str = "results";

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Event not found")]
    EventNotFound,
    #[error("Event is canceled and no longer accepts results")]
    EventCanceled,
    #[error("Entries must be non-empty")]
    EmptyEntries,
    #[error("Entries must be unique per driver")]
    DuplicateDriver,
    #[error("Entries must be unique per finish position")]
    DuplicatePosition,
    #[error("Driver {0} not found in league")]
    MissingDriver(Uuid),
    #[error("Conflicting request for supplied Idempotency-Key")]
    IdempotencyConflict,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// CANCELED is terminal: a canceled event never transitions back through a
/// results submission. SCHEDULED accepts the first set, COMPLETED accepts
/// corrections.
fn ensure_accepts_results(status: EventStatus) -> Result<(), IngestionError> {
    match status {
        EventStatus::Canceled => Err(IngestionError::EventCanceled),
        EventStatus::Scheduled | EventStatus::Completed => Ok(()),
    }
}

/// Entry validation, each condition a distinct rejectable error.
fn validate_entries(entries: &[ResultEntryCreate]) -> Result<(), IngestionError> {
    if entries.is_empty() {
        return Err(IngestionError::EmptyEntries);
    }

    let mut drivers = HashSet::new();
    if !entries.iter().all(|entry| drivers.insert(entry.driver_id)) {
        return Err(IngestionError::DuplicateDriver);
    }

    let mut positions = HashSet::new();
    if !entries
        .iter()
        .all(|entry| positions.insert(entry.finish_position))
    {
        return Err(IngestionError::DuplicatePosition);
    }

    Ok(())
}

#[derive(Serialize)]
struct FingerprintEntry {
    driver_id: Uuid,
    finish_position: i32,
    bonus_points: i32,
    penalty_points: i32,
}

/// Stable hash of the normalized submission: the scoring-relevant fields,
/// sorted by driver id so entry order does not change the fingerprint.
pub fn payload_fingerprint(entries: &[ResultEntryCreate]) -> String {
    let mut canonical: Vec<FingerprintEntry> = entries
        .iter()
        .map(|entry| FingerprintEntry {
            driver_id: entry.driver_id,
            finish_position: entry.finish_position,
            bonus_points: entry.bonus_points,
            penalty_points: entry.penalty_points,
        })
        .collect();
    canonical.sort_by_key(|entry| entry.driver_id);

    let raw = serde_json::to_string(&canonical).expect("fingerprint entries always serialize");
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

/// Audit snapshot of an event's result set. Row ids are excluded so a
/// replace-all that reproduces identical rows compares as a no-op.
fn audit_state(status: EventStatus, rows: &[RaceResult]) -> serde_json::Value {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| row.finish_position);
    serde_json::json!({
        "status": status,
        "results": rows.iter().map(ResultEntryRead::from).collect::<Vec<_>>(),
    })
}

/// Orchestrator for the submit path. Constructed once at startup and passed
/// through application state; it holds no per-request state of its own.
pub struct ResultsIngestion {
    db: Database,
    idempotency: Arc<IdempotencyGuard>,
    cache: Arc<StandingsCache>,
    dispatch: Arc<dyn NotificationDispatch>,
}

impl ResultsIngestion {
    pub fn new(
        db: Database,
        idempotency: Arc<IdempotencyGuard>,
        cache: Arc<StandingsCache>,
        dispatch: Arc<dyn NotificationDispatch>,
    ) -> Self {
        Self {
            db,
            idempotency,
            cache,
            dispatch,
        }
    }

    /// Replace the full result set for an event. Returns the persisted rows
    /// ordered by finish position.
    pub async fn submit(
        &self,
        ctx: &ActorContext,
        event_id: Uuid,
        submission: ResultSubmission,
        idempotency_key: Option<&str>,
    ) -> Result<EventResults, IngestionError> {
        let pool = self.db.pool();

        let event = match EventRepository::new(pool).find_by_id(event_id).await {
            Ok(event) => event,
            Err(StorageError::NotFound) => return Err(IngestionError::EventNotFound),
            Err(err) => return Err(err.into()),
        };
        access::require_role_at_least(ctx, event.league_id, LeagueRole::Steward)?;
        ensure_accepts_results(event.status)?;

        let entries = submission.entries;
        validate_entries(&entries)?;

        let driver_ids: Vec<Uuid> = entries.iter().map(|entry| entry.driver_id).collect();
        let known: HashSet<Uuid> = DriverRepository::new(pool)
            .find_ids_in_league(event.league_id, &driver_ids)
            .await?
            .into_iter()
            .collect();
        if let Some(missing) = driver_ids.iter().find(|id| !known.contains(id)) {
            return Err(IngestionError::MissingDriver(*missing));
        }

        let existing = ResultRepository::new(pool).list_for_event(event.id).await?;

        let scope = format!("{IDEMPOTENCY_SCOPE}:{event_id}");
        let fingerprint = payload_fingerprint(&entries);
        let mut claimed = false;
        if let Some(key) = idempotency_key {
            match self.idempotency.claim(&scope, key, &fingerprint).await {
                ClaimOutcome::Claimed => claimed = true,
                // Replays answer from persisted state, the source of truth,
                // rather than replaying the original response verbatim.
                ClaimOutcome::Duplicate => {
                    return Ok(EventResults::from_rows(&event, existing));
                }
                ClaimOutcome::Conflict => return Err(IngestionError::IdempotencyConflict),
            }
        }

        let inserted = match self.persist(ctx, &event, &entries, &existing).await {
            Ok(inserted) => inserted,
            Err(err) => {
                // The claim must not outlive a failed mutation, or retries
                // with the same key would be blocked until the TTL runs out.
                if claimed
                    && let Some(key) = idempotency_key
                {
                    self.idempotency.release(&scope, key).await;
                }
                return Err(err);
            }
        };

        self.post_commit(&event).await;

        Ok(EventResults::from_rows(&event, inserted))
    }

    /// The transactional part: points resolution, replace-all write, status
    /// transition and the audit snapshot, all-or-nothing.
    async fn persist(
        &self,
        ctx: &ActorContext,
        event: &Event,
        entries: &[ResultEntryCreate],
        existing: &[RaceResult],
    ) -> Result<Vec<RaceResult>, IngestionError> {
        let pool = self.db.pool();

        let points_map = points::resolve(pool, event.league_id, event.season_id).await?;

        let mut ordered: Vec<&ResultEntryCreate> = entries.iter().collect();
        ordered.sort_by_key(|entry| entry.finish_position);
        let rows: Vec<NewResult> = ordered
            .into_iter()
            .map(|entry| {
                let base = points_map.get(&entry.finish_position).copied().unwrap_or(0);
                NewResult {
                    driver_id: entry.driver_id,
                    finish_position: entry.finish_position,
                    started_position: entry.started_position,
                    status: entry.status,
                    bonus_points: entry.bonus_points,
                    penalty_points: entry.penalty_points,
                    total_points: points::total_points(
                        base,
                        entry.bonus_points,
                        entry.penalty_points,
                    ),
                }
            })
            .collect();

        let mut tx = pool.begin().await.map_err(StorageError::from)?;

        result::delete_for_event(&mut tx, event.id).await?;
        let inserted = result::insert_for_event(&mut tx, event.id, &rows).await?;
        event::mark_completed(&mut tx, event.id).await?;

        let before = audit_state(event.status, existing);
        let after = audit_state(EventStatus::Completed, &inserted);
        if before != after {
            audit::record(
                &mut tx,
                AuditEntry {
                    actor_id: ctx.actor_id,
                    league_id: event.league_id,
                    entity: "event",
                    entity_id: event.id.to_string(),
                    action: "results_submitted",
                    before,
                    after,
                },
            )
            .await?;
        }

        tx.commit().await.map_err(StorageError::from)?;

        Ok(inserted)
    }

    /// Post-commit hooks. Each one carries its own error boundary: a failed
    /// cache invalidation or job dispatch is logged and never reaches the
    /// caller, and one failing hook cannot suppress the next.
    async fn post_commit(&self, event: &Event) {
        self.cache.invalidate(event.league_id, event.season_id).await;
        self.dispatch
            .standings_recompute(event.league_id, event.season_id)
            .await;
        self.dispatch
            .results_announcement(event.league_id, event.id)
            .await;
    }

    /// Read-only view of an event's persisted results, finish order.
    pub async fn read(
        &self,
        ctx: &ActorContext,
        event_id: Uuid,
    ) -> Result<EventResults, IngestionError> {
        let pool = self.db.pool();

        let event = match EventRepository::new(pool).find_by_id(event_id).await {
            Ok(event) => event,
            Err(StorageError::NotFound) => return Err(IngestionError::EventNotFound),
            Err(err) => return Err(err.into()),
        };
        access::require_membership(ctx, event.league_id)?;

        let rows = ResultRepository::new(pool).list_for_event(event.id).await?;
        Ok(EventResults::from_rows(&event, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultStatus;

    fn entry(driver_id: Uuid, finish_position: i32) -> ResultEntryCreate {
        ResultEntryCreate {
            driver_id,
            finish_position,
            started_position: None,
            status: ResultStatus::Finished,
            bonus_points: 0,
            penalty_points: 0,
        }
    }

    fn persisted(driver_id: Uuid, finish_position: i32, total_points: i32) -> RaceResult {
        RaceResult {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            driver_id,
            finish_position,
            started_position: None,
            status: ResultStatus::Finished,
            bonus_points: 0,
            penalty_points: 0,
            total_points,
        }
    }

    #[test]
    fn canceled_events_reject_submissions() {
        assert!(matches!(
            ensure_accepts_results(EventStatus::Canceled),
            Err(IngestionError::EventCanceled)
        ));
    }

    #[test]
    fn scheduled_and_completed_events_accept_submissions() {
        assert!(ensure_accepts_results(EventStatus::Scheduled).is_ok());
        assert!(ensure_accepts_results(EventStatus::Completed).is_ok());
    }

    #[test]
    fn empty_submissions_are_rejected() {
        assert!(matches!(
            validate_entries(&[]),
            Err(IngestionError::EmptyEntries)
        ));
    }

    #[test]
    fn duplicate_drivers_are_rejected() {
        let driver = Uuid::new_v4();
        let entries = [entry(driver, 1), entry(driver, 2)];
        assert!(matches!(
            validate_entries(&entries),
            Err(IngestionError::DuplicateDriver)
        ));
    }

    #[test]
    fn duplicate_finish_positions_are_rejected() {
        let entries = [entry(Uuid::new_v4(), 1), entry(Uuid::new_v4(), 1)];
        assert!(matches!(
            validate_entries(&entries),
            Err(IngestionError::DuplicatePosition)
        ));
    }

    #[test]
    fn valid_entries_pass() {
        let entries = [entry(Uuid::new_v4(), 1), entry(Uuid::new_v4(), 2)];
        assert!(validate_entries(&entries).is_ok());
    }

    #[test]
    fn fingerprint_ignores_entry_order() {
        let a = entry(Uuid::new_v4(), 1);
        let b = entry(Uuid::new_v4(), 2);
        assert_eq!(
            payload_fingerprint(&[a.clone(), b.clone()]),
            payload_fingerprint(&[b, a])
        );
    }

    #[test]
    fn fingerprint_changes_with_the_payload() {
        let driver = Uuid::new_v4();
        let base = entry(driver, 1);
        let mut bonus = base.clone();
        bonus.bonus_points = 1;
        assert_ne!(payload_fingerprint(&[base]), payload_fingerprint(&[bonus]));
    }

    #[test]
    fn fingerprint_ignores_non_scoring_fields() {
        let driver = Uuid::new_v4();
        let base = entry(driver, 1);
        let mut started = base.clone();
        started.started_position = Some(5);
        assert_eq!(
            payload_fingerprint(&[base]),
            payload_fingerprint(&[started])
        );
    }

    #[test]
    fn identical_result_sets_compare_as_a_no_op() {
        let driver = Uuid::new_v4();
        let before = audit_state(EventStatus::Completed, &[persisted(driver, 1, 25)]);
        let after = audit_state(EventStatus::Completed, &[persisted(driver, 1, 25)]);
        assert_eq!(before, after);
    }

    #[test]
    fn a_status_transition_alone_is_auditable() {
        let before = audit_state(EventStatus::Scheduled, &[]);
        let after = audit_state(EventStatus::Completed, &[]);
        assert_ne!(before, after);
    }
}
