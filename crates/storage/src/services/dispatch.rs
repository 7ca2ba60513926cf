//! Fire-and-forget notification seam.
//!
//! The queue broker and the workers behind it (standings recompute, results
//! announcements) are external collaborators. The orchestrator submits jobs
//! through this trait after commit and never awaits their outcome; an
//! implementation that cannot deliver logs and moves on.

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    async fn standings_recompute(&self, league_id: Uuid, season_id: Option<Uuid>);
    async fn results_announcement(&self, league_id: Uuid, event_id: Uuid);
}

/// In-process stand-in used when no broker is wired up: the jobs become log
/// lines so operators can see what would have been enqueued.
pub struct LogDispatch;

#[async_trait]
impl NotificationDispatch for LogDispatch {
    async fn standings_recompute(&self, league_id: Uuid, season_id: Option<Uuid>) {
        tracing::info!(
            %league_id,
            season_id = ?season_id,
            "No worker queue configured; skipping standings recompute job"
        );
    }

    async fn results_announcement(&self, league_id: Uuid, event_id: Uuid) {
        tracing::info!(
            %league_id,
            %event_id,
            "No worker queue configured; skipping results announcement job"
        );
    }
}
