//! Read-through cache for computed standings, keyed by league + season.
//!
//! The cache is never a source of truth. Every write that touches an event's
//! results invalidates the matching entry post-commit, so readers observe
//! either the pre- or post-submission table, never a half-written one.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::dto::standings::SeasonStandings;
use crate::store::{MemoryStore, TtlStore};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

pub struct StandingsCache {
    store: Arc<dyn TtlStore>,
    fallback: MemoryStore,
    ttl: Duration,
}

impl StandingsCache {
    pub fn new(store: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        Self {
            store,
            fallback: MemoryStore::new(),
            ttl,
        }
    }

    /// The no-season case gets its own sentinel distinct from any season id.
    fn cache_key(league_id: Uuid, season_id: Option<Uuid>) -> String {
        let season_part = season_id.map_or_else(|| "none".to_string(), |id| id.to_string());
        format!("standings:{league_id}:{season_part}").to_lowercase()
    }

    pub async fn get(&self, league_id: Uuid, season_id: Option<Uuid>) -> Option<SeasonStandings> {
        let key = Self::cache_key(league_id, season_id);

        let raw = match self.store.get(&key).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Standings cache read failed: {err} -- trying local fallback");
                self.fallback.get(&key).await.ok().flatten()
            }
        };
        let raw = raw?;

        match serde_json::from_str(&raw) {
            Ok(payload) => Some(payload),
            Err(err) => {
                // Corrupt entries self-heal: drop them and recompute.
                tracing::warn!("Invalid standings cache payload for {key}: {err}");
                self.invalidate(league_id, season_id).await;
                None
            }
        }
    }

    /// Writes the shared store and the local fallback, so a flapping shared
    /// store does not stampede the calculator on every read.
    pub async fn set(&self, league_id: Uuid, season_id: Option<Uuid>, payload: &SeasonStandings) {
        let key = Self::cache_key(league_id, season_id);
        let raw = match serde_json::to_string(payload) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Failed to serialize standings payload for {key}: {err}");
                return;
            }
        };

        if let Err(err) = self.store.put(&key, &raw, self.ttl).await {
            tracing::warn!("Standings cache write failed: {err}");
        }
        let _ = self.fallback.put(&key, &raw, self.ttl).await;
    }

    pub async fn invalidate(&self, league_id: Uuid, season_id: Option<Uuid>) {
        let key = Self::cache_key(league_id, season_id);
        if let Err(err) = self.store.delete(&key).await {
            tracing::warn!("Standings cache delete failed for {key}: {err}");
        }
        let _ = self.fallback.delete(&key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::standings::StandingsItem;

    fn standings(league_id: Uuid, season_id: Option<Uuid>) -> SeasonStandings {
        SeasonStandings {
            league_id,
            season_id,
            items: vec![StandingsItem {
                driver_id: Uuid::new_v4(),
                display_name: "Ayrton".to_string(),
                points: 26,
                wins: 1,
                best_finish: Some(1),
            }],
        }
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let cache = StandingsCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
        let league_id = Uuid::new_v4();
        let payload = standings(league_id, None);

        cache.set(league_id, None, &payload).await;
        assert_eq!(cache.get(league_id, None).await, Some(payload));
    }

    #[tokio::test]
    async fn invalidate_forces_the_next_read_to_miss() {
        let cache = StandingsCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
        let league_id = Uuid::new_v4();
        let season_id = Some(Uuid::new_v4());
        let payload = standings(league_id, season_id);

        cache.set(league_id, season_id, &payload).await;
        cache.invalidate(league_id, season_id).await;
        assert_eq!(cache.get(league_id, season_id).await, None);
    }

    #[tokio::test]
    async fn season_and_no_season_entries_are_distinct() {
        let cache = StandingsCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));
        let league_id = Uuid::new_v4();
        let season_id = Uuid::new_v4();

        cache
            .set(league_id, None, &standings(league_id, None))
            .await;
        assert_eq!(cache.get(league_id, Some(season_id)).await, None);
    }

    #[tokio::test]
    async fn corrupt_payloads_read_as_a_miss_and_self_heal() {
        let store = Arc::new(MemoryStore::new());
        let cache = StandingsCache::new(store.clone(), Duration::from_secs(60));
        let league_id = Uuid::new_v4();

        let key = format!("standings:{league_id}:none");
        store
            .put(&key, "{not json", Duration::from_secs(60))
            .await
            .expect("seed corrupt payload");

        assert_eq!(cache.get(league_id, None).await, None);
        // Healed: the corrupt entry is gone from the store itself.
        assert_eq!(store.get(&key).await.expect("get"), None);
    }
}
