//! At-most-one-effective-execution guard for client submissions.
//!
//! A claim reserves `idempotency:{scope}:{key}` with the payload fingerprint
//! for the TTL. Replays with the same fingerprint are duplicates; a reused
//! key with a different fingerprint is a conflict. The record is ephemeral:
//! losing it only weakens client-retry ergonomics, never data.

use std::sync::Arc;
use std::time::Duration;

use crate::store::{MemoryStore, TtlStore};

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// No live record existed; the caller may run the mutation.
    Claimed,
    /// Same key, same fingerprint: return persisted state, do not re-execute.
    Duplicate,
    /// Same key, different fingerprint within TTL: reject the request.
    Conflict,
}

pub struct IdempotencyGuard {
    store: Arc<dyn TtlStore>,
    fallback: MemoryStore,
    ttl: Duration,
}

impl IdempotencyGuard {
    pub fn new(store: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        Self {
            store,
            fallback: MemoryStore::new(),
            ttl,
        }
    }

    /// Keys are compared case-insensitively.
    fn storage_key(scope: &str, key: &str) -> String {
        format!("idempotency:{scope}:{key}").to_lowercase()
    }

    pub async fn claim(&self, scope: &str, key: &str, fingerprint: &str) -> ClaimOutcome {
        let storage_key = Self::storage_key(scope, key);

        let claimed = match self
            .store
            .put_if_absent(&storage_key, fingerprint, self.ttl)
            .await
        {
            Ok(claimed) => claimed,
            Err(err) => {
                tracing::warn!("Idempotency store error on claim: {err} -- using local fallback");
                return self.claim_fallback(&storage_key, fingerprint).await;
            }
        };

        if claimed {
            return ClaimOutcome::Claimed;
        }

        match self.store.get(&storage_key).await {
            // Record expired between the two operations.
            Ok(None) => ClaimOutcome::Claimed,
            Ok(Some(existing)) if existing == fingerprint => ClaimOutcome::Duplicate,
            Ok(Some(_)) => ClaimOutcome::Conflict,
            Err(err) => {
                tracing::warn!("Idempotency store error on read: {err} -- using local fallback");
                self.claim_fallback(&storage_key, fingerprint).await
            }
        }
    }

    async fn claim_fallback(&self, storage_key: &str, fingerprint: &str) -> ClaimOutcome {
        match self
            .fallback
            .put_if_absent(storage_key, fingerprint, self.ttl)
            .await
        {
            Ok(true) => ClaimOutcome::Claimed,
            _ => match self.fallback.get(storage_key).await {
                Ok(Some(existing)) if existing == fingerprint => ClaimOutcome::Duplicate,
                Ok(Some(_)) => ClaimOutcome::Conflict,
                _ => ClaimOutcome::Claimed,
            },
        }
    }

    /// Free the key after a failed mutation so a retry with the same key can
    /// succeed before the TTL runs out. Best-effort.
    pub async fn release(&self, scope: &str, key: &str) {
        let storage_key = Self::storage_key(scope, key);
        if let Err(err) = self.store.delete(&storage_key).await {
            tracing::warn!("Failed to release idempotency key {storage_key}: {err}");
        }
        let _ = self.fallback.delete(&storage_key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> IdempotencyGuard {
        IdempotencyGuard::new(Arc::new(MemoryStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn first_claim_wins_then_replays_are_duplicates() {
        let guard = guard();
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-1").await,
            ClaimOutcome::Claimed
        );
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-1").await,
            ClaimOutcome::Duplicate
        );
    }

    #[tokio::test]
    async fn different_fingerprint_is_a_conflict() {
        let guard = guard();
        guard.claim("results:evt-1", "abc", "fp-1").await;
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-2").await,
            ClaimOutcome::Conflict
        );
    }

    #[tokio::test]
    async fn keys_are_case_insensitive() {
        let guard = guard();
        guard.claim("results:evt-1", "ABC", "fp-1").await;
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-1").await,
            ClaimOutcome::Duplicate
        );
    }

    #[tokio::test]
    async fn keys_are_scoped_per_event() {
        let guard = guard();
        guard.claim("results:evt-1", "abc", "fp-1").await;
        assert_eq!(
            guard.claim("results:evt-2", "abc", "fp-1").await,
            ClaimOutcome::Claimed
        );
    }

    #[tokio::test]
    async fn release_makes_the_key_claimable_again() {
        let guard = guard();
        guard.claim("results:evt-1", "abc", "fp-1").await;
        guard.release("results:evt-1", "abc").await;
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-2").await,
            ClaimOutcome::Claimed
        );
    }

    #[tokio::test]
    async fn expired_claims_can_be_retaken() {
        let guard = IdempotencyGuard::new(Arc::new(MemoryStore::new()), Duration::from_millis(5));
        guard.claim("results:evt-1", "abc", "fp-1").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            guard.claim("results:evt-1", "abc", "fp-2").await,
            ClaimOutcome::Claimed
        );
    }
}
