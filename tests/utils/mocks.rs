use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kumite::matches::{
    InMemoryMatchStore, MatchFilter, MatchRecord, MatchResultUpdate, MatchState, MatchStore,
    NewMatch, StoreError,
};
use kumite::ranking::{InMemoryRankingStore, RankingEntry, RankingStore};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Match store whose result writes fail a set number of times before
/// delegating to an in-memory store
pub struct FlakyMatchStore {
    inner: Arc<InMemoryMatchStore>,
    remaining_failures: AtomicUsize,
}

impl FlakyMatchStore {
    pub fn new(inner: Arc<InMemoryMatchStore>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl MatchStore for FlakyMatchStore {
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord, StoreError> {
        self.inner.create_match(new_match).await
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        self.inner.get_match(match_id).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchRecord>, StoreError> {
        self.inner.list_matches(filter).await
    }

    async fn update_state(&self, match_id: &str, state: MatchState) -> Result<(), StoreError> {
        self.inner.update_state(match_id, state).await
    }

    async fn update_category(
        &self,
        match_id: &str,
        category: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError> {
        self.inner
            .update_category(match_id, category, duration_seconds)
            .await
    }

    async fn record_result(
        &self,
        match_id: &str,
        result: &MatchResultUpdate,
    ) -> Result<(), StoreError> {
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Database("connection reset".to_string()));
        }
        self.inner.record_result(match_id, result).await
    }

    async fn delete_competition_matches(&self, competition_id: &str) -> Result<u64, StoreError> {
        self.inner.delete_competition_matches(competition_id).await
    }
}

/// Ranking store that counts how often a result was recorded
#[derive(Default)]
pub struct CountingRankingStore {
    inner: InMemoryRankingStore,
    recorded: AtomicUsize,
}

impl CountingRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> usize {
        self.recorded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RankingStore for CountingRankingStore {
    async fn record_result(&self, winner_id: &str, loser_id: &str) -> Result<(), StoreError> {
        self.recorded.fetch_add(1, Ordering::SeqCst);
        self.inner.record_result(winner_id, loser_id).await
    }

    async fn recalculate_positions(&self) -> Result<(), StoreError> {
        self.inner.recalculate_positions().await
    }

    async fn standings(&self) -> Result<Vec<RankingEntry>, StoreError> {
        self.inner.standings().await
    }
}
