use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::RankingEntry;
use crate::matches::StoreError;

/// Side-effecting ranking procedures invoked after a bout is finalized
#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn record_result(&self, winner_id: &str, loser_id: &str) -> Result<(), StoreError>;
    async fn recalculate_positions(&self) -> Result<(), StoreError>;
    /// Entries ordered by position
    async fn standings(&self) -> Result<Vec<RankingEntry>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRankingStore {
    entries: Arc<RwLock<HashMap<String, RankingEntry>>>,
}

impl InMemoryRankingStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl RankingStore for InMemoryRankingStore {
    async fn record_result(&self, winner_id: &str, loser_id: &str) -> Result<(), StoreError> {
        if winner_id == loser_id {
            return Err(StoreError::Database(format!(
                "winner and loser are the same competitor: {winner_id}"
            )));
        }

        let mut entries = self.entries.write().await;

        let winner = entries
            .entry(winner_id.to_string())
            .or_insert_with(|| RankingEntry::new(winner_id));
        winner.bouts += 1;
        winner.wins += 1;
        winner.current_win_streak += 1;
        winner.best_win_streak = winner.best_win_streak.max(winner.current_win_streak);

        let loser = entries
            .entry(loser_id.to_string())
            .or_insert_with(|| RankingEntry::new(loser_id));
        loser.bouts += 1;
        loser.losses += 1;
        loser.current_win_streak = 0;

        debug!(winner_id, loser_id, "Ranking result recorded");
        Ok(())
    }

    async fn recalculate_positions(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        let mut order: Vec<(Reverse<u32>, u32, String)> = entries
            .values()
            .map(|e| (Reverse(e.wins), e.losses, e.competitor_id.clone()))
            .collect();
        order.sort();

        for (index, (_, _, competitor_id)) in order.into_iter().enumerate() {
            if let Some(entry) = entries.get_mut(&competitor_id) {
                entry.position = index as u32 + 1;
            }
        }
        Ok(())
    }

    async fn standings(&self) -> Result<Vec<RankingEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut standings: Vec<RankingEntry> = entries.values().cloned().collect();
        standings.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.competitor_id.cmp(&b.competitor_id))
        });
        Ok(standings)
    }
}
