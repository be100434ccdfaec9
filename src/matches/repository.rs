use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{MatchFilter, MatchRecord, MatchResultUpdate, MatchState, NewMatch};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// CRUD contract of the external match store
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord, StoreError>;
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError>;
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchRecord>, StoreError>;
    async fn update_state(&self, match_id: &str, state: MatchState) -> Result<(), StoreError>;

    /// Rewrites the category label and its bout duration
    async fn update_category(
        &self,
        match_id: &str,
        category: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError>;

    /// Writes winner, reason and scores and marks the record finalized
    async fn record_result(
        &self,
        match_id: &str,
        result: &MatchResultUpdate,
    ) -> Result<(), StoreError>;

    /// Deletes every record tagged with the competition. Returns the count.
    async fn delete_competition_matches(&self, competition_id: &str) -> Result<u64, StoreError>;
}

/// In-memory implementation of MatchStore for development and testing
///
/// Records keep insertion order, which is also the listing order.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    records: RwLock<Vec<MatchRecord>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-populated records
    pub fn with_records(records: Vec<MatchRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    #[instrument(skip(self, new_match))]
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord, StoreError> {
        let record = MatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            competition_id: new_match.competition_id,
            slot: new_match.slot,
            competitor1_id: new_match.competitor1_id,
            competitor2_id: new_match.competitor2_id,
            judge_id: new_match.judge_id,
            category: new_match.category,
            duration_seconds: new_match.duration_seconds,
            state: MatchState::Scheduled,
            winner_id: None,
            result_reason: None,
            score1: 0,
            score2: 0,
            scheduled_at: new_match.scheduled_at,
        };

        debug!(match_id = %record.id, "Creating match in memory");
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == match_id).cloned())
    }

    #[instrument(skip(self, filter))]
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchRecord>, StoreError> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|r| filter.matches(r))
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect::<Vec<_>>();

        debug!(count = matching.len(), "Listed matches from memory");
        Ok(matching)
    }

    #[instrument(skip(self))]
    async fn update_state(&self, match_id: &str, state: MatchState) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == match_id)
            .ok_or_else(|| {
                warn!(match_id = %match_id, "Match not found for state update");
                StoreError::NotFound(match_id.to_string())
            })?;

        record.state = state;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        match_id: &str,
        category: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == match_id)
            .ok_or_else(|| {
                warn!(match_id = %match_id, "Match not found for category update");
                StoreError::NotFound(match_id.to_string())
            })?;

        record.category = category.to_string();
        record.duration_seconds = duration_seconds;
        Ok(())
    }

    #[instrument(skip(self, result))]
    async fn record_result(
        &self,
        match_id: &str,
        result: &MatchResultUpdate,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == match_id)
            .ok_or_else(|| {
                warn!(match_id = %match_id, "Match not found for result update");
                StoreError::NotFound(match_id.to_string())
            })?;

        record.state = MatchState::Finalized;
        record.winner_id = Some(result.winner_id.clone());
        record.result_reason = Some(result.result_reason);
        record.score1 = result.score1;
        record.score2 = result.score2;

        debug!(match_id = %match_id, winner_id = %result.winner_id, "Match result stored in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_competition_matches(&self, competition_id: &str) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.competition_id.as_deref() != Some(competition_id));
        let deleted = (before - records.len()) as u64;

        debug!(competition_id = %competition_id, deleted, "Deleted competition matches from memory");
        Ok(deleted)
    }
}
