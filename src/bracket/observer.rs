use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::matches::{MatchFilter, MatchRecord, MatchStore, StoreError};

/// Source of the match records a bracket reconciles against
#[async_trait]
pub trait MatchObserver: Send + Sync {
    async fn observe(&self, competition_id: &str) -> Result<Vec<MatchRecord>, StoreError>;
}

/// Reads the current records straight from the match store on every call
pub struct PollingMatchObserver {
    store: Arc<dyn MatchStore>,
}

impl PollingMatchObserver {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MatchObserver for PollingMatchObserver {
    #[instrument(skip(self))]
    async fn observe(&self, competition_id: &str) -> Result<Vec<MatchRecord>, StoreError> {
        let records = self
            .store
            .list_matches(&MatchFilter::for_competition(competition_id))
            .await?;
        debug!(count = records.len(), "Observed match records");
        Ok(records)
    }
}
