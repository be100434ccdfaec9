use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::service::BracketService;

/// Configuration for the bracket poll task
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// How often every open bracket is reconciled against the store
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
        }
    }
}

/// Periodically refreshes every open bracket. Runs until the task is aborted.
#[instrument(skip(bracket_service))]
pub async fn start_poll_task(bracket_service: Arc<BracketService>, config: PollConfig) {
    info!(
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting bracket poll background task"
    );

    let mut poll_interval = interval(config.poll_interval);

    loop {
        poll_interval.tick().await;

        let refreshed = bracket_service.refresh_all().await;
        debug!(refreshed, "Bracket poll completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketConfig, PollingMatchObserver};
    use crate::event::EventBus;
    use crate::matches::{InMemoryMatchStore, MatchResultUpdate, MatchStore};
    use crate::scoring::{BoutCategory, ResultReason, Side};

    #[tokio::test(start_paused = true)]
    async fn test_poll_picks_up_stored_results() {
        let store = Arc::new(InMemoryMatchStore::new());
        let service = Arc::new(BracketService::new(
            store.clone(),
            Arc::new(PollingMatchObserver::new(store.clone())),
            EventBus::new(),
        ));
        service
            .open("cup", BracketConfig::new(1, BoutCategory::Senior))
            .await
            .unwrap();
        service
            .assign_competitor("cup", 1, 1, Some("aka".to_string()), Side::Competitor1)
            .await
            .unwrap();
        service
            .assign_competitor("cup", 1, 1, Some("ao".to_string()), Side::Competitor2)
            .await
            .unwrap();
        let record = service.create_match("cup", 1, 1).await.unwrap();

        let task = tokio::spawn(start_poll_task(service.clone(), PollConfig::default()));

        store
            .record_result(
                &record.id,
                &MatchResultUpdate {
                    winner_id: "ao".to_string(),
                    result_reason: ResultReason::ByDirectDecision,
                    score1: 0,
                    score2: 0,
                },
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;

        let snapshot = service.snapshot("cup").await.unwrap();
        assert_eq!(snapshot.champion.as_deref(), Some("ao"));
        task.abort();
    }
}
