use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::engine::{BracketConfig, BracketEngine, BracketSnapshot, ReconcileReport};
use super::errors::BracketError;
use super::observer::MatchObserver;
use super::refresh_handler::BracketRefreshHandler;
use crate::event::{CompetitionEvent, CompetitionSubscription, EventBus};
use crate::matches::{MatchRecord, MatchStore};
use crate::scoring::Side;

/// Holds the open brackets and serializes every change to one bracket
/// behind its own lock
pub struct BracketService {
    store: Arc<dyn MatchStore>,
    observer: Arc<dyn MatchObserver>,
    event_bus: EventBus,
    brackets: RwLock<HashMap<String, Arc<Mutex<BracketEngine>>>>,
    subscriptions: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl BracketService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        observer: Arc<dyn MatchObserver>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            observer,
            event_bus,
            brackets: RwLock::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens the bracket for a competition, rebuilding it from the store.
    /// An already open bracket is returned unchanged.
    #[instrument(skip(self))]
    pub async fn open(
        self: &Arc<Self>,
        competition_id: &str,
        config: BracketConfig,
    ) -> Result<BracketSnapshot, BracketError> {
        if let Some(existing) = self.bracket(competition_id).await {
            return Ok(existing.lock().await.snapshot());
        }

        let engine = BracketEngine::load(competition_id, config, Arc::clone(&self.store)).await?;
        let snapshot = engine.snapshot();

        {
            let mut brackets = self.brackets.write().await;
            brackets
                .entry(competition_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(engine)));
        }
        self.watch(competition_id).await;

        info!(competition_id = %competition_id, rounds = config.rounds, "Bracket opened");
        Ok(snapshot)
    }

    // Refresh as soon as a bout of this competition is finalized
    async fn watch(self: &Arc<Self>, competition_id: &str) {
        let mut subscriptions = self.subscriptions.lock().await;
        if subscriptions.contains_key(competition_id) {
            return;
        }

        let handler = Arc::new(BracketRefreshHandler::new(Arc::downgrade(self)));
        let handle = CompetitionSubscription::new(
            competition_id.to_string(),
            handler,
            self.event_bus.clone(),
        )
        .start()
        .await;
        subscriptions.insert(competition_id.to_string(), handle);
    }

    async fn bracket(&self, competition_id: &str) -> Option<Arc<Mutex<BracketEngine>>> {
        self.brackets.read().await.get(competition_id).cloned()
    }

    async fn require(&self, competition_id: &str) -> Result<Arc<Mutex<BracketEngine>>, BracketError> {
        self.bracket(competition_id)
            .await
            .ok_or_else(|| BracketError::NotFound(competition_id.to_string()))
    }

    pub async fn competitions(&self) -> Vec<String> {
        self.brackets.read().await.keys().cloned().collect()
    }

    pub async fn snapshot(&self, competition_id: &str) -> Result<BracketSnapshot, BracketError> {
        let bracket = self.require(competition_id).await?;
        let engine = bracket.lock().await;
        Ok(engine.snapshot())
    }

    pub async fn assign_competitor(
        &self,
        competition_id: &str,
        round: u32,
        position: u32,
        competitor_id: Option<String>,
        side: Side,
    ) -> Result<BracketSnapshot, BracketError> {
        let bracket = self.require(competition_id).await?;
        let mut engine = bracket.lock().await;
        engine.assign_competitor(round, position, competitor_id, side)?;
        Ok(engine.snapshot())
    }

    pub async fn assign_judge(
        &self,
        competition_id: &str,
        round: u32,
        position: u32,
        judge_id: Option<String>,
    ) -> Result<BracketSnapshot, BracketError> {
        let bracket = self.require(competition_id).await?;
        let mut engine = bracket.lock().await;
        engine.assign_judge(round, position, judge_id)?;
        Ok(engine.snapshot())
    }

    pub async fn draw(
        &self,
        competition_id: &str,
        athletes: &[String],
    ) -> Result<BracketSnapshot, BracketError> {
        let bracket = self.require(competition_id).await?;
        let mut engine = bracket.lock().await;
        engine.draw(athletes)?;
        Ok(engine.snapshot())
    }

    #[instrument(skip(self))]
    pub async fn create_match(
        &self,
        competition_id: &str,
        round: u32,
        position: u32,
    ) -> Result<MatchRecord, BracketError> {
        let bracket = self.require(competition_id).await?;
        let record = bracket.lock().await.create_match(round, position).await?;

        if let Some(slot) = record.slot {
            self.event_bus
                .emit(
                    competition_id,
                    CompetitionEvent::MatchCreated {
                        match_id: record.id.clone(),
                        slot,
                    },
                )
                .await;
        }
        Ok(record)
    }

    /// Observes the store and reconciles one bracket
    #[instrument(skip(self))]
    pub async fn refresh(&self, competition_id: &str) -> Result<ReconcileReport, BracketError> {
        let bracket = self.require(competition_id).await?;

        // Observe under the lock so overlapping refreshes apply in order
        let mut engine = bracket.lock().await;
        let records = self.observer.observe(competition_id).await?;
        let report = engine.reconcile(&records);
        drop(engine);

        for advancement in &report.advanced {
            self.event_bus
                .emit(
                    competition_id,
                    CompetitionEvent::SlotAdvanced {
                        from: advancement.from,
                        to: advancement.to,
                        competitor_id: advancement.competitor_id.clone(),
                    },
                )
                .await;
        }
        Ok(report)
    }

    /// Refreshes every open bracket. A failing bracket does not stop the rest.
    pub async fn refresh_all(&self) -> usize {
        let mut refreshed = 0;
        for competition_id in self.competitions().await {
            match self.refresh(&competition_id).await {
                Ok(_) => refreshed += 1,
                Err(e) => {
                    error!(competition_id = %competition_id, error = %e, "Bracket refresh failed")
                }
            }
        }
        refreshed
    }

    #[instrument(skip(self))]
    pub async fn reset(&self, competition_id: &str, confirmation: &str) -> Result<u64, BracketError> {
        let bracket = self.require(competition_id).await?;
        let deleted = bracket.lock().await.reset(confirmation).await?;

        self.event_bus
            .emit(
                competition_id,
                CompetitionEvent::BracketReset {
                    deleted_matches: deleted,
                },
            )
            .await;
        Ok(deleted)
    }
}

impl Drop for BracketService {
    fn drop(&mut self) {
        for handle in self.subscriptions.get_mut().values() {
            handle.abort();
        }
    }
}
