use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::controller::{BoutController, BoutDependencies};
use super::errors::BoutError;
use super::session::{BoutPhase, BoutSessionState};
use super::types::OpenBoutRequest;
use crate::matches::NewMatch;
use crate::scoring::BoutCategory;

/// Registry of live bouts keyed by match id
pub struct BoutService {
    deps: BoutDependencies,
    bouts: RwLock<HashMap<String, Arc<BoutController>>>,
}

impl BoutService {
    pub fn new(deps: BoutDependencies) -> Self {
        Self {
            deps,
            bouts: RwLock::new(HashMap::new()),
        }
    }

    pub fn dependencies(&self) -> &BoutDependencies {
        &self.deps
    }

    /// Creates a scheduled match record and opens a live session for it
    #[instrument(skip(self))]
    pub async fn open_bout(&self, request: OpenBoutRequest) -> Result<Arc<BoutController>, BoutError> {
        let competitor1_id = request.competitor1_id.trim();
        let competitor2_id = request.competitor2_id.trim();
        if competitor1_id.is_empty() || competitor2_id.is_empty() {
            return Err(BoutError::Validation(
                "Both competitors must be given".to_string(),
            ));
        }
        if competitor1_id == competitor2_id {
            return Err(BoutError::Validation(
                "A competitor cannot face themselves".to_string(),
            ));
        }

        let category = request.category.unwrap_or(BoutCategory::Senior);
        let record = self
            .deps
            .match_store
            .create_match(NewMatch {
                competition_id: request.competition_id,
                slot: None,
                competitor1_id: competitor1_id.to_string(),
                competitor2_id: competitor2_id.to_string(),
                judge_id: request.judge_id,
                category: category.to_string(),
                duration_seconds: category.duration_seconds(),
                scheduled_at: Utc::now(),
            })
            .await?;

        let session = BoutSessionState::from_record(&record)?;
        let controller = self.register(session).await;

        info!(bout_id = %record.id, category = %category, "Bout opened");
        Ok(controller)
    }

    /// Opens a session for a match that already exists in the store, e.g. one
    /// created from a bracket slot. An already attached bout is returned as is.
    #[instrument(skip(self))]
    pub async fn attach(&self, match_id: &str) -> Result<Arc<BoutController>, BoutError> {
        if let Some(existing) = self.get(match_id).await {
            return Ok(existing);
        }

        let record = self
            .deps
            .match_store
            .get_match(match_id)
            .await?
            .ok_or_else(|| BoutError::NotFound(match_id.to_string()))?;

        let session = BoutSessionState::from_record(&record)?;
        // Decided matches are served read-only and never kept live
        if session.phase() == BoutPhase::Finalized {
            return Ok(Arc::new(BoutController::new(session, self.deps.clone())));
        }
        let controller = self.register(session).await;

        info!(bout_id = %match_id, "Attached to stored match");
        Ok(controller)
    }

    async fn register(&self, session: BoutSessionState) -> Arc<BoutController> {
        let bout_id = session.bout_id().to_string();
        let mut bouts = self.bouts.write().await;
        bouts
            .entry(bout_id)
            .or_insert_with(|| Arc::new(BoutController::new(session, self.deps.clone())))
            .clone()
    }

    pub async fn get(&self, bout_id: &str) -> Option<Arc<BoutController>> {
        self.bouts.read().await.get(bout_id).cloned()
    }

    /// Stored bouts are attached on first access
    pub async fn get_or_attach(&self, bout_id: &str) -> Result<Arc<BoutController>, BoutError> {
        self.attach(bout_id).await
    }

    /// Drops the live session; the stored record is untouched
    pub async fn close(&self, bout_id: &str) -> bool {
        let removed = self.bouts.write().await.remove(bout_id);
        if let Some(controller) = &removed {
            controller.pause_clock().await;
        }
        removed.is_some()
    }

    /// Drops the live session once its result is in the store. Later
    /// requests re-attach the bout from its finalized record.
    pub async fn release_finalized(&self, bout_id: &str) -> bool {
        let Some(controller) = self.get(bout_id).await else {
            return false;
        };
        if controller.snapshot().await.phase() != BoutPhase::Finalized {
            return false;
        }

        let removed = self.bouts.write().await.remove(bout_id).is_some();
        if removed {
            debug!(bout_id = %bout_id, "Released finalized bout");
        }
        removed
    }

    pub async fn active_count(&self) -> usize {
        self.bouts.read().await.len()
    }
}
