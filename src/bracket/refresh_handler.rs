use async_trait::async_trait;
use std::sync::Weak;
use tracing::debug;

use super::service::BracketService;
use crate::event::{CompetitionEvent, CompetitionEventError, CompetitionEventHandler};

/// Reconciles a bracket as soon as one of its bouts is finalized instead of
/// waiting for the next poll
pub struct BracketRefreshHandler {
    service: Weak<BracketService>,
}

impl BracketRefreshHandler {
    pub fn new(service: Weak<BracketService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CompetitionEventHandler for BracketRefreshHandler {
    async fn handle_competition_event(
        &self,
        competition_id: &str,
        event: CompetitionEvent,
    ) -> Result<(), CompetitionEventError> {
        let CompetitionEvent::BoutFinalized { match_id, .. } = event else {
            return Ok(());
        };

        let service = self.service.upgrade().ok_or_else(|| {
            CompetitionEventError::HandlerError("Bracket service is gone".to_string())
        })?;

        debug!(competition_id = %competition_id, match_id = %match_id, "Bout finalized, refreshing bracket");
        service
            .refresh(competition_id)
            .await
            .map_err(|e| CompetitionEventError::HandlerError(e.to_string()))?;
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "BracketRefreshHandler"
    }
}
