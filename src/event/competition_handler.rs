use async_trait::async_trait;
use thiserror::Error;

use super::events::CompetitionEvent;

#[derive(Debug, Error)]
pub enum CompetitionEventError {
    #[error("Competition not found: {0}")]
    CompetitionNotFound(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that react to competition events
#[async_trait]
pub trait CompetitionEventHandler: Send + Sync {
    async fn handle_competition_event(
        &self,
        competition_id: &str,
        event: CompetitionEvent,
    ) -> Result<(), CompetitionEventError>;

    /// Name used in logs
    fn handler_name(&self) -> &'static str;
}
