use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, competition_handler::CompetitionEventHandler};

/// Routes one competition's events to a handler on a background task
pub struct CompetitionSubscription {
    competition_id: String,
    handler: Arc<dyn CompetitionEventHandler>,
    event_bus: EventBus,
}

impl CompetitionSubscription {
    pub fn new(
        competition_id: String,
        handler: Arc<dyn CompetitionEventHandler>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            competition_id,
            handler,
            event_bus,
        }
    }

    /// Subscribes before returning, so events emitted after `start` resolves
    /// are never missed
    pub async fn start(self) -> JoinHandle<()> {
        let competition_id = self.competition_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            competition_id = %competition_id,
            handler = handler_name,
            "Starting competition subscription"
        );

        let mut receiver = self.event_bus.subscribe(&competition_id).await;

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            competition_id = %competition_id,
                            handler = handler_name,
                            skipped,
                            "Subscription lagged behind, events dropped"
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    competition_id = %competition_id,
                    handler = handler_name,
                    event_type = event.event_type(),
                    "Received competition event"
                );

                if let Err(e) = self
                    .handler
                    .handle_competition_event(&competition_id, event)
                    .await
                {
                    warn!(
                        competition_id = %competition_id,
                        handler = handler_name,
                        error = %e,
                        "Competition event handler failed"
                    );
                }
            }

            info!(
                competition_id = %competition_id,
                handler = handler_name,
                "Competition subscription ended"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CompetitionEvent, CompetitionEventError};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct ForwardingHandler {
        sender: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl CompetitionEventHandler for ForwardingHandler {
        async fn handle_competition_event(
            &self,
            competition_id: &str,
            event: CompetitionEvent,
        ) -> Result<(), CompetitionEventError> {
            self.sender
                .send(format!("{competition_id}:{}", event.event_type()))
                .map_err(|e| CompetitionEventError::HandlerError(e.to_string()))
        }

        fn handler_name(&self) -> &'static str {
            "ForwardingHandler"
        }
    }

    #[tokio::test]
    async fn routes_events_to_handler() {
        let bus = EventBus::new();
        let (sender, mut received) = mpsc::unbounded_channel();

        let handle = CompetitionSubscription::new(
            "cup".to_string(),
            Arc::new(ForwardingHandler { sender }),
            bus.clone(),
        )
        .start()
        .await;

        bus.emit("cup", CompetitionEvent::BracketReset { deleted_matches: 1 })
            .await;

        assert_eq!(received.recv().await.unwrap(), "cup:bracket_reset");
        handle.abort();
    }
}
